use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::{warn, Level};

use crate::models::time_control::TimeControl;

/// Runtime settings for the arbiter, read from `ARBITER_*` environment variables.
#[derive(Debug, Clone)]
pub struct ArbiterConfig {
    /// Period between matchmaking passes.
    pub matchmaking_tick: Duration,
    /// Highest pairing weight the scheduler accepts.
    pub pairing_weight_threshold: f64,
    /// Smallest amount charged to a mover's clock per move.
    pub minimum_move_deduction_secs: f64,
    /// Time control for matches created by the scheduler.
    pub matchmaking_time_control: TimeControl,
    pub log_level: Level,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            matchmaking_tick: Duration::from_secs(1),
            pairing_weight_threshold: 100.0,
            minimum_move_deduction_secs: 0.1,
            matchmaking_time_control: TimeControl::BLITZ,
            log_level: Level::INFO,
        }
    }
}

impl ArbiterConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(tick_ms) = parse_var::<u64>("ARBITER_MATCHMAKING_TICK_MS") {
            if tick_ms > 0 {
                config.matchmaking_tick = Duration::from_millis(tick_ms);
            }
        }

        if let Some(threshold) = parse_var::<f64>("ARBITER_PAIRING_WEIGHT_THRESHOLD") {
            config.pairing_weight_threshold = threshold;
        }

        if let Some(minimum) = parse_var::<f64>("ARBITER_MINIMUM_MOVE_DEDUCTION_SECS") {
            if minimum >= 0.0 {
                config.minimum_move_deduction_secs = minimum;
            }
        }

        if let Some(time_control) = parse_var::<TimeControl>("ARBITER_MATCHMAKING_TIME_CONTROL") {
            config.matchmaking_time_control = time_control;
        }

        if let Some(level) = parse_var::<Level>("ARBITER_LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable {}={}", name, raw);
            None
        }
    }
}
