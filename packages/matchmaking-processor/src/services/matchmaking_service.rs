use std::collections::HashSet;

use chrono::{DateTime, Utc};
use shared::models::matchmaking::QueuedClient;

/// Seconds added to the wait in the pairing denominator, so newcomers are not
/// divided by zero and early waits count for less.
const WAIT_OFFSET_SECS: f64 = 50.0;
const WAIT_SCALE: f64 = 100.0;

/// Cost of pairing `candidate` with `opponent`. Rating distance shrinks as the
/// candidate waits longer.
pub fn pairing_weight(candidate: &QueuedClient, opponent: &QueuedClient, now: DateTime<Utc>) -> f64 {
    let elo_distance = f64::from((candidate.profile.elo - opponent.profile.elo).abs());
    elo_distance * (WAIT_SCALE / (candidate.wait_seconds(now) + WAIT_OFFSET_SECS))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    pub first: QueuedClient,
    pub second: QueuedClient,
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub struct MatchmakingService {
    threshold: f64,
}

impl MatchmakingService {
    pub fn new(threshold: f64) -> Self {
        MatchmakingService { threshold }
    }

    pub fn is_matchable(&self, weight: f64) -> bool {
        weight <= self.threshold
    }

    /// Lowest-weight opponent for `candidate` among `opponents`. On equal
    /// weights the earliest opponent wins.
    pub fn select_best_opponent<'a>(
        &self,
        candidate: &QueuedClient,
        opponents: impl IntoIterator<Item = &'a QueuedClient>,
        now: DateTime<Utc>,
    ) -> Option<(&'a QueuedClient, f64)> {
        let mut best: Option<(&QueuedClient, f64)> = None;

        for opponent in opponents {
            let weight = pairing_weight(candidate, opponent, now);
            match best {
                Some((_, best_weight)) if weight >= best_weight => {}
                _ => best = Some((opponent, weight)),
            }
        }

        best
    }

    /// Greedy pass over the pool in join order. Each waiting client is offered
    /// its best later opponent; matched clients drop out of the rest of the pass.
    pub fn find_pairs(&self, queued: &[QueuedClient], now: DateTime<Utc>) -> Vec<Pairing> {
        let mut taken: HashSet<&str> = HashSet::new();
        let mut pairings = Vec::new();

        for (i, candidate) in queued.iter().enumerate() {
            if taken.contains(candidate.client_key()) {
                continue;
            }

            let remaining = queued[i + 1..]
                .iter()
                .filter(|opponent| !taken.contains(opponent.client_key()));

            if let Some((opponent, weight)) = self.select_best_opponent(candidate, remaining, now) {
                if self.is_matchable(weight) {
                    taken.insert(candidate.client_key());
                    taken.insert(opponent.client_key());
                    pairings.push(Pairing {
                        first: candidate.clone(),
                        second: opponent.clone(),
                        weight,
                    });
                }
            }
        }

        pairings
    }
}
