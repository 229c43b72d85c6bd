pub mod errors;
pub mod matchmaking_service;

pub use matchmaking_service::{MatchmakingService, Pairing};
