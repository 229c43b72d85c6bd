pub mod challenge;
pub mod client;
pub mod game_match;
pub mod matchmaking;
pub mod move_request;
pub mod notification;
pub mod position;
pub mod time_control;

pub use challenge::{Challenge, ChallengeResolution};
pub use client::{ClientKey, ClientProfile, ClientRole};
pub use game_match::{Match, MatchResult};
pub use matchmaking::QueuedClient;
pub use move_request::MoveRequest;
pub use notification::Notification;
pub use position::{BoardOutcome, Position};
pub use time_control::TimeControl;
