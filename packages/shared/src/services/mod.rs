pub mod chess_service;
pub mod errors;
pub mod match_clock;
pub mod match_service;
pub mod notification_service;
pub mod queue_service;
