pub mod errors;
pub mod notification_repository;
pub mod queue_repository;
pub mod role_repository;
