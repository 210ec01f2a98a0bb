pub mod application_service;
pub mod job_service;
pub mod lifecycle_service;
pub mod match_service;
pub mod user_service;
