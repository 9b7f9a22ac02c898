//! Core domain logic for the classroom directory.
//! This crate is the single source of truth for identity and roster invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, validate_log_level};
pub use model::user::{
    normalize_email, Role, Student, Teacher, User, UserId, UserValidationError,
};
pub use repo::user_repo::{RepoError, RepoResult, SqliteUserRepository, UserRepository};
pub use service::common_students::CommonStudentService;
pub use service::directory::DirectoryService;
pub use service::error::{ErrorKind, ServiceError, ServiceResult};
pub use service::mention::extract_mentions;
pub use service::notification::NotificationService;
pub use service::registration::RegistrationService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
