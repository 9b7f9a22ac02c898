//! Notification recipient use-case service.
//!
//! # Responsibility
//! - Resolve which students receive a teacher's notification.
//!
//! # Invariants
//! - Suspended students never receive notifications.
//! - Mentions of unknown or suspended students are dropped silently.
//! - Notification text is never logged.

use crate::model::user::checked_email;
use crate::repo::user_repo::UserRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::mention::extract_mentions;
use log::debug;
use std::collections::BTreeSet;

/// Use-case service for notification recipients.
pub struct NotificationService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> NotificationService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the union of the teacher's active roster and the active,
    /// existing students mentioned in `text`, sorted ascending.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty teacher email.
    /// - `NotFound` when the teacher does not exist.
    pub fn resolve_recipients(&self, teacher_email: &str, text: &str) -> ServiceResult<Vec<String>> {
        let teacher_email = checked_email(teacher_email)?;
        let teacher = self
            .repo
            .find_teacher(&teacher_email)?
            .ok_or_else(|| ServiceError::NotFound("teacher not found".to_string()))?;

        let mut recipients = teacher
            .active_students()
            .map(|s| s.email.clone())
            .collect::<BTreeSet<_>>();
        let from_roster = recipients.len();

        let mentions = extract_mentions(text)
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let mentioned = self.repo.find_active_students(&mentions)?;
        recipients.extend(mentioned.into_iter().map(|s| s.email));

        debug!(
            "event=recipients_resolve module=service status=ok from_roster={} mentions={} total={}",
            from_roster,
            mentions.len(),
            recipients.len()
        );
        Ok(recipients.into_iter().collect())
    }
}
