//! Registration use-case service.
//!
//! # Responsibility
//! - Merge resolved students into a teacher's roster and persist the result.
//!
//! # Invariants
//! - Registration is idempotent: membership is deduplicated by email.
//! - Existing roster members are preserved; new ones follow input order.
//! - The teacher, new students and new roster pairs persist atomically.

use crate::repo::user_repo::UserRepository;
use crate::service::directory::{find_or_create_students, find_or_create_teacher};
use crate::service::error::{ServiceError, ServiceResult};
use log::info;

/// Use-case service for registering students to a teacher.
pub struct RegistrationService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> RegistrationService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers `student_emails` to the teacher at `teacher_email`.
    ///
    /// Teacher and students are created on first reference.
    ///
    /// # Errors
    /// - `Conflict` when a student email equals the raw teacher email, or
    ///   when an email already belongs to the other role.
    /// - `InvalidInput` for empty emails or an empty student list.
    /// - `Repo` for persistence failures; nothing is written in that case.
    pub fn register_students(
        &mut self,
        teacher_email: &str,
        student_emails: &[String],
    ) -> ServiceResult<()> {
        if student_emails.iter().any(|email| email == teacher_email) {
            return Err(ServiceError::Conflict(
                "teacher and student cannot be the same".to_string(),
            ));
        }
        if student_emails.is_empty() {
            return Err(ServiceError::InvalidInput(
                "at least one student is required".to_string(),
            ));
        }

        let mut teacher = find_or_create_teacher(&self.repo, teacher_email)?;
        let students = find_or_create_students(&self.repo, student_emails)?;

        let mut added = 0usize;
        for student in students {
            if teacher.add_student(student) {
                added += 1;
            }
        }

        let saved = self.repo.save_teacher(&teacher)?;
        info!(
            "event=students_register module=service status=ok requested={} added={} roster_size={}",
            student_emails.len(),
            added,
            saved.roster().len()
        );
        Ok(())
    }
}
