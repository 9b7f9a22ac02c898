//! User identity model.
//!
//! # Responsibility
//! - Represent teachers and students as variants of one identity type.
//! - Keep the roster deduplicated by normalized email.
//!
//! # Invariants
//! - `email` is non-empty and already normalized on every constructed value.
//! - `id` is `None` until storage assigns one.
//! - A roster never holds two students with the same email.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identity key.
pub type UserId = i64;

/// Normalizes an email for storage and comparison.
///
/// Lowercases only. Embedded or surrounding whitespace is kept as-is.
pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}

/// Validation error for identity construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Email is the empty string.
    EmptyEmail,
    /// Email differs from its normalized form.
    EmailNotNormalized(String),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailNotNormalized(email) => {
                write!(f, "email `{email}` is not in normalized lowercase form")
            }
        }
    }
}

impl Error for UserValidationError {}

/// Normalizes `email`, rejecting the empty string.
pub fn checked_email(email: &str) -> Result<String, UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }
    Ok(normalize_email(email))
}

fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }
    if normalize_email(email) != email {
        return Err(UserValidationError::EmailNotNormalized(email.to_string()));
    }
    Ok(())
}

/// Role discriminant stored alongside every identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    /// Stable storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }

    /// Parses a storage label.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "teacher" => Some(Self::Teacher),
            "student" => Some(Self::Student),
            _ => None,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Student identity with a standalone suspension flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: Option<UserId>,
    pub email: String,
    /// Suspended students never receive notifications.
    pub is_suspended: bool,
}

impl Student {
    /// Creates a not-yet-persisted, active student.
    pub fn new(email: &str) -> Result<Self, UserValidationError> {
        Ok(Self {
            id: None,
            email: checked_email(email)?,
            is_suspended: false,
        })
    }

    /// Returns whether this student may receive notifications.
    pub fn is_active(&self) -> bool {
        !self.is_suspended
    }

    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_email(&self.email)
    }
}

/// Teacher identity owning a deduplicated roster of students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TeacherRecord")]
pub struct Teacher {
    pub id: Option<UserId>,
    pub email: String,
    roster: Vec<Student>,
    /// Emails in `roster`; kept in step with every insertion.
    #[serde(skip_serializing)]
    member_emails: HashSet<String>,
}

/// Serialized shape of a teacher; the email set is rebuilt on load.
#[derive(Deserialize)]
struct TeacherRecord {
    id: Option<UserId>,
    email: String,
    roster: Vec<Student>,
}

impl From<TeacherRecord> for Teacher {
    fn from(value: TeacherRecord) -> Self {
        Self::with_roster(value.id, value.email, value.roster)
    }
}

impl Teacher {
    /// Creates a not-yet-persisted teacher with an empty roster.
    pub fn new(email: &str) -> Result<Self, UserValidationError> {
        Ok(Self {
            id: None,
            email: checked_email(email)?,
            roster: Vec::new(),
            member_emails: HashSet::new(),
        })
    }

    /// Rebuilds a persisted teacher, dropping duplicate roster entries.
    pub fn with_roster(id: Option<UserId>, email: String, students: Vec<Student>) -> Self {
        let mut teacher = Self {
            id,
            email,
            roster: Vec::with_capacity(students.len()),
            member_emails: HashSet::with_capacity(students.len()),
        };
        for student in students {
            teacher.add_student(student);
        }
        teacher
    }

    /// Current roster in insertion order.
    pub fn roster(&self) -> &[Student] {
        &self.roster
    }

    /// Emails of every roster member.
    pub fn roster_emails(&self) -> &HashSet<String> {
        &self.member_emails
    }

    /// Adds `student` unless a member with the same email is present.
    ///
    /// Returns `true` when the roster grew.
    pub fn add_student(&mut self, student: Student) -> bool {
        if !self.member_emails.insert(student.email.clone()) {
            return false;
        }
        self.roster.push(student);
        true
    }

    /// Roster members that are not suspended.
    pub fn active_students(&self) -> impl Iterator<Item = &Student> {
        self.roster.iter().filter(|s| s.is_active())
    }

    /// Validates the teacher and every roster member.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_email(&self.email)?;
        for student in &self.roster {
            student.validate()?;
        }
        Ok(())
    }
}

/// Any identity in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum User {
    Teacher(Teacher),
    Student(Student),
}

impl User {
    pub fn id(&self) -> Option<UserId> {
        match self {
            Self::Teacher(t) => t.id,
            Self::Student(s) => s.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Self::Teacher(t) => &t.email,
            Self::Student(s) => &s.email,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::Teacher(_) => Role::Teacher,
            Self::Student(_) => Role::Student,
        }
    }

    /// Two identities are the same user iff their normalized emails match,
    /// regardless of role or persistence state.
    pub fn is_same_identity(&self, other: &User) -> bool {
        normalize_email(self.email()) == normalize_email(other.email())
    }
}

impl From<Teacher> for User {
    fn from(value: Teacher) -> Self {
        Self::Teacher(value)
    }
}

impl From<Student> for User {
    fn from(value: Student) -> Self {
        Self::Student(value)
    }
}
