//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide batched identity lookups over the `users` keyspace.
//! - Persist a teacher, its roster members and the roster pairs atomically.
//!
//! # Invariants
//! - Identity creation is an upsert keyed by email, never read-then-insert.
//! - `save_teacher` writes everything in one immediate transaction or nothing.
//! - Roster pairs are insert-if-absent.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::user::{Role, Student, Teacher, UserId, UserValidationError};
use log::debug;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound on `IN (...)` parameters per statement. SQLite rejects
/// statements binding more than 32766 variables.
const MAX_BOUND_PARAMS: usize = 1000;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for identity persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(UserValidationError),
    Db(DbError),
    /// No identity of the expected role has this email.
    NotFound(String),
    /// The email already belongs to an identity of another role.
    RoleConflict { email: String, existing: Role },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(email) => write!(f, "user not found: {email}"),
            Self::RoleConflict { email, existing } => {
                write!(f, "email {email} is already registered as a {existing}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::RoleConflict { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the identity directory.
///
/// Every `email` argument must already be normalized.
pub trait UserRepository {
    /// Loads one teacher with its roster populated.
    fn find_teacher(&self, email: &str) -> RepoResult<Option<Teacher>>;
    /// Loads every teacher whose email is in `emails`, rosters populated.
    fn find_teachers(&self, emails: &[String]) -> RepoResult<Vec<Teacher>>;
    /// Loads every student whose email is in `emails`.
    fn find_students(&self, emails: &[String]) -> RepoResult<Vec<Student>>;
    /// Like `find_students`, restricted to students that are not suspended.
    fn find_active_students(&self, emails: &[String]) -> RepoResult<Vec<Student>>;
    /// Persists the teacher, its roster members and roster pairs atomically.
    ///
    /// Returns the teacher as stored, with ids assigned.
    fn save_teacher(&mut self, teacher: &Teacher) -> RepoResult<Teacher>;
    /// Sets the suspension flag of one existing student.
    fn set_suspended(&mut self, email: &str, suspended: bool) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn find_teacher(&self, email: &str) -> RepoResult<Option<Teacher>> {
        let mut teachers = load_teachers(self.conn, &[email.to_string()])?;
        Ok(teachers.pop())
    }

    fn find_teachers(&self, emails: &[String]) -> RepoResult<Vec<Teacher>> {
        load_teachers(self.conn, emails)
    }

    fn find_students(&self, emails: &[String]) -> RepoResult<Vec<Student>> {
        load_students(self.conn, emails, false)
    }

    fn find_active_students(&self, emails: &[String]) -> RepoResult<Vec<Student>> {
        load_students(self.conn, emails, true)
    }

    fn save_teacher(&mut self, teacher: &Teacher) -> RepoResult<Teacher> {
        teacher.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let teacher_id = upsert_identity(&tx, &teacher.email, Role::Teacher)?;

        let mut added = 0usize;
        for student in teacher.roster() {
            let student_id = upsert_identity(&tx, &student.email, Role::Student)?;
            added += tx.execute(
                "INSERT OR IGNORE INTO registrations (teacher_id, student_id)
                 VALUES (?1, ?2);",
                params![teacher_id, student_id],
            )?;
        }

        let roster = load_rosters(&tx, &[teacher_id])?
            .remove(&teacher_id)
            .unwrap_or_default();
        tx.commit()?;

        debug!(
            "event=teacher_save module=repo status=ok teacher_id={} roster_size={} added={}",
            teacher_id,
            roster.len(),
            added
        );
        Ok(Teacher::with_roster(
            Some(teacher_id),
            teacher.email.clone(),
            roster,
        ))
    }

    fn set_suspended(&mut self, email: &str, suspended: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                is_suspended = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE email = ?1
               AND role = 'student';",
            params![email, bool_to_int(suspended)],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(email.to_string()));
        }

        Ok(())
    }
}

/// Inserts the identity if its email is free, then returns its id.
///
/// Fails with `RoleConflict` when the email is held by the other role.
fn upsert_identity(conn: &Connection, email: &str, role: Role) -> RepoResult<UserId> {
    conn.execute(
        "INSERT INTO users (email, role) VALUES (?1, ?2)
         ON CONFLICT (email) DO NOTHING;",
        params![email, role.as_str()],
    )?;

    let (id, role_text): (UserId, String) = conn.query_row(
        "SELECT id, role FROM users WHERE email = ?1;",
        [email],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let existing = parse_role(&role_text)?;
    if existing != role {
        return Err(RepoError::RoleConflict {
            email: email.to_string(),
            existing,
        });
    }

    Ok(id)
}

fn load_teachers(conn: &Connection, emails: &[String]) -> RepoResult<Vec<Teacher>> {
    let mut found: Vec<(UserId, String)> = Vec::new();
    for chunk in emails.chunks(MAX_BOUND_PARAMS) {
        let sql = format!(
            "SELECT id, email
             FROM users
             WHERE role = 'teacher'
               AND email IN ({});",
            placeholders(chunk.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
        while let Some(row) = rows.next()? {
            found.push((row.get("id")?, row.get("email")?));
        }
    }
    found.sort_unstable_by_key(|(id, _)| *id);

    let ids = found.iter().map(|(id, _)| *id).collect::<Vec<_>>();
    let mut rosters = load_rosters(conn, &ids)?;

    let mut teachers = Vec::with_capacity(found.len());
    for (id, email) in found {
        let roster = rosters.remove(&id).unwrap_or_default();
        let teacher = Teacher::with_roster(Some(id), email, roster);
        teacher.validate()?;
        teachers.push(teacher);
    }

    Ok(teachers)
}

/// Loads roster members for each teacher id, in registration order.
fn load_rosters(
    conn: &Connection,
    teacher_ids: &[UserId],
) -> RepoResult<HashMap<UserId, Vec<Student>>> {
    let mut rosters: HashMap<UserId, Vec<Student>> = HashMap::new();
    for chunk in teacher_ids.chunks(MAX_BOUND_PARAMS) {
        let sql = format!(
            "SELECT
                r.teacher_id AS teacher_id,
                s.id AS id,
                s.email AS email,
                s.is_suspended AS is_suspended
             FROM registrations r
             JOIN users s ON s.id = r.student_id
             WHERE r.teacher_id IN ({})
               AND s.role = 'student'
             ORDER BY r.rowid ASC;",
            placeholders(chunk.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
        while let Some(row) = rows.next()? {
            let teacher_id: UserId = row.get("teacher_id")?;
            rosters
                .entry(teacher_id)
                .or_default()
                .push(parse_student_row(row)?);
        }
    }

    Ok(rosters)
}

fn load_students(
    conn: &Connection,
    emails: &[String],
    active_only: bool,
) -> RepoResult<Vec<Student>> {
    let mut students = Vec::new();
    for chunk in emails.chunks(MAX_BOUND_PARAMS) {
        let mut sql = format!(
            "SELECT id, email, is_suspended
             FROM users
             WHERE role = 'student'
               AND email IN ({})",
            placeholders(chunk.len())
        );
        if active_only {
            sql.push_str(" AND is_suspended = 0");
        }
        sql.push(';');

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
    }
    students.sort_unstable_by_key(|s| s.id);

    Ok(students)
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let is_suspended = match row.get::<_, i64>("is_suspended")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_suspended value `{other}` in users.is_suspended"
            )));
        }
    };

    let student = Student {
        id: Some(row.get("id")?),
        email: row.get("email")?,
        is_suspended,
    };
    student.validate()?;
    Ok(student)
}

fn parse_role(value: &str) -> RepoResult<Role> {
    Role::parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid role `{value}` in users.role")))
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
