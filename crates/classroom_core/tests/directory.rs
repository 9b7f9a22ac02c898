use classroom_core::db::open_db_in_memory;
use classroom_core::{
    DirectoryService, ErrorKind, RegistrationService, ServiceError, SqliteUserRepository,
    UserRepository,
};
use rusqlite::Connection;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn register(conn: &mut Connection, teacher: &str, students: &[&str]) {
    let mut service = RegistrationService::new(SqliteUserRepository::new(conn));
    service
        .register_students(teacher, &strings(students))
        .unwrap();
}

#[test]
fn find_or_create_teacher_builds_unsaved_teacher_when_absent() {
    let mut conn = open_db_in_memory().unwrap();
    let service = DirectoryService::new(SqliteUserRepository::new(&mut conn));

    let teacher = service.find_or_create_teacher("New@Teacher.com").unwrap();
    assert_eq!(teacher.id, None);
    assert_eq!(teacher.email, "new@teacher.com");
    assert!(teacher.roster().is_empty());
    drop(service);

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0, "find-or-create must not persist");
}

#[test]
fn find_or_create_teacher_returns_stored_teacher_with_roster() {
    let mut conn = open_db_in_memory().unwrap();
    register(&mut conn, "t1@teacher.com", &["s1@student.com", "s2@student.com"]);

    let service = DirectoryService::new(SqliteUserRepository::new(&mut conn));
    for email in ["t1@teacher.com", "T1@teacher.com", "T1@TEACHER.COM"] {
        let teacher = service.find_or_create_teacher(email).unwrap();
        assert!(teacher.id.is_some());
        assert_eq!(teacher.email, "t1@teacher.com");
        assert_eq!(teacher.roster().len(), 2);
    }
}

#[test]
fn find_or_create_rejects_empty_email() {
    let mut conn = open_db_in_memory().unwrap();
    let service = DirectoryService::new(SqliteUserRepository::new(&mut conn));

    let err = service.find_or_create_teacher("").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = service
        .find_or_create_students(&strings(&["s1@student.com", ""]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn find_or_create_students_mixes_existing_and_new_and_dedupes_input() {
    let mut conn = open_db_in_memory().unwrap();
    register(&mut conn, "t1@teacher.com", &["s1@student.com"]);

    let service = DirectoryService::new(SqliteUserRepository::new(&mut conn));
    assert!(service.find_or_create_students(&[]).unwrap().is_empty());

    let students = service
        .find_or_create_students(&strings(&[
            "S1@student.com",
            "s2@student.com",
            "s1@STUDENT.com",
        ]))
        .unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[0].email, "s1@student.com");
    assert!(students[0].id.is_some());
    assert_eq!(students[1].email, "s2@student.com");
    assert_eq!(students[1].id, None);
    assert!(!students[1].is_suspended);
}

#[test]
fn suspend_student_sets_flag_case_insensitively() {
    let mut conn = open_db_in_memory().unwrap();
    register(&mut conn, "t1@teacher.com", &["s1@student.com"]);

    let mut service = DirectoryService::new(SqliteUserRepository::new(&mut conn));
    service.suspend_student("S1@Student.com").unwrap();
    service.suspend_student("s1@student.com").unwrap();
    drop(service);

    let repo = SqliteUserRepository::new(&mut conn);
    let students = repo.find_students(&strings(&["s1@student.com"])).unwrap();
    assert!(students[0].is_suspended);
    assert!(repo
        .find_active_students(&strings(&["s1@student.com"]))
        .unwrap()
        .is_empty());
}

#[test]
fn suspend_unknown_student_is_not_found_and_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    register(&mut conn, "t1@teacher.com", &["s1@student.com"]);

    let mut service = DirectoryService::new(SqliteUserRepository::new(&mut conn));
    let err = service.suspend_student("ghost@student.com").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = service.suspend_student("t1@teacher.com").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound, "teachers cannot be suspended");
    drop(service);

    let (users, suspended): (i64, i64) = conn
        .query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_suspended), 0) FROM users;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(users, 2);
    assert_eq!(suspended, 0);
}
