use rusqlite::Connection;
use taskledger_core::db::migrations::latest_version;
use taskledger_core::db::open_db_in_memory;
use taskledger_core::{
    RepoError, SqliteTaskRepository, TaskRecord, TaskRepository, TaskStatus,
    TaskValidationError, UpdateOutcome,
};

fn record(national_id: &str, first_name: &str) -> TaskRecord {
    TaskRecord::new(
        national_id,
        first_name,
        "Benítez",
        "5° Grado",
        "Mañana",
        "Entregar certificado",
    )
}

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let draft = record("12345678", "Ana");
    let stored = repo.insert(&draft).unwrap();
    let id = stored.id.expect("insert assigns an id");

    let loaded = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(loaded, stored);
    assert_eq!(
        TaskRecord {
            id: None,
            ..loaded
        },
        draft
    );
}

#[test]
fn insert_assigns_increasing_ids_and_get_all_is_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let first = repo.insert(&record("111111", "Ana")).unwrap();
    let second = repo.insert(&record("222222", "Bea")).unwrap();
    let third = repo.insert(&record("333333", "Caro")).unwrap();

    let ids: Vec<_> = repo
        .get_all()
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
    assert_eq!(repo.count().unwrap(), 3);
}

#[test]
fn duplicate_national_id_is_rejected_on_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    repo.insert(&record("12345678", "Ana")).unwrap();
    let err = repo.insert(&record("12345678", "Otra")).unwrap_err();

    assert!(matches!(err, RepoError::DuplicateKey(ref id) if id == "12345678"));
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn update_overwrites_fields_but_keeps_created_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut stored = repo.insert(&record("12345678", "Ana")).unwrap();
    let original_created_at = stored.created_at.clone();

    stored.first_name = "Ana María".to_string();
    stored.course = "6° Grado".to_string();
    stored.created_at = "01/01/1999 00:00".to_string();
    stored.mark_completed();
    assert_eq!(repo.update(&stored).unwrap(), UpdateOutcome::Updated);

    let loaded = repo.get_by_id(stored.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.first_name, "Ana María");
    assert_eq!(loaded.course, "6° Grado");
    assert_eq!(loaded.status, TaskStatus::Completed);
    assert_eq!(loaded.completed_at, stored.completed_at);
    assert_eq!(loaded.created_at, original_created_at);
}

#[test]
fn update_rejects_national_id_owned_by_another_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    repo.insert(&record("111111", "Ana")).unwrap();
    let mut other = repo.insert(&record("222222", "Bea")).unwrap();

    other.national_id = "111111".to_string();
    let err = repo.update(&other).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateKey(_)));

    let unchanged = repo.get_by_id(other.id.unwrap()).unwrap().unwrap();
    assert_eq!(unchanged.national_id, "222222");
}

#[test]
fn update_of_missing_id_is_reported_as_unchanged_not_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut ghost = record("12345678", "Ana");
    ghost.id = Some(4242);
    assert_eq!(repo.update(&ghost).unwrap(), UpdateOutcome::Unchanged);
    assert!(repo.get_all().unwrap().is_empty());
}

#[test]
fn update_without_id_fails_validation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let err = repo.update(&record("12345678", "Ana")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::MissingId)
    ));
}

#[test]
fn writes_enforce_record_invariants() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut broken = record("12345678", "Ana");
    broken.status = TaskStatus::Completed;
    let err = repo.insert(&broken).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::MissingCompletedAt)
    ));
    assert!(!repo.has_data());
}

#[test]
fn delete_by_id_removes_row_and_missing_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let kept = repo.insert(&record("111111", "Ana")).unwrap();
    let doomed = repo.insert(&record("222222", "Bea")).unwrap();

    repo.delete_by_id(doomed.id.unwrap()).unwrap();
    assert!(repo.get_by_id(doomed.id.unwrap()).unwrap().is_none());

    let err = repo.delete_by_id(9999).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(9999)));

    let remaining = repo.get_all().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept.id);
}

#[test]
fn exists_by_national_id_honors_exclusion() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let stored = repo.insert(&record("12345678", "Ana")).unwrap();

    assert!(repo.exists_by_national_id("12345678", None));
    assert!(!repo.exists_by_national_id("12345678", stored.id));
    assert!(repo.exists_by_national_id("12345678", Some(stored.id.unwrap() + 1)));
    assert!(!repo.exists_by_national_id("87654321", None));
}

#[test]
fn existence_probes_degrade_to_false_when_table_is_gone() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    repo.insert(&record("12345678", "Ana")).unwrap();
    assert!(repo.has_data());

    conn.execute_batch("DROP TABLE tasks;").unwrap();

    assert!(!repo.has_data());
    assert!(!repo.exists_by_national_id("12345678", None));
    assert!(repo.get_all().is_err());
}

#[test]
fn insert_or_ignore_many_skips_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    repo.insert(&record("111111", "Ana")).unwrap();

    let batch = vec![
        record("111111", "Duplicada"),
        record("222222", "Bea"),
        record("222222", "Repetida"),
        record("333333", "Caro"),
    ];
    let inserted = repo.insert_or_ignore_many(&batch).unwrap();

    assert_eq!(inserted, 2);
    assert_eq!(repo.count().unwrap(), 3);
    let names: Vec<_> = repo
        .get_all()
        .unwrap()
        .into_iter()
        .map(|item| item.first_name)
        .collect();
    assert_eq!(names, vec!["Caro", "Bea", "Ana"]);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteTaskRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("uninitialized connection must be rejected"),
    }
}
