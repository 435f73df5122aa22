use taskledger_core::db::open_db_in_memory;
use taskledger_core::{
    BoardError, SqliteTaskRepository, TaskBoard, TaskForm, TaskRecord, TaskRepository,
    TaskStatus,
};

fn form(national_id: &str, first_name: &str) -> TaskForm {
    TaskForm {
        national_id: national_id.to_string(),
        first_name: first_name.to_string(),
        last_name: "Pérez".to_string(),
        course: "5° Grado".to_string(),
        shift: "Mañana".to_string(),
        pending_action: "Entregar partida".to_string(),
    }
}

#[test]
fn submit_new_adds_pending_record_and_partitions() {
    let conn = open_db_in_memory().unwrap();
    let mut board = TaskBoard::new(SqliteTaskRepository::try_new(&conn).unwrap());
    board.load(None).unwrap();
    assert!(board.pending().is_empty());
    assert_eq!(board.status_line(), "Pending: 0, Completed: 0");

    let err = board.submit_new(&form(" 12345678 ", "Ana")).unwrap_err();
    assert!(matches!(err, BoardError::Validation(_)));

    let stored = board.submit_new(&form("12345678", "  Ana ")).unwrap();
    assert_eq!(stored.first_name, "Ana");
    assert_eq!(stored.status, TaskStatus::Pending);
    assert_eq!(board.pending().len(), 1);
    assert!(board.completed().is_empty());
    assert_eq!(board.status_line(), "Task added: Ana Pérez");
}

#[test]
fn submit_new_rejects_invalid_form_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let mut board = TaskBoard::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let mut bad = form("12345678", "Ana");
    bad.first_name = "Ana3".to_string();
    let err = board.submit_new(&bad).unwrap_err();
    match err {
        BoardError::Validation(field) => assert_eq!(field.field, "First name"),
        other => panic!("unexpected error: {other}"),
    }

    let mut bad = form("12345", "Ana");
    bad.pending_action = String::new();
    assert!(matches!(
        board.submit_new(&bad),
        Err(BoardError::Validation(_))
    ));

    assert!(!board.repo().has_data());
}

#[test]
fn submit_new_rejects_duplicate_national_id() {
    let conn = open_db_in_memory().unwrap();
    let mut board = TaskBoard::new(SqliteTaskRepository::try_new(&conn).unwrap());

    board.submit_new(&form("12345678", "Ana")).unwrap();
    let err = board.submit_new(&form("12345678", "Otra")).unwrap_err();

    assert!(matches!(err, BoardError::DuplicateNationalId(ref id) if id == "12345678"));
    assert_eq!(board.repo().count().unwrap(), 1);
}

#[test]
fn submit_edit_updates_fields_and_checks_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let mut board = TaskBoard::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let ana = board.submit_new(&form("111111", "Ana")).unwrap();
    board.submit_new(&form("222222", "Bea")).unwrap();
    let ana_id = ana.id.unwrap();

    let mut edited = form("111111", "Ana María");
    edited.course = "6° Grado".to_string();
    let updated = board.submit_edit(ana_id, &edited).unwrap();
    assert_eq!(updated.first_name, "Ana María");
    assert_eq!(updated.created_at, ana.created_at);
    assert_eq!(board.status_line(), "Task updated: Ana María Pérez");

    let err = board.submit_edit(ana_id, &form("222222", "Ana")).unwrap_err();
    assert!(matches!(err, BoardError::DuplicateNationalId(_)));

    let err = board.submit_edit(9999, &form("333333", "Nadie")).unwrap_err();
    assert!(matches!(err, BoardError::NotFound(9999)));

    let reloaded = board.repo().get_by_id(ana_id).unwrap().unwrap();
    assert_eq!(reloaded.course, "6° Grado");
    assert_eq!(reloaded.national_id, "111111");
}

#[test]
fn set_status_moves_records_between_partitions() {
    let conn = open_db_in_memory().unwrap();
    let mut board = TaskBoard::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let stored = board.submit_new(&form("12345678", "Ana")).unwrap();
    let id = stored.id.unwrap();

    let done = board.set_status(id, TaskStatus::Completed).unwrap();
    assert!(!done.completed_at.is_empty());
    assert!(board.pending().is_empty());
    assert_eq!(board.completed().len(), 1);
    assert_eq!(board.completed()[0].completed_at, done.completed_at);

    let reopened = board.set_status(id, TaskStatus::Pending).unwrap();
    assert!(reopened.completed_at.is_empty());
    assert_eq!(board.pending().len(), 1);
    assert!(board.completed().is_empty());

    let err = board.set_status(4242, TaskStatus::Completed).unwrap_err();
    assert!(matches!(err, BoardError::NotFound(4242)));
}

#[test]
fn completing_an_already_completed_record_keeps_it_completed() {
    let conn = open_db_in_memory().unwrap();
    let mut board = TaskBoard::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let id = board.submit_new(&form("12345678", "Ana")).unwrap().id.unwrap();

    board.set_status(id, TaskStatus::Completed).unwrap();
    let again = board.set_status(id, TaskStatus::Completed).unwrap();

    assert_eq!(again.status, TaskStatus::Completed);
    assert!(!again.completed_at.is_empty());
    assert!(board.pending().is_empty());
    assert_eq!(board.completed().len(), 1);
    assert_eq!(board.completed()[0].id, Some(id));

    let stored = board.repo().get_by_id(id).unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Completed);
    assert_eq!(stored.completed_at, again.completed_at);
}

#[test]
fn reopening_an_already_pending_record_is_harmless() {
    let conn = open_db_in_memory().unwrap();
    let mut board = TaskBoard::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let id = board.submit_new(&form("12345678", "Ana")).unwrap().id.unwrap();

    let first = board.set_status(id, TaskStatus::Pending).unwrap();
    let second = board.set_status(id, TaskStatus::Pending).unwrap();

    assert_eq!(first.status, TaskStatus::Pending);
    assert_eq!(second.status, TaskStatus::Pending);
    assert!(second.completed_at.is_empty());
    assert_eq!(board.pending().len(), 1);
    assert!(board.completed().is_empty());

    let stored = board.repo().get_by_id(id).unwrap().unwrap();
    assert!(stored.completed_at.is_empty());
}

#[test]
fn delete_removes_record_and_reports_missing_id() {
    let conn = open_db_in_memory().unwrap();
    let mut board = TaskBoard::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let stored = board.submit_new(&form("12345678", "Ana")).unwrap();
    board.delete(stored.id.unwrap()).unwrap();
    assert!(board.pending().is_empty());
    assert_eq!(board.status_line(), "Task for Ana Pérez deleted");

    let err = board.delete(stored.id.unwrap()).unwrap_err();
    assert!(matches!(err, BoardError::NotFound(_)));
}

#[test]
fn refresh_reapplies_remembered_search() {
    let conn = open_db_in_memory().unwrap();
    let mut board = TaskBoard::new(SqliteTaskRepository::try_new(&conn).unwrap());
    board.submit_new(&form("111111", "Ana")).unwrap();
    board.submit_new(&form("222222", "Bea")).unwrap();

    board.search("  bea ").unwrap();
    assert_eq!(board.last_query(), Some("bea"));
    assert_eq!(board.pending().len(), 1);
    assert_eq!(board.status_line(), "Showing 1 results for 'bea'");

    // Write behind the board's back, as a second process would.
    board
        .repo()
        .insert(&TaskRecord::new(
            "333333", "Beatriz", "Sosa", "1° Curso", "Tarde", "Firmar",
        ))
        .unwrap();
    board.refresh().unwrap();
    assert_eq!(board.pending().len(), 2);

    board.clear_search().unwrap();
    assert_eq!(board.last_query(), None);
    assert_eq!(board.pending().len(), 3);

    board.search("   ").unwrap();
    assert_eq!(board.last_query(), None);
    assert_eq!(board.status_line(), "Pending: 3, Completed: 0");
}

#[test]
fn report_counts_statuses_and_groups() {
    let conn = open_db_in_memory().unwrap();
    let mut board = TaskBoard::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let empty = board.report().unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.pending_percent(), 0);

    let first = board.submit_new(&form("111111", "Ana")).unwrap();
    board.submit_new(&form("222222", "Bea")).unwrap();
    let mut other_course = form("333333", "Caro");
    other_course.course = "1° Curso".to_string();
    board.submit_new(&other_course).unwrap();
    board.submit_new(&form("444444", "Dani")).unwrap();
    board
        .set_status(first.id.unwrap(), TaskStatus::Completed)
        .unwrap();

    let report = board.report().unwrap();
    assert_eq!(report.total, 4);
    assert_eq!(report.pending, 3);
    assert_eq!(report.completed, 1);
    assert_eq!(report.pending_percent(), 75);
    assert_eq!(report.completed_percent(), 25);
    assert_eq!(report.by_course.get("5° Grado"), Some(&3));
    assert_eq!(report.by_course.get("1° Curso"), Some(&1));
    assert_eq!(report.by_shift.get("Mañana"), Some(&4));
}
