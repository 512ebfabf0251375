#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{counted_records, FakeExecutor};
use onward_core::core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use onward_core::errors::{ErrorKind, StoreError};
use onward_core::logging_facility::test_capture::init_test_capture;
use onward_core::{log_op_end, log_op_error, log_op_start, Migrator, Sqlite3};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, table = "t1");

    let start_events = capture.find(op_name, EVENT_START);
    assert_eq!(start_events.len(), 1);
    assert_eq!(start_events[0].fields.get("table"), Some(&"t1".to_string()));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events = capture.find(op_name, EVENT_END);
    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(
        end_events[0].fields.get("duration_ms"),
        Some(&"42".to_string())
    );
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = StoreError::new(ErrorKind::Persistence).with_message("disk full");
    log_op_error!(op_name, err, duration_ms = 10);

    let error_events = capture.find(op_name, EVENT_END_ERROR);
    assert_eq!(error_events.len(), 1, "Should have exactly one error event");
    assert_eq!(
        error_events[0].fields.get("err.code"),
        Some(&"ERR_PERSISTENCE".to_string())
    );
    // The error is only borrowed by the macro
    assert_eq!(err.message(), "disk full");
}

#[test]
fn test_apply_logs_start_and_end() {
    let capture = init_test_capture();
    let table = "logged_apply_versions";
    let fake = FakeExecutor::with_table(table);
    let (records, _) = counted_records(2);

    Migrator::new(&Sqlite3)
        .with_table(table)
        .apply(&fake, &records)
        .unwrap();

    let for_table = |event: &str| capture.find_for_table("apply_migrations", event, table).len();
    assert_eq!(for_table(EVENT_START), 1);
    assert_eq!(for_table(EVENT_END), 1);
    assert_eq!(for_table(EVENT_END_ERROR), 0);

    let end = &capture.find_for_table("apply_migrations", EVENT_END, table)[0];
    assert_eq!(end.fields.get("applied"), Some(&"2".to_string()));

    let applied = capture.count_messages_for_table("applied migration", table);
    assert_eq!(applied, 2);
}

#[test]
fn test_apply_logs_error_with_code() {
    let capture = init_test_capture();
    let table = "logged_failure_versions";
    let fake = FakeExecutor::with_table(table);
    fake.fail_create.set(true);
    let (records, _) = counted_records(1);

    let result = Migrator::new(&Sqlite3)
        .with_table(table)
        .apply(&fake, &records);
    assert!(result.is_err());

    let errors = capture.find_for_table("apply_migrations", EVENT_END_ERROR, table);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].err_code(), Some("ERR_INITIALIZATION"));
    assert!(capture
        .find_for_table("apply_migrations", EVENT_END, table)
        .is_empty());
}
