use expensary_core::{
    Expense, ExpenseDecodeError, ExpenseRepository, JsonExpenseRepository, RepoError,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("expenses.json")
}

#[test]
fn persisted_file_is_pretty_printed_with_stable_keys() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let mut store = JsonExpenseRepository::open(&path).unwrap();

    store.add(Expense::new("Coffee", 3.5).unwrap(), false).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    // Four-space indentation, one record object in a top-level array.
    assert!(raw.starts_with("[\n    {\n"));
    assert!(raw.contains("        \"id\":"));

    // Stable key order per record, asserted on the raw text since parsed
    // JSON objects do not preserve order.
    let positions: Vec<usize> = ["\"id\"", "\"title\"", "\"amount\"", "\"created_at\"", "\"updated_at\""]
        .iter()
        .map(|key| raw.find(key).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

    let value: Value = serde_json::from_str(&raw).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].as_object().unwrap().len(), 5);
    assert_eq!(records[0]["title"], "Coffee");
    assert_eq!(records[0]["amount"], 3.5);
}

#[test]
fn reopen_reads_back_written_records() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);

    let (first, second) = {
        let mut store = JsonExpenseRepository::open(&path).unwrap();
        let first = store.add(Expense::new("Coffee", 3.5).unwrap(), false).unwrap();
        let second = store.add(Expense::new("Lunch", 12.0).unwrap(), false).unwrap();
        (first, second)
    };

    let reopened = JsonExpenseRepository::open(&path).unwrap();

    assert_eq!(reopened.expenses().len(), 2);
    assert_eq!(reopened.expenses()[0].id, first);
    assert_eq!(reopened.expenses()[1].id, second);
    assert_eq!(reopened.expenses()[0].title, "Coffee");
    assert_eq!(reopened.expenses()[1].amount, 12.0);
}

#[test]
fn reopen_preserves_timestamps_to_the_instant() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);

    let original = Expense::new("Coffee", 3.5).unwrap();
    let expected = original.clone();
    {
        let mut store = JsonExpenseRepository::open(&path).unwrap();
        store.add(original, false).unwrap();
    }

    let reopened = JsonExpenseRepository::open(&path).unwrap();

    assert_eq!(reopened.expenses()[0], expected);
}

#[test]
fn unparsable_file_recovers_as_empty_store() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    std::fs::write(&path, "definitely { not json").unwrap();

    let mut store = JsonExpenseRepository::open(&path).unwrap();
    assert!(store.expenses().is_empty());

    // The next mutation replaces the unparsable content with valid state.
    store.add(Expense::new("Coffee", 3.5).unwrap(), false).unwrap();
    let reopened = JsonExpenseRepository::open(&path).unwrap();
    assert_eq!(reopened.expenses().len(), 1);
}

#[test]
fn wrong_json_shape_recovers_as_empty_store() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();

    let store = JsonExpenseRepository::open(&path).unwrap();

    assert!(store.expenses().is_empty());
}

#[test]
fn negative_amount_in_stored_record_aborts_open() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let records = json!([{
        "id": "11111111-2222-4333-8444-555555555555",
        "title": "Groceries",
        "amount": -50.0,
        "created_at": "2026-02-13T10:00:00+00:00",
        "updated_at": "2026-02-13T10:00:00+00:00"
    }]);
    std::fs::write(&path, serde_json::to_string_pretty(&records).unwrap()).unwrap();

    let err = JsonExpenseRepository::open(&path).unwrap_err();

    assert!(matches!(
        err,
        RepoError::Decode(ExpenseDecodeError::Validation(_))
    ));
}

#[test]
fn malformed_timestamp_in_stored_record_aborts_open() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let records = json!([{
        "id": "11111111-2222-4333-8444-555555555555",
        "title": "Groceries",
        "amount": 50.0,
        "created_at": "last tuesday",
        "updated_at": "2026-02-13T10:00:00+00:00"
    }]);
    std::fs::write(&path, serde_json::to_string_pretty(&records).unwrap()).unwrap();

    let err = JsonExpenseRepository::open(&path).unwrap_err();

    assert!(matches!(
        err,
        RepoError::Decode(ExpenseDecodeError::MalformedTimestamp {
            field: "created_at",
            ..
        })
    ));
}

#[test]
fn end_to_end_add_remove_reopen_cycle() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);

    let mut store = JsonExpenseRepository::open(&path).unwrap();
    assert!(store.expenses().is_empty());

    let id = store
        .add(Expense::new("Groceries", 50.0).unwrap(), false)
        .unwrap();
    assert_eq!(store.expenses().len(), 1);
    let on_disk: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.as_array().unwrap().len(), 1);
    assert_eq!(on_disk[0]["title"], "Groceries");
    assert_eq!(on_disk[0]["amount"], 50.0);

    assert!(store.remove(id).unwrap());
    assert!(store.expenses().is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");

    let reopened = JsonExpenseRepository::open(&path).unwrap();
    assert!(reopened.expenses().is_empty());
}
