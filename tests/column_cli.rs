mod support;

use predicates::str::contains;
use serde_json::Value;
use taskboard::error::exit_codes;

use support::{json_data, taskboard_cmd, TestDataDir};

#[test]
fn add_then_delete_column() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestDataDir::new();

    let added = json_data(taskboard_cmd(&data).args(["column", "add", "  Backlog  "]));
    assert_eq!(added["columns"], 4);
    assert_eq!(added["column"]["title"], "Backlog");
    assert_eq!(added["column"]["isDefault"], false);
    let id = added["column"]["id"].as_str().expect("column id").to_string();

    let deleted = json_data(taskboard_cmd(&data).args(["column", "delete", id.as_str()]));
    assert_eq!(deleted["columns"], 3);
    assert_eq!(data.read_board()?, taskboard::Board::default());
    Ok(())
}

#[test]
fn column_title_is_validated() {
    let data = TestDataDir::new();
    let long_title = "t".repeat(51);

    taskboard_cmd(&data)
        .args(["column", "add", long_title.as_str()])
        .assert()
        .code(exit_codes::USER_ERROR)
        .stderr(contains("at most 50"));

    taskboard_cmd(&data)
        .args(["column", "add", "   "])
        .assert()
        .code(exit_codes::USER_ERROR)
        .stderr(contains("Title is required"));
}

#[test]
fn default_column_delete_is_blocked() {
    let data = TestDataDir::new();
    taskboard_cmd(&data)
        .args(["column", "delete", "1"])
        .assert()
        .code(exit_codes::POLICY_BLOCKED)
        .stderr(contains("Cannot delete default column"));
}

#[test]
fn non_empty_column_delete_is_blocked_with_json_details() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestDataDir::new();
    let added = json_data(taskboard_cmd(&data).args(["column", "add", "Review"]));
    let id = added["column"]["id"].as_str().expect("column id").to_string();
    json_data(taskboard_cmd(&data).args([
        "task",
        "add",
        "--name",
        "Pending",
        "--deadline",
        "2024-03-20",
        "--column",
        id.as_str(),
    ]));

    let output = taskboard_cmd(&data)
        .args(["--json", "column", "delete", id.as_str()])
        .output()?;
    assert_eq!(output.status.code(), Some(exit_codes::POLICY_BLOCKED));

    let envelope: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["command"], "column delete");
    assert_eq!(envelope["error"]["kind"], "policy_blocked");
    assert_eq!(envelope["error"]["details"]["column_id"], Value::String(id));
    assert_eq!(envelope["error"]["details"]["tasks"], 1);

    assert_eq!(data.read_board()?.columns.len(), 4);
    Ok(())
}
