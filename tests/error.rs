use serde_json::Value;
use taskboard::error::{exit_codes, Error, JsonError};

#[test]
fn exit_code_user_error() {
    assert_eq!(
        Error::TaskNotFound("t".to_string()).exit_code(),
        exit_codes::USER_ERROR
    );
    assert_eq!(
        Error::InvalidInput("bad".to_string()).exit_code(),
        exit_codes::USER_ERROR
    );
}

#[test]
fn exit_code_policy_blocked() {
    assert_eq!(
        Error::DefaultColumnProtected("1".to_string()).exit_code(),
        exit_codes::POLICY_BLOCKED
    );
    let err = Error::ColumnNotEmpty {
        id: "x".to_string(),
        tasks: 2,
    };
    assert_eq!(err.exit_code(), exit_codes::POLICY_BLOCKED);
}

#[test]
fn exit_code_operation_failed() {
    let err = Error::QuotaExceeded {
        key: "taskColumns".to_string(),
        limit: 10,
    };
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn column_not_empty_message_and_details() {
    let err = Error::ColumnNotEmpty {
        id: "backlog".to_string(),
        tasks: 3,
    };
    assert!(err.to_string().starts_with("Cannot delete column with tasks"));
    let details = err.details().expect("details");
    assert_eq!(details["column_id"], Value::String("backlog".to_string()));
    assert_eq!(details["tasks"], 3);
}

#[test]
fn json_error_includes_details() {
    let err = Error::InvalidConfig("bad config".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert_eq!(json.kind, "user_error");
    assert_eq!(json.message, "Invalid configuration: bad config");
    let details = json.details.expect("details");
    assert_eq!(details["message"], Value::String("bad config".to_string()));
}

#[test]
fn kind_follows_exit_code() {
    assert_eq!(
        Error::DefaultColumnProtected("1".to_string()).kind(),
        "policy_blocked"
    );
    assert_eq!(
        Error::LockFailed("taskColumns.json.lock".into()).kind(),
        "operation_failed"
    );
    assert_eq!(Error::ColumnNotFound("9".to_string()).kind(), "user_error");
}
