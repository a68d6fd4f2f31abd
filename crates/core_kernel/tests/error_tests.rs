//! Tests for core_kernel error types

use core_kernel::CoreError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_not_found() {
    let error = CoreError::not_found("customer 42");

    match error {
        CoreError::NotFound(msg) => assert!(msg.contains("customer")),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_error_messages_carry_context() {
    assert_eq!(
        CoreError::validation("quantity must be positive").to_string(),
        "Validation error: quantity must be positive"
    );
    assert_eq!(
        CoreError::not_found("branch").to_string(),
        "Not found: branch"
    );
}
