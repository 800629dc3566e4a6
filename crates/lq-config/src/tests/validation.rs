use crate::tests::{EnvGuard, temp_config_dir, validate_loaded};

use googletest::assert_that;
use googletest::prelude::{anything, err, ok};
use serial_test::serial;

#[test]
#[serial]
fn given_operation_id_limit_zero_when_validate_then_error() {
    // Given
    let _temp = temp_config_dir();
    let _limit = EnvGuard::set("LQ_VALIDATION_MAX_OPERATION_ID_LENGTH", "0");

    // When / Then
    assert_that!(validate_loaded(), err(anything()));
}

#[test]
#[serial]
fn given_filter_clause_limit_over_max_when_validate_then_error() {
    // Given
    let _temp = temp_config_dir();
    let _limit = EnvGuard::set("LQ_VALIDATION_MAX_FILTER_CLAUSES", "300");

    // When / Then
    assert_that!(validate_loaded(), err(anything()));
}

#[test]
#[serial]
fn given_error_message_limit_below_min_when_validate_then_error() {
    // Given - a cap this low would truncate messages into uselessness
    let _temp = temp_config_dir();
    let _limit = EnvGuard::set("LQ_VALIDATION_MAX_ERROR_MESSAGE_LENGTH", "10");

    // When / Then
    assert_that!(validate_loaded(), err(anything()));
}

#[test]
#[serial]
fn given_custom_validation_limits_when_validate_then_ok() {
    // Given
    let _temp = temp_config_dir();
    let _op = EnvGuard::set("LQ_VALIDATION_MAX_OPERATION_ID_LENGTH", "64");
    let _name = EnvGuard::set("LQ_VALIDATION_MAX_NAME_LENGTH", "64");
    let _clauses = EnvGuard::set("LQ_VALIDATION_MAX_FILTER_CLAUSES", "8");

    // When / Then
    assert_that!(validate_loaded(), ok(anything()));
}
