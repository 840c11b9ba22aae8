//! Custom assertion macros and utilities
//!
//! Provides enhanced assertion macros for better test output and
//! more descriptive error messages.

/// Assert that a result is ok and return the value
///
/// This macro unwraps a Result, providing a better error message
/// if the result is an error.
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a result is an error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        assert!($result.is_err(), "Expected Err, got Ok");
    };
    ($result:expr, $pattern:pat) => {
        match $result {
            Err($pattern) => {}
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => panic!("Expected different error variant, got: {:?}", e),
        }
    };
}

/// Assert the pending queue length of a coordinator
#[macro_export]
macro_rules! assert_pending {
    ($coordinator:expr, $expected:expr) => {
        let pending = $coordinator.pending_count().await;
        assert_eq!(pending, $expected, "Expected {} queued mutations, found {}", $expected, pending);
    };
}

/// Assert that an item's Done flag has the expected value
#[macro_export]
macro_rules! assert_done {
    ($snapshot:expr, $sheet:expr, $row:expr, $expected:expr) => {
        match $snapshot.item($sheet, $row) {
            Some(item) => assert_eq!(item.done, $expected, "{} row {} Done flag", $sheet, $row),
            None => panic!("{} row {} is missing", $sheet, $row),
        }
    };
}
