//! Error types for the Clearing Engine
//!
//! This module defines all error types that can occur while parsing flat files,
//! moving transactions through the queue and consuming them.
//! Errors are designed to be descriptive and carry enough context for log output.
//!
//! # Error Categories
//!
//! - **Line-level errors**: Short lines, bad encoding, malformed amounts, failed
//!   validation. The offending line is skipped and parsing continues.
//! - **Stream errors**: File not found, read failures. Fatal to the parse operation.
//! - **Wire errors**: Encode/decode failures of the queue message body
//! - **Queue errors**: Transport failures, unknown queues, stale receipts

use thiserror::Error;

/// Main error type for the clearing engine
///
/// Each variant includes relevant context to help diagnose the issue.
/// Use [`ClearingError::is_line_level`] to tell per-line parse failures
/// (recoverable) from stream failures (fatal).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClearingError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents ingestion from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading the input stream
    ///
    /// Fatal to the parse operation: the remaining stream is abandoned.
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// Line is shorter than the record layout requires
    #[error("Line {line} too short: {length} characters, layout requires {required}")]
    LineTooShort {
        /// 1-based line number
        line: u64,
        /// Character count of the line
        length: usize,
        /// Minimum character count of the layout
        required: usize,
    },

    /// Line is not valid UTF-8
    #[error("Line {line} is not valid UTF-8")]
    InvalidEncoding {
        /// 1-based line number
        line: u64,
    },

    /// Amount field is not a base-10 integer
    #[error("Invalid amount '{value}' at line {line}")]
    InvalidAmount {
        /// 1-based line number
        line: u64,
        /// The trimmed amount field
        value: String,
    },

    /// Transaction id is empty
    #[error("Transaction id is required")]
    EmptyId,

    /// Transaction amount is zero or negative
    #[error("Amount must be greater than zero for transaction {id}, got {amount}")]
    NonPositiveAmount {
        /// Transaction id
        id: String,
        /// The rejected amount in minor units
        amount: i64,
    },

    /// Queue message body could not be decoded into a transaction
    #[error("Decode error: {message}")]
    DecodeError {
        /// Description of the decode failure
        message: String,
    },

    /// Transaction could not be encoded into a queue message body
    #[error("Encode error: {message}")]
    EncodeError {
        /// Description of the encode failure
        message: String,
    },

    /// Transport-level failure of a queue operation
    #[error("Queue {operation} failed: {message}")]
    QueueError {
        /// Queue operation that failed (send, receive, delete, ...)
        operation: String,
        /// Description of the failure
        message: String,
    },

    /// Queue handle does not refer to an existing queue
    #[error("Queue not found: {name}")]
    QueueNotFound {
        /// Queue name or handle
        name: String,
    },

    /// Receipt token does not match an in-flight delivery
    #[error("Receipt not found: {receipt}")]
    ReceiptNotFound {
        /// The unknown or stale receipt token
        receipt: String,
    },
}

impl ClearingError {
    /// Whether this error only concerns a single input line
    ///
    /// Line-level errors are skipped by the parser; everything else aborts
    /// the parse operation.
    pub fn is_line_level(&self) -> bool {
        matches!(
            self,
            ClearingError::LineTooShort { .. }
                | ClearingError::InvalidEncoding { .. }
                | ClearingError::InvalidAmount { .. }
                | ClearingError::EmptyId
                | ClearingError::NonPositiveAmount { .. }
        )
    }
}

// Conversion from io::Error to ClearingError
impl From<std::io::Error> for ClearingError {
    fn from(error: std::io::Error) -> Self {
        ClearingError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from serde_json::Error to ClearingError
impl From<serde_json::Error> for ClearingError {
    fn from(error: serde_json::Error) -> Self {
        ClearingError::DecodeError {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl ClearingError {
    /// Create a LineTooShort error
    pub fn line_too_short(line: u64, length: usize, required: usize) -> Self {
        ClearingError::LineTooShort {
            line,
            length,
            required,
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(line: u64, value: &str) -> Self {
        ClearingError::InvalidAmount {
            line,
            value: value.to_string(),
        }
    }

    /// Create a NonPositiveAmount error
    pub fn non_positive_amount(id: &str, amount: i64) -> Self {
        ClearingError::NonPositiveAmount {
            id: id.to_string(),
            amount,
        }
    }

    /// Create a QueueError error
    pub fn queue(operation: &str, message: impl ToString) -> Self {
        ClearingError::QueueError {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a QueueNotFound error
    pub fn queue_not_found(name: &str) -> Self {
        ClearingError::QueueNotFound {
            name: name.to_string(),
        }
    }

    /// Create a ReceiptNotFound error
    pub fn receipt_not_found(receipt: &str) -> Self {
        ClearingError::ReceiptNotFound {
            receipt: receipt.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::file_not_found(
        ClearingError::FileNotFound { path: "batch.txt".to_string() },
        "File not found: batch.txt"
    )]
    #[case::io_error(
        ClearingError::IoError { message: "Permission denied".to_string() },
        "I/O error: Permission denied"
    )]
    #[case::line_too_short(
        ClearingError::LineTooShort { line: 3, length: 20, required: 54 },
        "Line 3 too short: 20 characters, layout requires 54"
    )]
    #[case::invalid_encoding(
        ClearingError::InvalidEncoding { line: 7 },
        "Line 7 is not valid UTF-8"
    )]
    #[case::invalid_amount(
        ClearingError::InvalidAmount { line: 2, value: "00000A1000".to_string() },
        "Invalid amount '00000A1000' at line 2"
    )]
    #[case::empty_id(ClearingError::EmptyId, "Transaction id is required")]
    #[case::non_positive_amount(
        ClearingError::NonPositiveAmount { id: "tx-1".to_string(), amount: 0 },
        "Amount must be greater than zero for transaction tx-1, got 0"
    )]
    #[case::queue_error(
        ClearingError::QueueError { operation: "receive".to_string(), message: "connection reset".to_string() },
        "Queue receive failed: connection reset"
    )]
    #[case::receipt_not_found(
        ClearingError::ReceiptNotFound { receipt: "r-1".to_string() },
        "Receipt not found: r-1"
    )]
    fn test_error_display(#[case] error: ClearingError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::line_too_short(
        ClearingError::line_too_short(1, 10, 54),
        ClearingError::LineTooShort { line: 1, length: 10, required: 54 }
    )]
    #[case::invalid_amount(
        ClearingError::invalid_amount(4, "abc"),
        ClearingError::InvalidAmount { line: 4, value: "abc".to_string() }
    )]
    #[case::queue(
        ClearingError::queue("delete", "timeout"),
        ClearingError::QueueError { operation: "delete".to_string(), message: "timeout".to_string() }
    )]
    #[case::queue_not_found(
        ClearingError::queue_not_found("clearing-transactions"),
        ClearingError::QueueNotFound { name: "clearing-transactions".to_string() }
    )]
    fn test_helper_functions(#[case] result: ClearingError, #[case] expected: ClearingError) {
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case::short(ClearingError::line_too_short(1, 0, 54), true)]
    #[case::encoding(ClearingError::InvalidEncoding { line: 1 }, true)]
    #[case::amount(ClearingError::invalid_amount(1, "x"), true)]
    #[case::empty_id(ClearingError::EmptyId, true)]
    #[case::non_positive(ClearingError::non_positive_amount("a", -5), true)]
    #[case::io(ClearingError::IoError { message: "eof".to_string() }, false)]
    #[case::decode(ClearingError::DecodeError { message: "bad".to_string() }, false)]
    #[case::queue(ClearingError::queue("send", "down"), false)]
    fn test_is_line_level(#[case] error: ClearingError, #[case] expected: bool) {
        assert_eq!(error.is_line_level(), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: ClearingError = io_error.into();
        assert!(matches!(error, ClearingError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: ClearingError = json_error.into();
        assert!(matches!(error, ClearingError::DecodeError { .. }));
    }
}
