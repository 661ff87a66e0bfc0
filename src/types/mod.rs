//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `transaction`: The validated clearing transaction and its identifiers
//! - `message`: Queue handles, receipts and received messages
//! - `error`: Error types for the clearing engine

pub mod error;
pub mod message;
pub mod transaction;

pub use error::ClearingError;
pub use message::{QueueHandle, ReceiptToken, ReceivedMessage};
pub use transaction::{BankCode, MinorUnits, Transaction, TransactionId};
