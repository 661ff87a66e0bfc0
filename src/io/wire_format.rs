//! Wire format of queue messages
//!
//! A transaction travels as a JSON object:
//!
//! ```json
//! {"id":"...","origin":"0001","destiny":"0002","amount":1000,"created_at":"2024-05-01T12:00:00Z"}
//! ```
//!
//! Decoding validates the same invariants as the constructor, so a body with
//! an empty id or a non-positive amount fails to decode.

use crate::types::{ClearingError, Transaction};

/// Encode a transaction into a message body
pub fn encode(tx: &Transaction) -> Result<Vec<u8>, ClearingError> {
    serde_json::to_vec(tx).map_err(|e| ClearingError::EncodeError {
        message: e.to_string(),
    })
}

/// Decode a message body into a transaction
pub fn decode(body: &[u8]) -> Result<Transaction, ClearingError> {
    Ok(serde_json::from_slice(body)?)
}
