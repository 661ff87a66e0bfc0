//! Queue-facing types
//!
//! Handles and tokens are opaque strings issued by the transport. The engine
//! only passes them back to the transport that issued them.

use std::fmt;

/// Transport handle of a resolved queue (an SQS queue URL, for instance)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueHandle(String);

impl QueueHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token identifying one delivery of a message, used to acknowledge it
///
/// Each redelivery of the same message carries a different receipt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptToken(String);

impl ReceiptToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One delivery returned by a receive call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Raw message body, expected to hold a wire-encoded transaction
    pub body: Vec<u8>,
    /// Receipt to pass to `delete` once the message is handled
    pub receipt: ReceiptToken,
}
