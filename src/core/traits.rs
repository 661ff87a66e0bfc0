//! Core traits for deduplication, queue transport and transaction processing
//!
//! This module defines the seams of the engine. The consumer only talks to
//! these traits, so the in-memory implementations shipped with the crate can
//! be swapped for a durable claim ledger or a real message queue.

use crate::types::{ClearingError, QueueHandle, ReceiptToken, ReceivedMessage, Transaction};
use async_trait::async_trait;
use std::time::Duration;

/// Set of transaction ids already claimed for processing
///
/// Checking and marking happen in one atomic step. Two concurrent deliveries
/// of the same id can never both win the claim.
pub trait DedupStore: Send + Sync {
    /// Claim `id` for processing
    ///
    /// Returns `true` if the caller is the first to claim `id`, in which case
    /// the id is now marked. Returns `false` if it was already claimed.
    fn try_claim(&self, id: &str) -> bool;

    /// Whether `id` has been claimed (read-only observer)
    fn is_claimed(&self, id: &str) -> bool;

    /// Number of claimed ids
    fn len(&self) -> usize;

    /// Whether no id has been claimed yet
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Message queue transport with at-least-once delivery
///
/// Mirrors the primitives of hosted queues such as SQS: resolve a queue by
/// name, send, long-poll receive, and delete by receipt.
#[async_trait]
pub trait QueuePort: Send + Sync {
    /// Resolve a queue name to a handle, creating the queue if it is missing
    async fn resolve_or_create(&self, name: &str) -> Result<QueueHandle, ClearingError>;

    /// Publish one message body
    async fn send(&self, queue: &QueueHandle, body: Vec<u8>) -> Result<(), ClearingError>;

    /// Receive up to `max_messages`, waiting at most `wait` for the first one
    ///
    /// An empty vector means the wait elapsed with nothing to deliver.
    async fn receive_batch(
        &self,
        queue: &QueueHandle,
        max_messages: usize,
        wait: Duration,
    ) -> Result<Vec<ReceivedMessage>, ClearingError>;

    /// Acknowledge a delivery, removing the message from the queue
    async fn delete(&self, queue: &QueueHandle, receipt: &ReceiptToken)
        -> Result<(), ClearingError>;
}

/// The processing step run once per claimed transaction
///
/// Processing is a side effect the consumer treats as opaque. It cannot fail
/// from the consumer's point of view: once an id is claimed, the message is
/// acknowledged after this returns.
#[async_trait]
pub trait TransactionProcessor: Send + Sync {
    async fn process(&self, tx: &Transaction);
}
