//! Core business logic module
//!
//! This module contains the consuming side of the clearing pipeline:
//! - `traits` - Seams for the claim ledger, queue transport and processing step
//! - `dedup_store` - In-memory atomic claim ledger
//! - `consumer` - Idempotent polling loop over the queue
//! - `processor` - Processing step implementations

pub mod consumer;
pub mod dedup_store;
pub mod processor;
pub mod traits;

pub use consumer::{Consumer, ConsumerConfig, ConsumerStats, MessageOutcome, MessageResult};
pub use dedup_store::InMemoryDedupStore;
pub use processor::LoggingProcessor;
pub use traits::{DedupStore, QueuePort, TransactionProcessor};
