//! Clearing Engine Library
//! # Overview
//!
//! This library ingests fixed-width clearing files and consumes the records
//! from an at-least-once queue, running each transaction through processing
//! exactly once per process lifetime.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Transaction, queue handles, errors)
//! - [`io`] - Positional parsing (sync and async readers) and the wire format
//! - [`queue`] - In-memory queue transport and the producer
//! - [`core`] - Consuming side of the pipeline:
//!   - [`core::traits`] - Seams for the claim ledger, transport and processing step
//!   - [`core::dedup_store`] - Atomic claim ledger
//!   - [`core::consumer`] - Idempotent polling loop
//! - [`strategy`] - Pluggable ingest strategies (parse a file, publish its records)
//! - [`cli`] - CLI arguments parsing
//! - [`logging`] - Tracing subscriber setup
//!
//! # Record Layout
//!
//! Each line of a clearing file is one record of four fixed-width fields:
//!
//! | Field | Width | Content |
//! |---|---|---|
//! | id | 36 | transaction id |
//! | origin | 4 | originating bank code |
//! | destiny | 4 | destination bank code |
//! | amount | 10 | amount in minor units |
//!
//! Lines shorter than 54 characters, or with a non-numeric amount, are skipped.
//!
//! # Delivery Guarantees
//!
//! The queue may deliver a message more than once. The consumer claims each
//! transaction id atomically before processing it, so redeliveries are
//! acknowledged without running the processing step again.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod queue;
pub mod strategy;
pub mod types;

pub use crate::core::{Consumer, ConsumerConfig, ConsumerStats, InMemoryDedupStore};
pub use crate::io::{parse_transactions, FieldLayout};
pub use crate::queue::{InMemoryQueue, Producer};
pub use crate::types::{ClearingError, Transaction, TransactionId};
