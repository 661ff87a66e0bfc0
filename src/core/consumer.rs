//! Idempotent queue consumer
//!
//! This module provides the `Consumer` struct, which drains the clearing queue
//! and runs each transaction through the processing step exactly once per
//! process lifetime, even though the queue delivers at least once.
//!
//! # Message Lifecycle
//!
//! ```text
//! Received ──decode fails──▶ Discarded ──▶ ack
//!    │
//!    ▼
//! Decoded ──claim denied──▶ Duplicate ──▶ ack
//!    │
//!    ▼ claim granted
//! Claimed ──▶ Processed ──▶ ack
//! ```
//!
//! A failed ack is logged and left alone. The transport redelivers the
//! message once its visibility timeout expires, the claim is denied, and the
//! redelivery is acknowledged as a duplicate.
//!
//! # Architecture
//!
//! ```text
//! Consumer
//!     ├── Arc<dyn QueuePort>            (transport)
//!     ├── Arc<dyn DedupStore>           (claim ledger, shareable across consumers)
//!     ├── Arc<dyn TransactionProcessor> (opaque processing step)
//!     └── ConsumerConfig                (batch size, long-poll wait, back-off)
//! ```
//!
//! # Concurrency
//!
//! One sequential loop polls the queue. The messages of one batch are handled
//! concurrently, up to `max_concurrent` at a time; they only meet at
//! `DedupStore::try_claim`, which is atomic.

use crate::core::traits::{DedupStore, QueuePort, TransactionProcessor};
use crate::io::wire_format;
use crate::types::{ClearingError, QueueHandle, ReceivedMessage, TransactionId};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Queue the clearing pipeline publishes to and consumes from
pub const DEFAULT_QUEUE_NAME: &str = "clearing-transactions";

/// Configuration for the consumer loop
#[derive(Clone, Debug)]
pub struct ConsumerConfig {
    /// Logical queue name, resolved (or created) at connect time
    pub queue_name: String,
    /// Maximum messages requested per receive call
    pub batch_size: usize,
    /// Long-poll wait per receive call
    pub wait_time: Duration,
    /// Pause after a failed receive call
    pub backoff: Duration,
    /// Maximum messages of one batch handled concurrently
    pub max_concurrent: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            queue_name: DEFAULT_QUEUE_NAME.to_string(),
            batch_size: 10,
            wait_time: Duration::from_secs(10),
            backoff: Duration::from_secs(5),
            max_concurrent: num_cpus::get(),
        }
    }
}

impl ConsumerConfig {
    /// Create a new ConsumerConfig with custom batch sizing
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent = if max_concurrent == 0 {
            tracing::warn!(
                max_concurrent,
                default = default.max_concurrent,
                "invalid max_concurrent, using default"
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            batch_size,
            max_concurrent,
            ..default
        }
    }

    pub fn with_queue_name(mut self, queue_name: impl Into<String>) -> Self {
        self.queue_name = queue_name.into();
        self
    }

    pub fn with_wait_time(mut self, wait_time: Duration) -> Self {
        self.wait_time = wait_time;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

/// What happened to one received message
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    /// First delivery of this id: the processing step ran
    Processed { id: TransactionId },
    /// The id was already claimed: nothing ran
    Duplicate { id: TransactionId },
    /// The body did not decode: nothing ran, the message is dropped
    Discarded { error: ClearingError },
}

/// Result of handling a single message
///
/// Contains the outcome and the result of acknowledging the delivery.
#[derive(Debug, Clone)]
pub struct MessageResult {
    pub outcome: MessageOutcome,
    pub ack: Result<(), ClearingError>,
}

/// Snapshot of the consumer counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub received: u64,
    pub processed: u64,
    pub duplicates: u64,
    pub discarded: u64,
    pub ack_failures: u64,
    pub poll_errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    processed: AtomicU64,
    duplicates: AtomicU64,
    discarded: AtomicU64,
    ack_failures: AtomicU64,
    poll_errors: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    fn record(&self, outcome: &MessageOutcome) {
        match outcome {
            MessageOutcome::Processed { .. } => Self::bump(&self.processed, 1),
            MessageOutcome::Duplicate { .. } => Self::bump(&self.duplicates, 1),
            MessageOutcome::Discarded { .. } => Self::bump(&self.discarded, 1),
        }
    }

    fn snapshot(&self) -> ConsumerStats {
        ConsumerStats {
            received: self.received.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            ack_failures: self.ack_failures.load(Ordering::Relaxed),
            poll_errors: self.poll_errors.load(Ordering::Relaxed),
        }
    }
}

/// Idempotent consumer of the clearing queue
pub struct Consumer {
    queue: Arc<dyn QueuePort>,
    dedup: Arc<dyn DedupStore>,
    processor: Arc<dyn TransactionProcessor>,
    handle: QueueHandle,
    config: ConsumerConfig,
    counters: Counters,
}

impl Consumer {
    /// Resolve the configured queue and build a consumer for it
    ///
    /// The queue is created if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Any transport error while resolving the queue. The consumer must not
    /// start without a reachable queue, so callers treat this as fatal.
    pub async fn connect(
        queue: Arc<dyn QueuePort>,
        dedup: Arc<dyn DedupStore>,
        processor: Arc<dyn TransactionProcessor>,
        config: ConsumerConfig,
    ) -> Result<Self, ClearingError> {
        let handle = queue.resolve_or_create(&config.queue_name).await?;
        tracing::info!(queue = %config.queue_name, %handle, "consumer connected");

        Ok(Self {
            queue,
            dedup,
            processor,
            handle,
            config,
            counters: Counters::default(),
        })
    }

    pub fn handle(&self) -> &QueueHandle {
        &self.handle
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    pub fn stats(&self) -> ConsumerStats {
        self.counters.snapshot()
    }

    /// Drive one message through decode, claim, process and acknowledge
    pub async fn handle_message(&self, message: ReceivedMessage) -> MessageResult {
        let outcome = match wire_format::decode(&message.body) {
            Err(error) => {
                tracing::error!(
                    %error,
                    receipt = %message.receipt,
                    "discarding undecodable message"
                );
                MessageOutcome::Discarded { error }
            }
            Ok(tx) => {
                if self.dedup.try_claim(tx.id()) {
                    self.processor.process(&tx).await;
                    MessageOutcome::Processed {
                        id: tx.id().to_owned(),
                    }
                } else {
                    tracing::warn!(id = tx.id(), "duplicate delivery, skipping");
                    MessageOutcome::Duplicate {
                        id: tx.id().to_owned(),
                    }
                }
            }
        };
        self.counters.record(&outcome);

        let ack = self.queue.delete(&self.handle, &message.receipt).await;
        match &ack {
            Ok(()) => tracing::debug!(receipt = %message.receipt, "message acknowledged"),
            Err(error) => {
                Counters::bump(&self.counters.ack_failures, 1);
                tracing::warn!(
                    %error,
                    receipt = %message.receipt,
                    "failed to acknowledge message, leaving it to redelivery"
                );
            }
        }

        MessageResult { outcome, ack }
    }

    /// Handle a batch of received messages
    ///
    /// Messages are handled concurrently, at most `max_concurrent` at a time.
    /// Results come back in completion order.
    pub async fn process_batch(&self, messages: Vec<ReceivedMessage>) -> Vec<MessageResult> {
        stream::iter(messages)
            .map(|message| self.handle_message(message))
            .buffer_unordered(self.config.max_concurrent.max(1))
            .collect()
            .await
    }

    /// Long-poll the queue once
    async fn receive(&self) -> Result<Vec<ReceivedMessage>, ClearingError> {
        let messages = self
            .queue
            .receive_batch(&self.handle, self.config.batch_size, self.config.wait_time)
            .await?;
        Counters::bump(&self.counters.received, messages.len() as u64);
        Ok(messages)
    }

    /// Receive one batch and handle every message in it
    ///
    /// # Errors
    ///
    /// The receive call failed; no message was handled.
    pub async fn poll_once(&self) -> Result<Vec<MessageResult>, ClearingError> {
        let messages = self.receive().await?;
        Ok(self.process_batch(messages).await)
    }

    /// Run the polling loop until `shutdown` is cancelled
    ///
    /// Receive errors are logged, followed by a back-off pause, and never end
    /// the loop. Cancellation is observed while waiting on the long poll and
    /// during the back-off; a batch already received is always handled to
    /// completion first.
    ///
    /// # Returns
    ///
    /// The counters at the time the loop stopped.
    pub async fn run(&self, shutdown: CancellationToken) -> ConsumerStats {
        tracing::info!(
            queue = %self.config.queue_name,
            batch_size = self.config.batch_size,
            "waiting for messages"
        );

        loop {
            let received = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                received = self.receive() => received,
            };

            match received {
                Ok(messages) => {
                    if !messages.is_empty() {
                        self.process_batch(messages).await;
                    }
                }
                Err(error) => {
                    Counters::bump(&self.counters.poll_errors, 1);
                    tracing::error!(
                        %error,
                        backoff = ?self.config.backoff,
                        "failed to receive messages, backing off"
                    );
                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.config.backoff) => {}
                    }
                }
            }
        }

        let stats = self.stats();
        tracing::info!(?stats, "consumer stopped");
        stats
    }
}
