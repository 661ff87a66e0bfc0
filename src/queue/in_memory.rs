//! In-process message queue with at-least-once delivery
//!
//! `InMemoryQueue` implements [`QueuePort`] with the delivery semantics of a
//! hosted queue such as SQS:
//!
//! - A received message is hidden ("in flight") until it is deleted or its
//!   visibility timeout expires, after which it is delivered again.
//! - Every delivery carries a fresh receipt token. Only the latest receipt of
//!   an in-flight message can delete it.
//! - `receive_batch` long-polls: with nothing ready it waits for a `send`, or
//!   for an in-flight message to become visible again, up to the given wait.
//!
//! Queues live in a `DashMap` keyed by handle; each queue's state sits behind
//! its own mutex, never held across an `.await`.

use crate::core::traits::QueuePort;
use crate::types::{ClearingError, QueueHandle, ReceiptToken, ReceivedMessage};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use uuid::Uuid;

/// Visibility timeout applied when none is configured
pub const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

const HANDLE_SCHEME: &str = "memory://";

#[derive(Debug, Clone)]
struct StoredMessage {
    body: Vec<u8>,
    receive_count: u32,
}

#[derive(Debug)]
struct InFlight {
    message: StoredMessage,
    visible_at: Instant,
}

#[derive(Debug, Default)]
struct QueueState {
    ready: VecDeque<StoredMessage>,
    in_flight: HashMap<String, InFlight>,
}

impl QueueState {
    /// Return in-flight messages whose visibility timeout expired to the ready set
    fn requeue_expired(&mut self, now: Instant) {
        let expired: Vec<String> = self
            .in_flight
            .iter()
            .filter(|(_, entry)| entry.visible_at <= now)
            .map(|(receipt, _)| receipt.clone())
            .collect();

        for receipt in expired {
            if let Some(entry) = self.in_flight.remove(&receipt) {
                tracing::debug!(
                    %receipt,
                    receive_count = entry.message.receive_count,
                    "visibility timeout expired, message returns to queue"
                );
                self.ready.push_back(entry.message);
            }
        }
    }

    fn next_visible_at(&self) -> Option<Instant> {
        self.in_flight.values().map(|entry| entry.visible_at).min()
    }

    fn take(&mut self, max_messages: usize, visible_at: Instant) -> Vec<ReceivedMessage> {
        let count = max_messages.min(self.ready.len());
        let mut batch = Vec::with_capacity(count);

        for mut message in self.ready.drain(..count).collect::<Vec<_>>() {
            message.receive_count += 1;
            let receipt = Uuid::new_v4().to_string();
            batch.push(ReceivedMessage {
                body: message.body.clone(),
                receipt: ReceiptToken::new(receipt.clone()),
            });
            self.in_flight.insert(
                receipt,
                InFlight {
                    message,
                    visible_at,
                },
            );
        }

        batch
    }
}

#[derive(Debug, Default)]
struct Queue {
    state: Mutex<QueueState>,
    arrivals: Notify,
}

/// In-memory [`QueuePort`] implementation
#[derive(Debug)]
pub struct InMemoryQueue {
    queues: DashMap<String, Arc<Queue>>,
    visibility_timeout: Duration,
}

impl InMemoryQueue {
    /// Create a queue service with the default visibility timeout
    pub fn new() -> Self {
        Self::with_visibility_timeout(DEFAULT_VISIBILITY_TIMEOUT)
    }

    /// Create a queue service with a custom visibility timeout
    pub fn with_visibility_timeout(visibility_timeout: Duration) -> Self {
        Self {
            queues: DashMap::new(),
            visibility_timeout,
        }
    }

    pub fn visibility_timeout(&self) -> Duration {
        self.visibility_timeout
    }

    fn queue(&self, handle: &QueueHandle) -> Result<Arc<Queue>, ClearingError> {
        self.queues
            .get(handle.as_str())
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ClearingError::queue_not_found(handle.as_str()))
    }

    /// Number of messages not yet deleted (ready plus in flight)
    pub fn pending(&self, handle: &QueueHandle) -> Result<usize, ClearingError> {
        let queue = self.queue(handle)?;
        let state = queue.state.lock();
        Ok(state.ready.len() + state.in_flight.len())
    }

    /// Number of messages currently in flight
    pub fn in_flight(&self, handle: &QueueHandle) -> Result<usize, ClearingError> {
        let queue = self.queue(handle)?;
        let in_flight = queue.state.lock().in_flight.len();
        Ok(in_flight)
    }
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueuePort for InMemoryQueue {
    async fn resolve_or_create(&self, name: &str) -> Result<QueueHandle, ClearingError> {
        if name.is_empty() {
            return Err(ClearingError::queue("create", "queue name must not be empty"));
        }

        let handle = format!("{}{}", HANDLE_SCHEME, name);
        self.queues.entry(handle.clone()).or_insert_with(|| {
            tracing::debug!(queue = name, "creating queue");
            Arc::new(Queue::default())
        });

        Ok(QueueHandle::new(handle))
    }

    async fn send(&self, queue: &QueueHandle, body: Vec<u8>) -> Result<(), ClearingError> {
        let target = self.queue(queue)?;
        target.state.lock().ready.push_back(StoredMessage {
            body,
            receive_count: 0,
        });
        target.arrivals.notify_waiters();
        Ok(())
    }

    async fn receive_batch(
        &self,
        queue: &QueueHandle,
        max_messages: usize,
        wait: Duration,
    ) -> Result<Vec<ReceivedMessage>, ClearingError> {
        let target = self.queue(queue)?;
        let deadline = Instant::now() + wait;

        loop {
            // Register interest before looking at the state so a send between
            // the check and the wait is not missed.
            let arrival = target.arrivals.notified();
            tokio::pin!(arrival);
            arrival.as_mut().enable();

            let wake_at = {
                let now = Instant::now();
                let mut state = target.state.lock();
                state.requeue_expired(now);

                let batch = state.take(max_messages, now + self.visibility_timeout);
                if !batch.is_empty() || max_messages == 0 || now >= deadline {
                    return Ok(batch);
                }

                state
                    .next_visible_at()
                    .map_or(deadline, |visible_at| visible_at.min(deadline))
            };

            tokio::select! {
                _ = &mut arrival => {}
                _ = tokio::time::sleep_until(wake_at) => {}
            }
        }
    }

    async fn delete(
        &self,
        queue: &QueueHandle,
        receipt: &ReceiptToken,
    ) -> Result<(), ClearingError> {
        let target = self.queue(queue)?;
        let removed = target.state.lock().in_flight.remove(receipt.as_str());
        match removed {
            Some(_) => Ok(()),
            None => Err(ClearingError::receipt_not_found(receipt.as_str())),
        }
    }
}
