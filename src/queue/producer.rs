//! Transaction publisher
//!
//! The `Producer` turns parsed transactions into queue messages. Publishing is
//! a single delegated `send`; the only policy here is that one failed publish
//! never aborts the rest of a batch.

use crate::core::traits::QueuePort;
use crate::io::wire_format;
use crate::types::{ClearingError, QueueHandle, Transaction};
use std::sync::Arc;

/// Publisher bound to one resolved queue
pub struct Producer {
    queue: Arc<dyn QueuePort>,
    handle: QueueHandle,
}

impl Producer {
    /// Resolve (or create) the named queue and bind a producer to it
    ///
    /// # Errors
    ///
    /// Any transport error while resolving the queue. Ingestion must not start
    /// without a reachable queue.
    pub async fn connect(queue: Arc<dyn QueuePort>, name: &str) -> Result<Self, ClearingError> {
        let handle = queue.resolve_or_create(name).await?;
        tracing::info!(queue = name, %handle, "producer connected");
        Ok(Self { queue, handle })
    }

    pub fn handle(&self) -> &QueueHandle {
        &self.handle
    }

    /// Encode and send one transaction
    pub async fn publish(&self, tx: &Transaction) -> Result<(), ClearingError> {
        let body = wire_format::encode(tx)?;
        self.queue.send(&self.handle, body).await?;
        tracing::info!(id = tx.id(), amount = tx.amount(), "transaction published");
        Ok(())
    }

    /// Publish every transaction, skipping the ones that fail
    ///
    /// # Returns
    ///
    /// The number of transactions successfully enqueued.
    pub async fn publish_all<'a, I>(&self, transactions: I) -> usize
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut enqueued = 0;
        for tx in transactions {
            match self.publish(tx).await {
                Ok(()) => enqueued += 1,
                Err(error) => {
                    tracing::warn!(id = tx.id(), %error, "failed to publish transaction");
                }
            }
        }
        enqueued
    }
}
