//! Asynchronous batch ingest strategy
//!
//! Streams the file through `AsyncReader` in batches and publishes each batch
//! before reading the next, so memory stays bounded by the batch size.
//!
//! # Architecture
//!
//! ```text
//! AsyncIngestStrategy
//!     ├── batch_size
//!     ├── AsyncReader (batch reading over tokio::fs::File)
//!     └── Producer    (wire encoding + send)
//! ```

use crate::io::async_reader::AsyncReader;
use crate::queue::Producer;
use crate::strategy::{open_error, IngestReport, IngestStrategy};
use crate::types::ClearingError;
use async_trait::async_trait;
use std::path::Path;
use tokio::io::BufReader;

/// Records read per batch when none is configured
pub const DEFAULT_INGEST_BATCH_SIZE: usize = 100;

/// Asynchronous batch ingest strategy
#[derive(Debug, Clone)]
pub struct AsyncIngestStrategy {
    batch_size: usize,
}

impl AsyncIngestStrategy {
    /// Create a new AsyncIngestStrategy
    ///
    /// A zero batch size falls back to [`DEFAULT_INGEST_BATCH_SIZE`].
    pub fn new(batch_size: usize) -> Self {
        let batch_size = if batch_size == 0 {
            tracing::warn!(
                batch_size,
                default = DEFAULT_INGEST_BATCH_SIZE,
                "invalid ingest batch size, using default"
            );
            DEFAULT_INGEST_BATCH_SIZE
        } else {
            batch_size
        };

        Self { batch_size }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Default for AsyncIngestStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_INGEST_BATCH_SIZE)
    }
}

#[async_trait]
impl IngestStrategy for AsyncIngestStrategy {
    async fn ingest(
        &self,
        input_path: &Path,
        producer: &Producer,
    ) -> Result<IngestReport, ClearingError> {
        let file = tokio::fs::File::open(input_path)
            .await
            .map_err(|e| open_error(input_path, e))?;
        let mut reader = AsyncReader::new(BufReader::new(file));
        let mut report = IngestReport::default();

        loop {
            let batch = reader.read_batch(self.batch_size).await?;
            if batch.is_empty() {
                break;
            }

            report.parsed += batch.len();
            report.enqueued += producer.publish_all(&batch).await;
        }

        tracing::debug!(
            lines = reader.lines_read(),
            skipped = reader.lines_skipped(),
            "finished reading flat file"
        );
        Ok(report)
    }
}
