//! Synchronous ingest strategy
//!
//! Parses the whole file with the blocking `SyncReader` on tokio's blocking
//! pool, then publishes the records in file order.
//!
//! # Memory
//!
//! All valid records of the file are held at once before publishing. Use the
//! async strategy for files that do not comfortably fit in memory.

use crate::io::sync_reader::parse_transactions;
use crate::queue::Producer;
use crate::strategy::{open_error, IngestReport, IngestStrategy};
use crate::types::ClearingError;
use async_trait::async_trait;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Synchronous ingest strategy
#[derive(Debug, Clone, Copy)]
pub struct SyncIngestStrategy;

#[async_trait]
impl IngestStrategy for SyncIngestStrategy {
    async fn ingest(
        &self,
        input_path: &Path,
        producer: &Producer,
    ) -> Result<IngestReport, ClearingError> {
        let file = File::open(input_path).map_err(|e| open_error(input_path, e))?;

        let transactions =
            tokio::task::spawn_blocking(move || parse_transactions(BufReader::new(file)))
                .await
                .map_err(|e| ClearingError::IoError {
                    message: format!("Parser task failed: {}", e),
                })??;

        let enqueued = producer.publish_all(&transactions).await;

        Ok(IngestReport {
            parsed: transactions.len(),
            enqueued,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::QueuePort;
    use crate::queue::InMemoryQueue;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary flat file for testing
    fn create_temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    async fn producer() -> (Arc<InMemoryQueue>, Producer) {
        let queue = Arc::new(InMemoryQueue::new());
        let port: Arc<dyn QueuePort> = queue.clone();
        let producer = Producer::connect(port, "clearing-transactions").await.unwrap();
        (queue, producer)
    }

    #[tokio::test]
    async fn test_sync_strategy_publishes_valid_lines() {
        let file = create_temp_file(
            "550e8400-e29b-41d4-a716-446655440000000100020000001000\n\
             550e8400-e29b-41d4-a716-446655440001000300040000005500\n\
             LINHA_INVALIDA_CURTA",
        );
        let (queue, producer) = producer().await;

        let report = SyncIngestStrategy.ingest(file.path(), &producer).await.unwrap();

        assert_eq!(report, IngestReport { parsed: 2, enqueued: 2 });
        assert_eq!(queue.pending(producer.handle()).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_sync_strategy_handles_missing_file() {
        let (_queue, producer) = producer().await;

        let result = SyncIngestStrategy
            .ingest(Path::new("nonexistent.txt"), &producer)
            .await;

        assert_eq!(
            result,
            Err(ClearingError::FileNotFound {
                path: "nonexistent.txt".to_string()
            })
        );
    }
}
