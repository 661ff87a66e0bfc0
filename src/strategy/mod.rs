//! Ingest strategy module
//!
//! This module defines the Strategy pattern for the ingest half of the
//! pipeline: read a flat file, parse it, publish every valid record. This is
//! the job the upload endpoint does with an uploaded file; the CLI does it
//! with a file on disk. Strategies differ only in how the file is read.

use crate::cli::StrategyType;
use crate::queue::Producer;
use crate::types::ClearingError;
use async_trait::async_trait;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncIngestStrategy, DEFAULT_INGEST_BATCH_SIZE};
pub use sync::SyncIngestStrategy;

/// Outcome of ingesting one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Valid records parsed from the file
    pub parsed: usize,
    /// Records successfully published
    pub enqueued: usize,
}

/// Ingest strategy trait for complete parse-and-publish pipelines
#[async_trait]
pub trait IngestStrategy: Send + Sync {
    /// Parse `input_path` and publish every valid record through `producer`
    ///
    /// # Returns
    ///
    /// * `Ok(IngestReport)` once the whole file was read. Malformed lines and
    ///   failed publishes only lower the counts.
    /// * `Err(ClearingError)` if the file cannot be opened or read
    async fn ingest(
        &self,
        input_path: &Path,
        producer: &Producer,
    ) -> Result<IngestReport, ClearingError>;
}

/// Map a file-open failure to a ClearingError
pub(crate) fn open_error(path: &Path, error: std::io::Error) -> ClearingError {
    if error.kind() == std::io::ErrorKind::NotFound {
        ClearingError::FileNotFound {
            path: path.display().to_string(),
        }
    } else {
        ClearingError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), error),
        }
    }
}

/// Create an ingest strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of strategy to create (Sync or Async)
/// * `batch_size` - Records per read batch for the async strategy (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    batch_size: Option<usize>,
) -> Box<dyn IngestStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncIngestStrategy),
        StrategyType::Async => Box::new(AsyncIngestStrategy::new(
            batch_size.unwrap_or(DEFAULT_INGEST_BATCH_SIZE),
        )),
    }
}
