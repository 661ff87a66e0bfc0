//! Asynchronous positional reader with batch interface
//!
//! Provides a streaming interface over clearing records from a tokio
//! `AsyncBufRead`. Supports batch reading so ingestion can publish one batch
//! while the next is still on disk.
//!
//! # Architecture
//!
//! ```text
//! File → AsyncReader → Batches of Transactions
//!             ↓
//!     positional_format module
//!     (strip_line_ending, convert_line)
//! ```

use crate::io::layout::FieldLayout;
use crate::io::positional_format::{convert_line, strip_line_ending};
use crate::types::{ClearingError, Transaction};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Asynchronous positional reader
///
/// Provides batch reading interface over clearing records.
/// Maintains streaming behavior with constant memory usage.
pub struct AsyncReader<R> {
    reader: R,
    layout: FieldLayout,
    buffer: Vec<u8>,
    line_num: u64,
    skipped: u64,
}

impl<R: AsyncBufRead + Unpin + Send> AsyncReader<R> {
    /// Create a new AsyncReader using the clearing layout
    pub fn new(reader: R) -> Self {
        Self::with_layout(reader, FieldLayout::clearing())
    }

    /// Create a new AsyncReader using a custom layout
    pub fn with_layout(reader: R, layout: FieldLayout) -> Self {
        Self {
            reader,
            layout,
            buffer: Vec::with_capacity(128),
            line_num: 0,
            skipped: 0,
        }
    }

    /// Read a batch of transaction records
    ///
    /// Reads lines until `batch_size` valid records are collected or the
    /// stream ends. Malformed lines are logged and skipped.
    ///
    /// # Returns
    ///
    /// * `Ok(batch)` - Up to `batch_size` records; empty at end of stream
    /// * `Err(ClearingError::IoError)` - The underlying stream failed
    pub async fn read_batch(
        &mut self,
        batch_size: usize,
    ) -> Result<Vec<Transaction>, ClearingError> {
        let mut batch = Vec::with_capacity(batch_size);

        while batch.len() < batch_size {
            self.buffer.clear();
            if self.reader.read_until(b'\n', &mut self.buffer).await? == 0 {
                break;
            }
            self.line_num += 1;

            match convert_line(self.line_num, strip_line_ending(&self.buffer), &self.layout) {
                Ok(tx) => batch.push(tx),
                Err(e) => {
                    self.skipped += 1;
                    tracing::debug!(error = %e, "skipping malformed line");
                }
            }
        }

        Ok(batch)
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> u64 {
        self.line_num
    }

    /// Number of lines skipped as malformed so far
    pub fn lines_skipped(&self) -> u64 {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const VALID_1: &str = "550e8400-e29b-41d4-a716-446655440000000100020000001000";
    const VALID_2: &str = "550e8400-e29b-41d4-a716-446655440001000300040000005500";

    fn line(id: &str, amount: i64) -> String {
        format!("{:<36}00010002{:010}\n", id, amount)
    }

    #[tokio::test]
    async fn test_async_reader_read_batch() {
        let content = format!("{}\n{}\n{}", VALID_1, VALID_2, line("tx-3", 42));
        let mut reader = AsyncReader::new(Cursor::new(content.into_bytes()));

        let batch = reader.read_batch(2).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].amount(), 1000);
        assert_eq!(batch[1].amount(), 5500);

        let batch = reader.read_batch(2).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id(), "tx-3");

        let batch = reader.read_batch(2).await.unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_empty_stream() {
        let mut reader = AsyncReader::new(Cursor::new(Vec::new()));
        let batch = reader.read_batch(10).await.unwrap();
        assert!(batch.is_empty());
        assert_eq!(reader.lines_read(), 0);
    }

    #[tokio::test]
    async fn test_async_reader_skips_invalid_lines() {
        let content = format!(
            "{}\nLINHA_INVALIDA_CURTA\n{}{}",
            VALID_1,
            line("tx-bad", 0),
            VALID_2
        );
        let mut reader = AsyncReader::new(Cursor::new(content.into_bytes()));

        let batch = reader.read_batch(10).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(reader.lines_read(), 4);
        assert_eq!(reader.lines_skipped(), 2);
    }

    #[tokio::test]
    async fn test_async_reader_counts_blank_line_as_skipped() {
        let content = format!("{}\n\n{}", VALID_1, line("tx-2", 42));
        let mut reader = AsyncReader::new(Cursor::new(content.into_bytes()));

        let batch = reader.read_batch(10).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(reader.lines_read(), 3);
        assert_eq!(reader.lines_skipped(), 1);
    }

    #[tokio::test]
    async fn test_async_reader_skipped_lines_do_not_count_towards_batch() {
        let content = format!("bad\nbad\n{}\n{}\n", VALID_1, VALID_2);
        let mut reader = AsyncReader::new(Cursor::new(content.into_bytes()));

        let batch = reader.read_batch(1).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].amount(), 1000);
        assert_eq!(reader.lines_read(), 3);
    }

    #[tokio::test]
    async fn test_async_reader_multiple_batches() {
        let content: String = (1..=5).map(|i| line(&format!("tx-{}", i), i * 100)).collect();
        let mut reader = AsyncReader::new(Cursor::new(content.into_bytes()));

        let batch1 = reader.read_batch(2).await.unwrap();
        let batch2 = reader.read_batch(2).await.unwrap();
        let batch3 = reader.read_batch(2).await.unwrap();
        let batch4 = reader.read_batch(2).await.unwrap();

        assert_eq!(batch1.iter().map(|t| t.amount()).collect::<Vec<_>>(), [100, 200]);
        assert_eq!(batch2.iter().map(|t| t.amount()).collect::<Vec<_>>(), [300, 400]);
        assert_eq!(batch3.iter().map(|t| t.amount()).collect::<Vec<_>>(), [500]);
        assert!(batch4.is_empty());
    }
}
