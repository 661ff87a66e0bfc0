//! Synchronous positional reader with iterator interface
//!
//! Provides a streaming iterator over clearing records from any `BufRead`.
//! Delegates format concerns to the positional_format module.
//!
//! # Design
//!
//! The SyncReader reads one raw line at a time (bytes, so a corrupt line does
//! not poison the stream), strips its terminator, and hands it to
//! `positional_format::convert_line`. It never holds more than one line in
//! memory.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<Transaction, ClearingError>` for each line:
//!
//! ```no_run
//! use clearing_engine::io::sync_reader::SyncReader;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = File::open("batch.txt").unwrap();
//! for result in SyncReader::new(BufReader::new(file)) {
//!     match result {
//!         Ok(tx) => println!("Parsed transaction: {}", tx.id()),
//!         Err(e) if e.is_line_level() => eprintln!("Skipped: {}", e),
//!         Err(e) => panic!("Read failed: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Line-level errors (short line, bad amount, failed validation) are yielded
//!   as Err variants and the iterator keeps going
//! - An I/O error is yielded once and ends the iteration

use crate::io::layout::FieldLayout;
use crate::io::positional_format::{convert_line, strip_line_ending};
use crate::types::{ClearingError, Transaction};
use std::io::BufRead;

/// Synchronous positional reader
///
/// Provides an iterator interface over clearing records.
/// Maintains streaming behavior with constant memory usage.
#[derive(Debug)]
pub struct SyncReader<R> {
    reader: R,
    layout: FieldLayout,
    buffer: Vec<u8>,
    line_num: u64,
    done: bool,
}

impl<R: BufRead> SyncReader<R> {
    /// Create a new SyncReader using the clearing layout
    pub fn new(reader: R) -> Self {
        Self::with_layout(reader, FieldLayout::clearing())
    }

    /// Create a new SyncReader using a custom layout
    pub fn with_layout(reader: R, layout: FieldLayout) -> Self {
        Self {
            reader,
            layout,
            buffer: Vec::with_capacity(128),
            line_num: 0,
            done: false,
        }
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> u64 {
        self.line_num
    }
}

impl<R: BufRead> Iterator for SyncReader<R> {
    type Item = Result<Transaction, ClearingError>;

    /// Get the next record from the stream
    ///
    /// # Returns
    ///
    /// * `Some(Ok(Transaction))` - Successfully parsed line
    /// * `Some(Err(e))` with `e.is_line_level()` - Malformed line, keep iterating
    /// * `Some(Err(ClearingError::IoError))` - Stream failure, iteration ends
    /// * `None` - End of stream reached
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                self.line_num += 1;
                Some(convert_line(
                    self.line_num,
                    strip_line_ending(&self.buffer),
                    &self.layout,
                ))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

/// Parse a whole stream, keeping valid records in input order
///
/// Malformed lines are logged and skipped. Only a stream-level failure
/// aborts the parse and is returned to the caller.
pub fn parse_transactions<R: BufRead>(reader: R) -> Result<Vec<Transaction>, ClearingError> {
    parse_transactions_with_layout(reader, FieldLayout::clearing())
}

/// Same as [`parse_transactions`] with a custom layout
pub fn parse_transactions_with_layout<R: BufRead>(
    reader: R,
    layout: FieldLayout,
) -> Result<Vec<Transaction>, ClearingError> {
    let mut transactions = Vec::new();
    let mut skipped = 0usize;

    for result in SyncReader::with_layout(reader, layout) {
        match result {
            Ok(tx) => transactions.push(tx),
            Err(e) if e.is_line_level() => {
                skipped += 1;
                tracing::debug!(error = %e, "skipping malformed line");
            }
            Err(e) => return Err(e),
        }
    }

    tracing::debug!(parsed = transactions.len(), skipped, "parsed flat file");
    Ok(transactions)
}
