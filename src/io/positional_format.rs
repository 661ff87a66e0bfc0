//! Positional format handling for clearing records
//!
//! This module centralizes all flat-file format concerns, providing:
//! - Conversion from one raw line to a validated [`Transaction`]
//! - Formatting a transaction back into a fixed-width line
//!
//! All functions are pure (no I/O) for easy testing. The readers in
//! `sync_reader` and `async_reader` only deal with splitting a stream into
//! lines and delegate everything else here.

use crate::io::layout::{FieldLayout, FIELD_AMOUNT, FIELD_DESTINY, FIELD_ID, FIELD_ORIGIN};
use crate::types::{ClearingError, MinorUnits, Transaction};

/// Strip the line terminator from a raw line
///
/// Removes a trailing `\n` and, if present, the `\r` before it.
pub fn strip_line_ending(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

/// Convert one raw line to a Transaction
///
/// This function:
/// - Rejects lines that are not valid UTF-8
/// - Rejects lines shorter than the layout's record length
/// - Slices and trims every field
/// - Parses the amount as a base-10 signed integer
/// - Runs the validated [`Transaction`] constructor
///
/// # Arguments
///
/// * `line_number` - 1-based position of the line in the stream, for errors
/// * `raw` - The line without its terminator
/// * `layout` - Field layout to slice with
///
/// # Returns
///
/// * `Ok(Transaction)` - Successfully converted record
/// * `Err(ClearingError)` - A line-level error describing why the line is skipped
pub fn convert_line(
    line_number: u64,
    raw: &[u8],
    layout: &FieldLayout,
) -> Result<Transaction, ClearingError> {
    let line = std::str::from_utf8(raw).map_err(|_| ClearingError::InvalidEncoding {
        line: line_number,
    })?;

    let fields = layout.slice(line).ok_or_else(|| {
        ClearingError::line_too_short(line_number, line.chars().count(), layout.record_len())
    })?;

    let amount_field = fields.get(FIELD_AMOUNT).unwrap_or_default();
    let amount: MinorUnits = amount_field
        .parse()
        .map_err(|_| ClearingError::invalid_amount(line_number, amount_field))?;

    Transaction::new(
        fields.get(FIELD_ID).unwrap_or_default(),
        fields.get(FIELD_ORIGIN).unwrap_or_default(),
        fields.get(FIELD_DESTINY).unwrap_or_default(),
        amount,
    )
}

/// Format a transaction as a fixed-width line (without terminator)
///
/// Text fields are left-aligned and space-padded, the amount is right-aligned
/// and zero-padded. Values longer than their field are written as-is, so the
/// result only parses back when every value fits.
pub fn format_line(tx: &Transaction, layout: &FieldLayout) -> String {
    let mut line = String::with_capacity(layout.record_len());

    for field in layout.fields() {
        let width = field.width;
        match field.name {
            FIELD_ID => line.push_str(&format!("{:<width$}", tx.id())),
            FIELD_ORIGIN => line.push_str(&format!("{:<width$}", tx.origin())),
            FIELD_DESTINY => line.push_str(&format!("{:<width$}", tx.destiny())),
            FIELD_AMOUNT => line.push_str(&format!("{:0>width$}", tx.amount())),
            _ => line.push_str(&" ".repeat(width)),
        }
    }

    line
}
