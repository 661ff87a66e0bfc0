//! I/O module
//!
//! Handles flat-file parsing and the queue wire format.
//!
//! # Components
//!
//! - `layout` - Fixed-width field layout and the generic slicer
//! - `positional_format` - Line to transaction conversion
//! - `sync_reader` - Synchronous positional reader with iterator interface
//! - `async_reader` - Asynchronous positional reader with batch reading interface
//! - `wire_format` - JSON encoding of queue message bodies

pub mod async_reader;
pub mod layout;
pub mod positional_format;
pub mod sync_reader;
pub mod wire_format;

pub use async_reader::AsyncReader;
pub use layout::{FieldLayout, FieldSpec};
pub use positional_format::{convert_line, format_line};
pub use sync_reader::{parse_transactions, SyncReader};
