//! Queue module
//!
//! Everything on the transport side of the pipeline:
//! - `in_memory` - In-process at-least-once queue implementing `QueuePort`
//! - `producer` - Publishes parsed transactions as wire-encoded messages

pub mod in_memory;
pub mod producer;

pub use in_memory::InMemoryQueue;
pub use producer::Producer;
