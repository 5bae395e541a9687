//! Knowledge store backends and artifact sinks
//!
//! Concrete implementations of the `ontocore` store and sink seams: an
//! in-memory store that can be populated from a resource document, and
//! sinks that write generated fragments and chains.

mod document;
mod memory;
mod sink;

pub use document::{resource_types, ResourceDocument, DATA_SINK, DATA_SOURCE, OTEIO_NAMESPACE};
pub use memory::InMemoryStore;
pub use sink::{DirectorySink, MemorySink};
