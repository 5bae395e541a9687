//! Core abstractions for the ontology workflow compiler
//!
//! This crate provides the types every other crate depends on: the nested
//! workflow description, graph nodes, knowledge store descriptors, pipeline
//! fragments and the execution chain documents. It performs no I/O itself.

mod chain;
mod description;
mod descriptor;
mod error;
pub mod iri;
mod node;
mod stage;
mod store;

pub use chain::{
    context_ref, output_to_ctx, result_to_ctx, Chain, ChainStep, FileBinding, FileRef,
    PipelineInputs, PipelineStep, ToolInputs, ToolStep,
};
pub use description::{Relation, WorkflowDescription};
pub use descriptor::{Descriptor, StageTemplate, StaticFile, StoreEntry};
pub use error::{CompileError, GraphError, StoreError};
pub use node::{Direction, NodeId, ResourceKind, WorkflowNode, DATASET};
pub use stage::{
    pipe_expression, PipelineFragment, Stage, StageKind, FRAGMENT_VERSION, PIPE_SEPARATOR,
};
pub use store::{ArtifactSink, KnowledgeStore};

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
