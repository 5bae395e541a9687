//! Workflow compiler
//!
//! Turns a nested workflow description into a graph of typed nodes, one
//! pipeline fragment per processing step and an ordered execution chain.
//!
//! ```text
//! ChainCompiler ─▶ WorkflowGraph::build (once)
//!               └▶ per step: ResourceResolver + FragmentAssembler + decorate
//!               └▶ final fragment over the last step's outputs
//! ```

mod assembler;
mod compiler;
mod config;
pub mod decorator;
mod graph;
mod resolver;

pub use assembler::{
    Assembly, CompileWarning, FragmentAssembler, CONVERSION_FUNCTION_TYPE, EXPORT_FUNCTION_TYPE,
};
pub use compiler::{tokenize_command, ChainCompiler, Compilation, CompilationId, NamedFragment};
pub use config::{CompilerConfig, TargetStore, DEFAULT_MAX_DEPTH, SUPPORTED_BACKENDS};
pub use decorator::{decorate, StageNames};
pub use graph::WorkflowGraph;
pub use resolver::ResourceResolver;

use ontocore::{KnowledgeStore, Result, WorkflowDescription};

/// Compile `description` against `store` with the given configuration.
pub async fn compile(
    store: &dyn KnowledgeStore,
    description: &WorkflowDescription,
    config: CompilerConfig,
) -> Result<Compilation> {
    ChainCompiler::with_config(store, config)
        .compile(description)
        .await
}
