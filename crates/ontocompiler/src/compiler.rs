use crate::assembler::{CompileWarning, FragmentAssembler};
use crate::config::CompilerConfig;
use crate::graph::WorkflowGraph;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ontocore::{
    context_ref, output_to_ctx, result_to_ctx, ArtifactSink, Chain, CompileError, Descriptor,
    Direction, FileBinding, FileRef, KnowledgeStore, PipelineFragment, PipelineInputs,
    PipelineStep, Result, ToolInputs, ToolStep, WorkflowDescription, WorkflowNode,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

pub type CompilationId = Uuid;

/// A fragment registered under the file name the chain refers to.
#[derive(Debug, Clone)]
pub struct NamedFragment {
    pub file_name: String,
    pub fragment: PipelineFragment,
}

/// Everything produced by one compilation, held in memory until persisted.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub id: CompilationId,
    pub compiled_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub chain_file_name: String,
    pub fragments: Vec<NamedFragment>,
    pub chain: Chain,
    pub warnings: Vec<CompileWarning>,
}

impl Compilation {
    pub fn fragment(&self, file_name: &str) -> Option<&PipelineFragment> {
        self.fragments
            .iter()
            .find(|f| f.file_name == file_name)
            .map(|f| &f.fragment)
    }

    /// Write every fragment, then the chain.
    pub fn persist(&self, sink: &mut dyn ArtifactSink) -> Result<()> {
        for named in &self.fragments {
            sink.write_fragment(&named.file_name, &named.fragment)?;
        }
        sink.write_chain(&self.chain_file_name, &self.chain)?;
        tracing::info!(
            "Persisted {} fragments and {}",
            self.fragments.len(),
            self.chain_file_name
        );
        Ok(())
    }
}

/// Compiles workflow descriptions into execution chains
pub struct ChainCompiler<'a> {
    store: &'a dyn KnowledgeStore,
    config: CompilerConfig,
}

impl<'a> ChainCompiler<'a> {
    pub fn new(store: &'a dyn KnowledgeStore) -> Self {
        Self::with_config(store, CompilerConfig::default())
    }

    pub fn with_config(store: &'a dyn KnowledgeStore, config: CompilerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a description. Nothing is persisted; on error the whole
    /// compilation is discarded.
    pub async fn compile(&self, description: &WorkflowDescription) -> Result<Compilation> {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("compile", compilation_id = %id);
        self.compile_inner(id, description).instrument(span).await
    }

    async fn compile_inner(
        &self,
        id: CompilationId,
        description: &WorkflowDescription,
    ) -> Result<Compilation> {
        let compiled_at = Utc::now();
        let start_time = Instant::now();

        if let Some(target) = &self.config.target_store {
            target.validate()?;
        }

        let graph = WorkflowGraph::build(description, self.config.max_depth)?;
        tracing::info!(
            "Compiling workflow rooted at {} ({} nodes)",
            graph.root().identifier,
            graph.len()
        );

        let assembler = FragmentAssembler::new(self.store);
        let mut chain = Chain::new();
        let mut fragments = Vec::new();
        let mut warnings = Vec::new();
        let mut last: Option<&WorkflowNode> = None;

        for (istep, node) in graph.steps().enumerate() {
            tracing::debug!("Step {}: {}", istep, node);
            let inputs = graph.inputs_of(node);

            let assembly = assembler.assemble(&inputs, false, None).await?;
            warnings.extend(assembly.warnings);
            let file_name = self.config.fragment_name(istep);
            chain.push(self.pipeline_step(&file_name, &inputs, false));
            fragments.push(NamedFragment {
                file_name,
                fragment: assembly.fragment,
            });

            let descriptor = assembler.resolver().descriptor(&node.identifier).await?;
            chain.push(tool_step(&graph, node, &descriptor)?);
            last = Some(node);
        }

        if let Some(last) = last {
            let outputs = graph.outputs_of(last);
            let assembly = assembler
                .assemble(&outputs, true, self.config.target_store.as_ref())
                .await?;
            warnings.extend(assembly.warnings);
            let file_name = self.config.final_fragment_name.clone();
            chain.push(self.pipeline_step(&file_name, &outputs, true));
            fragments.push(NamedFragment {
                file_name,
                fragment: assembly.fragment,
            });
        } else {
            tracing::warn!("Workflow has no steps, the chain is empty");
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        tracing::info!(
            "Compiled {} chain steps and {} fragments in {}ms",
            chain.len(),
            fragments.len(),
            duration_ms
        );

        Ok(Compilation {
            id,
            compiled_at,
            duration_ms,
            chain_file_name: self.config.chain_file_name.clone(),
            fragments,
            chain,
            warnings,
        })
    }

    /// Pipeline-engine step running `file_name`.
    ///
    /// For a step fragment `nodes` are the step's inputs: their results are
    /// taken from the pipeline and copied into the context. For the final
    /// fragment they are the last step's outputs and only feed the pipeline.
    fn pipeline_step(&self, file_name: &str, nodes: &[&WorkflowNode], is_last: bool) -> PipelineStep {
        let from_cuds = if is_last {
            Vec::new()
        } else {
            nodes.iter().map(|n| n.var_name(Direction::Input)).collect()
        };
        let to_cuds: Vec<String> = nodes
            .iter()
            .filter(|n| n.is_context_node())
            .map(|n| n.var_name(Direction::Output))
            .collect();
        let context: IndexMap<String, String> = to_cuds
            .iter()
            .map(|name| (name.clone(), context_ref(name)))
            .collect();
        let postprocess = if is_last {
            Vec::new()
        } else {
            nodes
                .iter()
                .map(|n| result_to_ctx(&n.var_name(Direction::Input)))
                .collect()
        };

        PipelineStep {
            workflow: self.config.pipeline_workflow.clone(),
            inputs: PipelineInputs {
                pipeline: FileRef::sibling(file_name),
                run_pipeline: "pipe".to_string(),
                from_cuds,
                to_cuds,
                context,
            },
            postprocess,
        }
    }
}

/// External tool invocation for a step node.
fn tool_step(graph: &WorkflowGraph, node: &WorkflowNode, descriptor: &Descriptor) -> Result<ToolStep> {
    let tool = node.identifier.as_str();
    let mut files = IndexMap::new();

    for input in graph.inputs_of(node) {
        let filename = descriptor.input_filename(&input.identifier).ok_or_else(|| {
            CompileError::not_found(&input.identifier, format!("input file of tool '{}'", tool))
        })?;
        files.insert(
            format!("in_file_{}", files.len()),
            FileBinding::Node {
                filename: filename.to_string(),
                node: context_ref(&input.var_name(Direction::Input)),
            },
        );
    }
    for static_file in &descriptor.files {
        files.insert(
            format!("in_file_{}", files.len()),
            FileBinding::Template {
                filename: static_file.target_file.clone(),
                template: static_file.source_uri.clone(),
            },
        );
    }

    let command = descriptor
        .command
        .as_deref()
        .ok_or_else(|| CompileError::not_found(tool, "command"))?;
    let mut tokens = tokenize_command(command);
    if tokens.is_empty() {
        return Err(CompileError::malformed(tool, "empty command"));
    }
    let program = tokens.remove(0);

    let workflow = descriptor
        .executor
        .clone()
        .ok_or_else(|| CompileError::not_found(tool, "executor"))?;

    let outputs = descriptor.output_filenames(tool)?;
    let postprocess = outputs
        .iter()
        .zip(graph.outputs_of(node))
        .map(|(file, output)| output_to_ctx(file, &output.var_name(Direction::Output)))
        .collect();

    Ok(ToolStep {
        workflow,
        inputs: ToolInputs {
            command: program,
            arguments: tokens,
            files,
            outputs,
        },
        postprocess,
    })
}

/// Split a command line into program and arguments. Backslashes (line
/// continuations) are dropped and quotes honoured; unbalanced quotes fall
/// back to whitespace splitting.
pub fn tokenize_command(command: &str) -> Vec<String> {
    let command = command.replace('\\', "");
    shell_words::split(&command)
        .unwrap_or_else(|_| command.split_whitespace().map(String::from).collect())
}
