use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered sequence of steps handed to the orchestration engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub steps: Vec<ChainStep>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: impl Into<ChainStep>) {
        self.steps.push(step.into());
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn to_yaml(&self) -> crate::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainStep {
    Tool(ToolStep),
    Pipeline(PipelineStep),
}

impl ChainStep {
    pub fn workflow(&self) -> &str {
        match self {
            ChainStep::Tool(step) => &step.workflow,
            ChainStep::Pipeline(step) => &step.workflow,
        }
    }

    pub fn as_pipeline(&self) -> Option<&PipelineStep> {
        match self {
            ChainStep::Pipeline(step) => Some(step),
            _ => None,
        }
    }

    pub fn as_tool(&self) -> Option<&ToolStep> {
        match self {
            ChainStep::Tool(step) => Some(step),
            _ => None,
        }
    }
}

impl From<PipelineStep> for ChainStep {
    fn from(step: PipelineStep) -> Self {
        ChainStep::Pipeline(step)
    }
}

impl From<ToolStep> for ChainStep {
    fn from(step: ToolStep) -> Self {
        ChainStep::Tool(step)
    }
}

/// Invocation of the pipeline engine on a stored fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub workflow: String,
    pub inputs: PipelineInputs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub postprocess: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineInputs {
    pub pipeline: FileRef,
    pub run_pipeline: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub from_cuds: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to_cuds: Vec<String>,
    /// Context slots exposed to the pipeline, name -> substitution.
    #[serde(flatten)]
    pub context: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    #[serde(rename = "$ref")]
    pub reference: String,
}

impl FileRef {
    /// Reference to a file stored next to the chain document.
    pub fn sibling(file_name: &str) -> Self {
        Self {
            reference: format!("file:__DIR__/{}", file_name),
        }
    }
}

/// Invocation of an external tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolStep {
    pub workflow: String,
    pub inputs: ToolInputs,
    #[serde(default)]
    pub postprocess: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInputs {
    pub command: String,
    pub arguments: Vec<String>,
    pub files: IndexMap<String, FileBinding>,
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileBinding {
    /// File materialized from a context slot.
    Node { filename: String, node: String },
    /// Static file copied from a URI.
    Template { filename: String, template: String },
}

impl FileBinding {
    pub fn filename(&self) -> &str {
        match self {
            FileBinding::Node { filename, .. } | FileBinding::Template { filename, .. } => filename,
        }
    }
}

/// `{{ ctx.<name> }}`
pub fn context_ref(name: &str) -> String {
    format!("{{{{ ctx.{} }}}}", name)
}

/// Copy a named pipeline result into the context slot of the same name.
pub fn result_to_ctx(var: &str) -> String {
    format!(
        "{{{{ ctx.current.outputs.results['{}']|to_ctx('{}') }}}}",
        var, var
    )
}

/// Copy a tool output file into a context slot. Dots in the file name are
/// not valid output port names and become underscores.
pub fn output_to_ctx(filename: &str, var: &str) -> String {
    format!(
        "{{{{ ctx.current.outputs['{}']|to_ctx('{}') }}}}",
        filename.replace('.', "_"),
        var
    )
}
