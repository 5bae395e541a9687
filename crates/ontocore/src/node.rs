use crate::iri::{compact_iri, iri_suffix};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle of a node: its post-order sequence index.
pub type NodeId = usize;

/// Resource kind marker for pre-existing, directly loadable artifacts.
pub const DATASET: &str = "dataset";

/// Direction of a resource binding, seen from the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What produces and what consumes a node's artifact.
///
/// Each side is empty (unresolved), [`DATASET`], or a tool IRI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceKind {
    pub output: String,
    pub input: String,
}

impl ResourceKind {
    pub fn dataset() -> Self {
        Self {
            output: DATASET.to_string(),
            input: String::new(),
        }
    }

    pub fn get(&self, direction: Direction) -> &str {
        match direction {
            Direction::Input => &self.input,
            Direction::Output => &self.output,
        }
    }
}

/// A vertex of the workflow graph.
///
/// `inputs` are owned children; `outputs` are back-references to the
/// artifacts this node produces. Both hold arena indexes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: NodeId,
    pub identifier: String,
    pub depth: usize,
    pub resource_kind: ResourceKind,
    pub inputs: Vec<NodeId>,
    pub outputs: Vec<NodeId>,
}

impl WorkflowNode {
    pub fn is_dataset(&self) -> bool {
        self.resource_kind.output == DATASET
    }

    /// Something depends on this node as a producer.
    pub fn is_step(&self) -> bool {
        !self.outputs.is_empty()
    }

    /// An isolated artifact that lives in the shared execution context.
    pub fn is_context_node(&self) -> bool {
        !self.resource_kind.output.is_empty() && self.inputs.is_empty() && self.outputs.is_empty()
    }

    /// Context variable (and stage) name for one side of this node.
    pub fn var_name(&self, direction: Direction) -> String {
        format!("datanode_{}_{}", self.id, direction)
    }

    pub fn step_name(&self) -> String {
        format!("step_{}", self.id)
    }

    pub fn suffix(&self) -> &str {
        iri_suffix(&self.identifier)
    }

    pub fn compact_identifier(&self) -> String {
        compact_iri(&self.identifier)
    }
}

impl fmt::Display for WorkflowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node {}: {} (output: '{}', input: '{}')",
            self.id, self.identifier, self.resource_kind.output, self.resource_kind.input
        )?;
        if !self.inputs.is_empty() {
            write!(f, " inputs: {:?}", self.inputs)?;
        }
        if !self.outputs.is_empty() {
            write!(f, " outputs: {:?}", self.outputs)?;
        }
        Ok(())
    }
}
