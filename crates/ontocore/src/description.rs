use serde::{Deserialize, Serialize};

/// Nested workflow description as produced by the upstream planner.
///
/// A description without a `children` key is a leaf artifact (a dataset).
/// An explicit empty `children` list is not a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDescription {
    #[serde(alias = "iri", default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    #[serde(default)]
    pub depth: usize,

    #[serde(alias = "predicate", default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<WorkflowDescription>>,
}

impl WorkflowDescription {
    /// A leaf artifact with no children.
    pub fn leaf(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            depth: 0,
            relation: None,
            children: None,
        }
    }

    /// An inner node with an (initially empty) child list.
    pub fn branch(identifier: impl Into<String>) -> Self {
        Self {
            children: Some(Vec::new()),
            ..Self::leaf(identifier)
        }
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relation = Some(relation);
        self
    }

    /// Attach a child that produces this node's artifact.
    pub fn produced_by(self, child: WorkflowDescription) -> Self {
        self.with_child(child.with_relation(Relation::Produces))
    }

    /// Attach a child consumed by this node.
    pub fn consumes(self, child: WorkflowDescription) -> Self {
        self.with_child(child.with_relation(Relation::consumes_as_individual()))
    }

    pub fn with_child(mut self, child: WorkflowDescription) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn from_yaml_str(input: &str) -> crate::Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

/// Relation between a child description and its parent.
///
/// Anything that is not a production is treated as a consumption; the
/// concrete predicate is kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Relation {
    Produces,
    Consumes(String),
}

impl Relation {
    pub fn consumes_as_individual() -> Self {
        Relation::Consumes("consumes-as-individual".to_string())
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Relation::Produces)
    }
}

impl From<String> for Relation {
    fn from(s: String) -> Self {
        match s.as_str() {
            "produces" | "hasOutput" => Relation::Produces,
            _ => Relation::Consumes(s),
        }
    }
}

impl From<Relation> for String {
    fn from(relation: Relation) -> Self {
        match relation {
            Relation::Produces => "produces".to_string(),
            Relation::Consumes(predicate) => predicate,
        }
    }
}
