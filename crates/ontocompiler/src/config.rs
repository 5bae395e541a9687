use ontocore::{CompileError, Result};
use serde::Serialize;
use std::str::FromStr;

/// Default recursion ceiling for nested descriptions.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Backends accepted for documenting final outputs.
pub const SUPPORTED_BACKENDS: &[&str] = &["rdflib", "sparqlwrapper", "collection", "fuseki"];

/// Configuration for a compilation
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    pub max_depth: usize,
    /// Engine workflow that runs pipeline fragments.
    pub pipeline_workflow: String,
    /// Fragments are stored as `<prefix>_<step>.yaml`.
    pub fragment_prefix: String,
    pub final_fragment_name: String,
    pub chain_file_name: String,
    /// Alternate destination for documenting final outputs.
    pub target_store: Option<TargetStore>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            pipeline_workflow: "execflow.oteapipipeline".to_string(),
            fragment_prefix: "pipeline".to_string(),
            final_fragment_name: "pipeline_final.yaml".to_string(),
            chain_file_name: "workchain.yaml".to_string(),
            target_store: None,
        }
    }
}

impl CompilerConfig {
    pub fn with_target_store(mut self, target_store: TargetStore) -> Self {
        self.target_store = Some(target_store);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn fragment_name(&self, step: usize) -> String {
        format!("{}_{}.yaml", self.fragment_prefix, step)
    }
}

/// Store in which generated final outputs are documented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetStore {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl TargetStore {
    pub fn new(backend: impl Into<String>, location: Option<String>) -> Result<Self> {
        let target = Self {
            backend: backend.into(),
            location,
        };
        target.validate()?;
        Ok(target)
    }

    pub fn validate(&self) -> Result<()> {
        if SUPPORTED_BACKENDS.contains(&self.backend.as_str()) {
            Ok(())
        } else {
            Err(CompileError::Unsupported(self.backend.clone()))
        }
    }
}

impl FromStr for TargetStore {
    type Err = CompileError;

    /// `backend` or `backend:location`
    fn from_str(spec: &str) -> Result<Self> {
        match spec.split_once(':') {
            Some((backend, location)) if !location.is_empty() => {
                Self::new(backend, Some(location.to_string()))
            }
            Some((backend, _)) => Self::new(backend, None),
            None => Self::new(spec, None),
        }
    }
}
