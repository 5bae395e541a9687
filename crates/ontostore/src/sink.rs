use indexmap::IndexMap;
use ontocore::{ArtifactSink, Chain, PipelineFragment, Result};
use std::path::{Path, PathBuf};

/// Writes YAML documents into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: &str, contents: String) -> Result<()> {
        let path = self.dir.join(name);
        std::fs::write(&path, contents)?;
        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl ArtifactSink for DirectorySink {
    fn write_fragment(&mut self, name: &str, fragment: &PipelineFragment) -> Result<()> {
        self.write(name, fragment.to_yaml()?)
    }

    fn write_chain(&mut self, name: &str, chain: &Chain) -> Result<()> {
        self.write(name, chain.to_yaml()?)
    }
}

/// Keeps serialized documents in memory, in write order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    documents: IndexMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.documents.get(name).map(String::as_str)
    }

    pub fn names(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ArtifactSink for MemorySink {
    fn write_fragment(&mut self, name: &str, fragment: &PipelineFragment) -> Result<()> {
        self.documents.insert(name.to_string(), fragment.to_yaml()?);
        Ok(())
    }

    fn write_chain(&mut self, name: &str, chain: &Chain) -> Result<()> {
        self.documents.insert(name.to_string(), chain.to_yaml()?);
        Ok(())
    }
}
