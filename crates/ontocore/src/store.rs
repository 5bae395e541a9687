use crate::descriptor::StoreEntry;
use crate::error::StoreError;
use crate::iri::compact_iri;
use crate::{Chain, PipelineFragment};
use async_trait::async_trait;

/// Read/write access to the knowledge store holding resource descriptors.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Entry stored under exactly this key.
    async fn lookup(&self, identifier: &str) -> Result<Option<StoreEntry>, StoreError>;

    /// Tolerant second attempt with the compacted key form.
    async fn lookup_prefixed(&self, identifier: &str) -> Result<Option<StoreEntry>, StoreError> {
        self.lookup(&compact_iri(identifier)).await
    }

    /// Record that `identifier` is an instance of `type_tag`.
    async fn add_type(&self, identifier: &str, type_tag: &str) -> Result<(), StoreError>;

    /// Type tags recorded for `identifier`.
    async fn types(&self, identifier: &str) -> Result<Vec<String>, StoreError>;
}

/// Destination for generated fragments and chains.
pub trait ArtifactSink {
    fn write_fragment(&mut self, name: &str, fragment: &PipelineFragment) -> crate::Result<()>;

    fn write_chain(&mut self, name: &str, chain: &Chain) -> crate::Result<()>;
}
