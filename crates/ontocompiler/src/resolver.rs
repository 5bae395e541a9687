use ontocore::{
    CompileError, Descriptor, Direction, KnowledgeStore, Result, StageTemplate, StoreEntry,
};

/// Resolves identifiers against the knowledge store.
///
/// Every lookup tries the identifier as given, then its compacted form, and
/// fails with `NotFound` when both miss.
#[derive(Clone, Copy)]
pub struct ResourceResolver<'a> {
    store: &'a dyn KnowledgeStore,
}

impl<'a> ResourceResolver<'a> {
    pub fn new(store: &'a dyn KnowledgeStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a dyn KnowledgeStore {
        self.store
    }

    /// Two-step lookup of a store entry.
    pub async fn lookup(&self, identifier: &str, context: &str) -> Result<StoreEntry> {
        if let Some(entry) = self.store.lookup(identifier).await? {
            return Ok(entry);
        }
        tracing::debug!("No entry for {}, retrying with compacted key", identifier);
        self.store
            .lookup_prefixed(identifier)
            .await?
            .ok_or_else(|| CompileError::not_found(identifier, context))
    }

    /// Descriptor of a tool (the simulation info of a tool IRI).
    pub async fn descriptor(&self, tool: &str) -> Result<Descriptor> {
        self.lookup(tool, "tool descriptor")
            .await?
            .into_descriptor(tool)
    }

    /// Stage templates describing how `tool` reads (`Input`) or writes
    /// (`Output`) `artifact`.
    pub async fn resolve_stage_template(
        &self,
        tool: &str,
        direction: Direction,
        artifact: &str,
    ) -> Result<Vec<StageTemplate>> {
        let descriptor = self.descriptor(tool).await?;
        descriptor
            .template_for(direction, artifact)
            .map(<[StageTemplate]>::to_vec)
            .ok_or_else(|| {
                CompileError::not_found(
                    artifact,
                    format!("{} templates of tool '{}'", direction, tool),
                )
            })
    }

    /// Directly loadable strategies of a dataset.
    pub async fn resolve_dataset_fragment(&self, artifact: &str) -> Result<Vec<StageTemplate>> {
        self.lookup(artifact, "dataset")
            .await?
            .into_dataset(artifact)
    }

    /// Native datanode type an artifact has when produced by a tool.
    pub async fn resolve_datanode_type(&self, artifact: &str) -> Result<String> {
        self.lookup(artifact, "datanode type")
            .await?
            .into_descriptor(artifact)?
            .datanode_type
            .ok_or_else(|| CompileError::not_found(artifact, "datanode type"))
    }
}
