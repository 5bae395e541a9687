use async_trait::async_trait;
use ontocore::{Descriptor, KnowledgeStore, StageTemplate, StoreEntry, StoreError};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Knowledge store held entirely in memory.
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, StoreEntry>>,
    types: RwLock<HashMap<String, Vec<String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            types: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_entry(mut self, identifier: impl Into<String>, entry: StoreEntry) -> Self {
        self.entries.get_mut().insert(identifier.into(), entry);
        self
    }

    pub fn with_dataset(self, identifier: impl Into<String>, strategies: Vec<StageTemplate>) -> Self {
        self.with_entry(identifier, StoreEntry::Dataset(strategies))
    }

    pub fn with_tool(self, identifier: impl Into<String>, descriptor: Descriptor) -> Self {
        self.with_entry(identifier, StoreEntry::Tool(descriptor))
    }

    pub async fn insert(&self, identifier: impl Into<String>, entry: StoreEntry) {
        let identifier = identifier.into();
        tracing::debug!("Storing entry {}", identifier);
        self.entries.write().await.insert(identifier, entry);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// All keys, sorted.
    pub async fn identifiers(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryStore {
    async fn lookup(&self, identifier: &str) -> Result<Option<StoreEntry>, StoreError> {
        Ok(self.entries.read().await.get(identifier).cloned())
    }

    async fn add_type(&self, identifier: &str, type_tag: &str) -> Result<(), StoreError> {
        let mut types = self.types.write().await;
        let tags = types.entry(identifier.to_string()).or_default();
        if !tags.iter().any(|t| t == type_tag) {
            tags.push(type_tag.to_string());
        }
        Ok(())
    }

    async fn types(&self, identifier: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .types
            .read()
            .await
            .get(identifier)
            .cloned()
            .unwrap_or_default())
    }
}
