// Resource documents: the YAML files documenting data and simulation
// resources that a knowledge store is populated from.

use crate::memory::InMemoryStore;
use indexmap::IndexMap;
use ontocore::iri::expand_iri;
use ontocore::{Descriptor, KnowledgeStore, StageTemplate, StoreEntry, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

pub const OTEIO_NAMESPACE: &str = "https://w3id.org/emmo/domain/oteio#";
pub const DATA_SOURCE: &str = "oteio:DataSource";
pub const DATA_SINK: &str = "oteio:DataSink";

/// Standardised documentation of data and simulation resources.
///
/// Keys may be full IRIs or `prefix:Name` with a prefix from `prefixes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDocument {
    #[serde(default)]
    pub prefixes: IndexMap<String, String>,

    /// IRI -> list of strategies
    #[serde(default)]
    pub data_resources: IndexMap<String, Value>,

    /// IRI -> tool descriptor
    #[serde(default)]
    pub simulation_resources: IndexMap<String, Value>,

    /// Artifact IRI -> native datanode type of the artifact when a tool
    /// produces it
    #[serde(default)]
    pub datanode_types: IndexMap<String, String>,
}

impl ResourceDocument {
    pub fn from_yaml_str(input: &str) -> Result<Self, StoreError> {
        serde_yaml::from_str(input).map_err(|e| StoreError::InvalidDocument(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Backend(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    /// Expand a key against the declared prefixes (and the built-in
    /// `oteio` prefix).
    pub fn expand(&self, key: &str) -> String {
        let declared = self.prefixes.iter().map(|(p, ns)| (p.as_str(), ns.as_str()));
        expand_iri(key, declared.chain(std::iter::once(("oteio", OTEIO_NAMESPACE))))
    }

    /// Parse every resource, then store them all. A malformed resource, or
    /// two resources expanding to the same IRI, fails the whole document
    /// before anything is stored.
    pub async fn populate(&self, store: &InMemoryStore) -> Result<usize, StoreError> {
        let mut parsed: Vec<(String, StoreEntry, Vec<String>)> = Vec::new();

        for (key, resource) in &self.data_resources {
            let iri = self.expand(key);
            ensure_new(&parsed, &iri)?;
            let types = resource_types(&iri, resource)?;
            let strategies: Vec<StageTemplate> = serde_json::from_value(resource.clone())
                .map_err(|e| invalid(&iri, e))?;
            parsed.push((iri, StoreEntry::Dataset(strategies), types));
        }
        for (key, resource) in &self.simulation_resources {
            let iri = self.expand(key);
            ensure_new(&parsed, &iri)?;
            if !resource.is_object() {
                return Err(invalid(&iri, "expected a descriptor mapping"));
            }
            let descriptor: Descriptor =
                serde_json::from_value(resource.clone()).map_err(|e| invalid(&iri, e))?;
            let descriptor = self.expand_descriptor(descriptor);
            parsed.push((iri, StoreEntry::Tool(descriptor), Vec::new()));
        }
        for (key, datanode_type) in &self.datanode_types {
            let iri = self.expand(key);
            match parsed.iter_mut().find(|(known, _, _)| *known == iri) {
                Some((_, StoreEntry::Tool(descriptor), _)) => {
                    descriptor.datanode_type = Some(datanode_type.clone());
                }
                Some((_, StoreEntry::Dataset(_), _)) => {
                    return Err(invalid(&iri, "a data resource cannot carry a datanode type"));
                }
                None => {
                    let descriptor = Descriptor {
                        datanode_type: Some(datanode_type.clone()),
                        ..Descriptor::default()
                    };
                    parsed.push((iri, StoreEntry::Tool(descriptor), Vec::new()));
                }
            }
        }

        let count = parsed.len();
        for (iri, entry, types) in parsed {
            for type_tag in &types {
                store.add_type(&iri, &self.expand(type_tag)).await?;
            }
            store.insert(iri, entry).await;
        }
        tracing::info!("Populated store with {} resources", count);
        Ok(count)
    }

    /// Expand the artifact keys of a tool's input and output maps with the
    /// declared prefixes.
    fn expand_descriptor(&self, mut descriptor: Descriptor) -> Descriptor {
        descriptor.input = self.expand_keys(descriptor.input);
        descriptor.output = self.expand_keys(descriptor.output);
        descriptor
    }

    fn expand_keys<V>(&self, map: IndexMap<String, V>) -> IndexMap<String, V> {
        map.into_iter()
            .map(|(key, value)| (self.expand(&key), value))
            .collect()
    }

    pub async fn into_store(self) -> Result<InMemoryStore, StoreError> {
        let store = InMemoryStore::new();
        self.populate(&store).await?;
        Ok(store)
    }
}

fn invalid(identifier: &str, reason: impl ToString) -> StoreError {
    StoreError::InvalidResource {
        identifier: identifier.to_string(),
        reason: reason.to_string(),
    }
}

fn ensure_new(parsed: &[(String, StoreEntry, Vec<String>)], iri: &str) -> Result<(), StoreError> {
    if parsed.iter().any(|(known, _, _)| known == iri) {
        return Err(invalid(iri, "documented more than once"));
    }
    Ok(())
}

fn is_source_or_sink(type_tag: &str) -> bool {
    let full_source = format!("{}DataSource", OTEIO_NAMESPACE);
    let full_sink = format!("{}DataSink", OTEIO_NAMESPACE);
    type_tag == DATA_SOURCE || type_tag == DATA_SINK || type_tag == full_source || type_tag == full_sink
}

/// Types of a data resource.
///
/// A resource with a `dataresource` strategy is a source unless its
/// declared `type` already says source or sink; a resource without one is
/// a sink.
pub fn resource_types(identifier: &str, resource: &Value) -> Result<Vec<String>, StoreError> {
    let items = resource
        .as_array()
        .ok_or_else(|| invalid(identifier, "expected a list of strategies"))?;

    let dataresource = items
        .iter()
        .filter_map(|item| item.get("dataresource"))
        .last();

    let Some(dataresource) = dataresource else {
        return Ok(vec![DATA_SINK.to_string()]);
    };

    let mut types: Vec<String> = match dataresource.get("type") {
        Some(Value::String(single)) => vec![single.clone()],
        Some(Value::Array(many)) => many
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    if !types.iter().any(|t| is_source_or_sink(t)) {
        types.push(DATA_SOURCE.to_string());
    }
    Ok(types)
}
