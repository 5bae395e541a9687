use crate::iri::compact_iri;
use crate::node::Direction;
use crate::stage::StageKind;
use crate::{CompileError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::TryFrom;

/// One strategy of a partial pipeline as documented in the store:
/// a single-key mapping `{<strategy>: {<configuration>}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct StageTemplate {
    pub strategy: String,
    pub config: Map<String, Value>,
}

impl StageTemplate {
    pub fn new(strategy: impl Into<String>, config: Map<String, Value>) -> Self {
        Self {
            strategy: strategy.into(),
            config,
        }
    }

    /// Kind of stage this template expands to. Validated on construction
    /// from documents, so unknown strategies only come from `new`.
    pub fn kind(&self) -> Option<StageKind> {
        StageKind::from_strategy(&self.strategy)
    }

    /// File location declared either at the top level or under
    /// `configuration`.
    pub fn location(&self) -> Option<&str> {
        config_str(&self.config, "location")
    }

    pub fn download_url(&self) -> Option<&str> {
        config_str(&self.config, "downloadUrl")
    }
}

pub(crate) fn config_str<'a>(config: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    config
        .get(key)
        .or_else(|| config.get("configuration").and_then(|c| c.get(key)))
        .and_then(Value::as_str)
}

impl TryFrom<Map<String, Value>> for StageTemplate {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(format!(
                "expected a single strategy per item, got {} keys",
                map.len()
            ));
        }
        let (strategy, conf) = map.into_iter().next().ok_or("empty strategy item")?;
        if StageKind::from_strategy(&strategy).is_none() {
            return Err(format!("unknown strategy type '{}'", strategy));
        }
        let config = match conf {
            Value::Object(config) => config,
            Value::Null => Map::new(),
            other => {
                return Err(format!(
                    "configuration of '{}' must be a mapping, got {}",
                    strategy, other
                ))
            }
        };
        Ok(Self { strategy, config })
    }
}

impl From<StageTemplate> for Map<String, Value> {
    fn from(template: StageTemplate) -> Self {
        let mut map = Map::new();
        map.insert(template.strategy, Value::Object(template.config));
        map
    }
}

/// Auxiliary file a tool needs next to its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticFile {
    #[serde(alias = "targetFile")]
    pub target_file: String,
    #[serde(alias = "sourceUri")]
    pub source_uri: String,
}

/// Resolved description of a tool (or of an artifact's native type).
///
/// Absent fields are empty collections or `None`, never errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub input: IndexMap<String, Vec<StageTemplate>>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub output: IndexMap<String, Vec<StageTemplate>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<StaticFile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, alias = "aiida_plugin", skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,

    #[serde(default, alias = "install_command", skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,

    #[serde(
        default,
        alias = "aiidaDatanodeType",
        alias = "datanode_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub datanode_type: Option<String>,
}

impl Descriptor {
    pub fn templates(&self, direction: Direction) -> &IndexMap<String, Vec<StageTemplate>> {
        match direction {
            Direction::Input => &self.input,
            Direction::Output => &self.output,
        }
    }

    /// Templates bound to `artifact`, trying the exact key first and the
    /// compacted key second.
    pub fn template_for(&self, direction: Direction, artifact: &str) -> Option<&[StageTemplate]> {
        let templates = self.templates(direction);
        templates
            .get(artifact)
            .or_else(|| templates.get(&compact_iri(artifact)))
            .map(Vec::as_slice)
    }

    /// File name the tool expects for `artifact`: the location declared by
    /// the last strategy of its input template.
    pub fn input_filename(&self, artifact: &str) -> Option<&str> {
        self.template_for(Direction::Input, artifact)?
            .last()?
            .location()
    }

    /// Declared output file names, in declaration order.
    pub fn output_filenames(&self, tool: &str) -> Result<Vec<String>> {
        self.output
            .iter()
            .map(|(artifact, templates)| {
                templates
                    .first()
                    .and_then(StageTemplate::download_url)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        CompileError::not_found(
                            artifact,
                            format!("download location in output of tool '{}'", tool),
                        )
                    })
            })
            .collect()
    }
}

/// An entry of the knowledge store: either the loadable strategies of a
/// dataset, or a tool descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreEntry {
    Dataset(Vec<StageTemplate>),
    Tool(Descriptor),
}

impl StoreEntry {
    pub fn into_descriptor(self, identifier: &str) -> Result<Descriptor> {
        match self {
            StoreEntry::Tool(descriptor) => Ok(descriptor),
            StoreEntry::Dataset(_) => Err(CompileError::malformed(
                identifier,
                "expected a descriptor mapping, found a strategy list",
            )),
        }
    }

    pub fn into_dataset(self, identifier: &str) -> Result<Vec<StageTemplate>> {
        match self {
            StoreEntry::Dataset(strategies) => Ok(strategies),
            StoreEntry::Tool(_) => Err(CompileError::malformed(
                identifier,
                "expected a strategy list, found a descriptor mapping",
            )),
        }
    }
}
