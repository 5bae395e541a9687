use crate::descriptor::{config_str, StageTemplate};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Separator between stage names in a pipe expression.
pub const PIPE_SEPARATOR: &str = " | ";

/// Fragment document format version.
pub const FRAGMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageKind {
    /// Loads or describes data (`dataresource`, `resource`, `parser`).
    Resource,
    /// Transforms data (`function`, `transformation`, `mapping`).
    ConversionFunction,
    /// Synthesized bridge between representations.
    AdapterFunction,
    /// `filter`
    FilterSetting,
}

impl StageKind {
    pub fn from_strategy(strategy: &str) -> Option<Self> {
        match strategy {
            "dataresource" | "resource" | "parser" => Some(StageKind::Resource),
            "function" | "transformation" | "mapping" => Some(StageKind::ConversionFunction),
            "filter" => Some(StageKind::FilterSetting),
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, StageKind::ConversionFunction | StageKind::AdapterFunction)
    }
}

/// One named stage of a pipeline fragment.
///
/// Serialized the way the pipeline engine expects a strategy:
/// `{<strategy>: <name>, ...configuration}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub kind: StageKind,
    pub strategy: String,
    pub name: String,
    pub config: Map<String, Value>,
}

impl Stage {
    /// Instantiate a store template under a generated name.
    pub fn from_template(template: &StageTemplate, name: impl Into<String>) -> Self {
        Self {
            kind: template.kind().unwrap_or(StageKind::Resource),
            strategy: template.strategy.clone(),
            name: name.into(),
            config: template.config.clone(),
        }
    }

    /// A synthesized `function` stage.
    pub fn function(
        kind: StageKind,
        name: impl Into<String>,
        function_type: impl Into<String>,
        configuration: Map<String, Value>,
    ) -> Self {
        let mut config = Map::new();
        config.insert("functionType".to_string(), Value::String(function_type.into()));
        config.insert("configuration".to_string(), Value::Object(configuration));
        Self {
            kind,
            strategy: "function".to_string(),
            name: name.into(),
            config,
        }
    }

    pub fn function_type(&self) -> Option<&str> {
        self.config.get("functionType").and_then(Value::as_str)
    }

    pub fn location(&self) -> Option<&str> {
        config_str(&self.config, "location")
    }
}

impl Serialize for Stage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = self.config.keys().filter(|k| **k != self.strategy).count();
        let mut map = serializer.serialize_map(Some(extra + 1))?;
        map.serialize_entry(&self.strategy, &self.name)?;
        for (key, value) in &self.config {
            if *key != self.strategy {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// Join source-side and sink-side names into a pipe expression.
pub fn pipe_expression(output: &[String], input: &[String]) -> String {
    let sources = output.join(PIPE_SEPARATOR);
    let sinks = input.join(PIPE_SEPARATOR);
    match (sources.is_empty(), sinks.is_empty()) {
        (true, _) => sinks,
        (false, true) => sources,
        (false, false) => format!("{}{}{}", sources, PIPE_SEPARATOR, sinks),
    }
}

/// A compiled, composable unit of data materialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineFragment {
    pub stages: Vec<Stage>,
    pub pipe: String,
}

impl PipelineFragment {
    pub fn new(stages: Vec<Stage>, pipe: impl Into<String>) -> Self {
        Self {
            stages,
            pipe: pipe.into(),
        }
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Stage names in pipe order.
    pub fn pipe_names(&self) -> Vec<&str> {
        if self.pipe.is_empty() {
            return Vec::new();
        }
        self.pipe.split(PIPE_SEPARATOR).collect()
    }

    pub fn to_yaml(&self) -> crate::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[derive(Serialize)]
struct FragmentDocument<'a> {
    version: u32,
    strategies: &'a [Stage],
    pipelines: Pipelines<'a>,
}

#[derive(Serialize)]
struct Pipelines<'a> {
    pipe: &'a str,
}

impl Serialize for PipelineFragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FragmentDocument {
            version: FRAGMENT_VERSION,
            strategies: &self.stages,
            pipelines: Pipelines { pipe: &self.pipe },
        }
        .serialize(serializer)
    }
}
