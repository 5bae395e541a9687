//! Adapter injection for assembled fragments.
//!
//! Sources produce native data that must be wrapped into the shared
//! container before sinks can read it, and sinks that read files need the
//! files extracted from the container and collected back into datanodes.
//! Decorating is idempotent: every synthesized stage has a fixed name and
//! is only added when no stage of that name exists.

use ontocore::{pipe_expression, CompileError, Direction, Result, Stage, StageKind};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Container-wrap stage name (and function).
pub const CONTAINER_WRAP: &str = "datanode2cuds";
/// Container-collect stage name (and function).
pub const CONTAINER_COLLECT: &str = "cuds2datanode";

pub const WRAP_FUNCTION_TYPE: &str = "aiidacuds/datanode2cuds";
pub const COLLECT_FUNCTION_TYPE: &str = "aiidacuds/cuds2datanode";
pub const FILE_EXTRACTION_FUNCTION_TYPE: &str = "application/vnd.dlite-file2collection";

const FILE_EXTRACTION_SUFFIX: &str = "file2collection";

/// Generated stage names of a fragment, per direction.
///
/// `output` holds source-side (producer) stages, `input` sink-side
/// (consumer) stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageNames {
    pub output: Vec<String>,
    pub input: Vec<String>,
}

impl StageNames {
    pub fn push(&mut self, direction: Direction, name: impl Into<String>) {
        match direction {
            Direction::Output => self.output.push(name.into()),
            Direction::Input => self.input.push(name.into()),
        }
    }

    /// Sources first, then sinks.
    pub fn pipe(&self) -> String {
        pipe_expression(&self.output, &self.input)
    }
}

/// Name of the extraction adapter for stages reading from `origin`.
pub fn file_extraction_name(origin: &str) -> String {
    format!("{}_{}", origin, FILE_EXTRACTION_SUFFIX)
}

/// Fail with `Conflict` if two stages share a name.
pub fn ensure_unique_names(stages: &[Stage]) -> Result<()> {
    let mut seen = HashSet::new();
    for stage in stages {
        if !seen.insert(stage.name.as_str()) {
            return Err(CompileError::Conflict(stage.name.clone()));
        }
    }
    Ok(())
}

pub fn decorate(mut stages: Vec<Stage>, mut names: StageNames) -> Result<(Vec<Stage>, StageNames)> {
    ensure_unique_names(&stages)?;

    let needs_wrap = names
        .output
        .iter()
        .filter_map(|name| find(&stages, name))
        .any(|stage| stage.kind.is_function());
    if needs_wrap && find(&stages, CONTAINER_WRAP).is_none() {
        stages.push(container_wrap(&names.output));
        names.output.insert(0, CONTAINER_WRAP.to_string());
    }

    // Distinct sink locations, in order of first appearance.
    let mut locations: Vec<(String, String)> = Vec::new();
    for name in &names.input {
        let Some(stage) = find(&stages, name) else {
            continue;
        };
        if stage.kind == StageKind::AdapterFunction {
            continue;
        }
        if let Some(location) = stage.location() {
            if !locations.iter().any(|(known, _)| known == location) {
                locations.push((location.to_string(), stage.name.clone()));
            }
        }
    }
    for (location, origin) in locations {
        let adapter = file_extraction(&location, &origin);
        if find(&stages, &adapter.name).is_none() {
            tracing::debug!("Adding file extraction {} for {}", adapter.name, location);
            names.input.push(adapter.name.clone());
            stages.push(adapter);
        }
    }

    let labels: Vec<String> = names
        .input
        .iter()
        .filter_map(|name| find(&stages, name))
        .filter(|stage| stage.function_type() == Some(FILE_EXTRACTION_FUNCTION_TYPE))
        .filter_map(|stage| stage.config.get("configuration")?.get("label")?.as_str())
        .map(str::to_string)
        .collect();
    if !labels.is_empty() && find(&stages, CONTAINER_COLLECT).is_none() {
        stages.push(container_collect(labels));
        names.input.push(CONTAINER_COLLECT.to_string());
    }

    Ok((stages, names))
}

fn find<'s>(stages: &'s [Stage], name: &str) -> Option<&'s Stage> {
    stages.iter().find(|stage| stage.name == name)
}

fn string_list(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

fn container_wrap(sources: &[String]) -> Stage {
    let mut configuration = Map::new();
    configuration.insert("to_cuds".to_string(), string_list(sources));
    Stage::function(
        StageKind::AdapterFunction,
        CONTAINER_WRAP,
        WRAP_FUNCTION_TYPE,
        configuration,
    )
}

fn file_extraction(location: &str, origin: &str) -> Stage {
    let mut configuration = Map::new();
    configuration.insert("location".to_string(), Value::String(location.to_string()));
    configuration.insert("label".to_string(), Value::String(origin.to_string()));
    Stage::function(
        StageKind::AdapterFunction,
        file_extraction_name(origin),
        FILE_EXTRACTION_FUNCTION_TYPE,
        configuration,
    )
}

fn container_collect(labels: Vec<String>) -> Stage {
    let mut configuration = Map::new();
    configuration.insert("from_cuds".to_string(), string_list(&labels));
    Stage::function(
        StageKind::AdapterFunction,
        CONTAINER_COLLECT,
        COLLECT_FUNCTION_TYPE,
        configuration,
    )
}
