#![allow(dead_code)]

use ontocore::{Descriptor, StageTemplate, WorkflowDescription};
use ontostore::{InMemoryStore, ResourceDocument};
use serde_json::Value;

pub const SS3: &str = "http://open-model.eu/ontologies/ss3#";

const DEMO_RESOURCES: &str = include_str!("../../../../demos/ss3/resources.yaml");
const DEMO_WORKFLOW: &str = include_str!("../../../../demos/ss3/workflow.yaml");

pub fn ss3(name: &str) -> String {
    format!("{}{}", SS3, name)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

pub fn template(value: Value) -> StageTemplate {
    serde_json::from_value(value).expect("valid stage template")
}

pub fn descriptor(value: Value) -> Descriptor {
    serde_json::from_value(value).expect("valid descriptor")
}

pub async fn demo_store() -> InMemoryStore {
    ResourceDocument::from_yaml_str(DEMO_RESOURCES)
        .expect("demo resources parse")
        .into_store()
        .await
        .expect("demo resources populate")
}

pub fn demo_workflow() -> WorkflowDescription {
    WorkflowDescription::from_yaml_str(DEMO_WORKFLOW).expect("demo workflow parses")
}

/// Minimal one-step workflow: `Result` produced by `Tool` consuming `Raw`.
pub fn one_step_workflow() -> WorkflowDescription {
    WorkflowDescription::branch(ss3("Result")).produced_by(
        WorkflowDescription::branch(ss3("Tool"))
            .with_depth(1)
            .consumes(WorkflowDescription::leaf(ss3("Raw")).with_depth(2)),
    )
}

/// Store matching [`one_step_workflow`]; the tool descriptor uses compacted
/// keys throughout.
pub fn one_step_store() -> InMemoryStore {
    InMemoryStore::new()
        .with_dataset(
            ss3("Raw"),
            vec![template(serde_json::json!({
                "dataresource": {"downloadUrl": "https://example.org/raw.csv", "mediaType": "text/csv"}
            }))],
        )
        .with_tool(
            "ss3:Tool",
            descriptor(serde_json::json!({
                "aiida_plugin": "execwrapper",
                "command": "tool.sh --in raw.csv",
                "input": {
                    "ss3:Raw": [{"function": {
                        "functionType": "application/vnd.dlite-generate",
                        "configuration": {"location": "raw.csv"}
                    }}]
                },
                "output": {
                    "ss3:Result": [{"dataresource": {"downloadUrl": "result.csv"}}]
                }
            })),
        )
}
