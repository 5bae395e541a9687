use crate::config::TargetStore;
use crate::decorator::{decorate, ensure_unique_names, StageNames};
use crate::resolver::ResourceResolver;
use ontocore::iri::iri_suffix;
use ontocore::{
    CompileError, Direction, KnowledgeStore, PipelineFragment, Result, Stage, StageKind,
    StageTemplate, WorkflowNode, PIPE_SEPARATOR,
};
use serde_json::{Map, Value};

pub const CONVERSION_FUNCTION_TYPE: &str = "aiidacuds/datanode2file";
pub const EXPORT_FUNCTION_TYPE: &str = "aiidacuds/export";

/// Recoverable inconsistencies found while assembling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    /// Final output handling was requested for an artifact that is itself a
    /// raw dataset; it is used as its own terminal fragment.
    FinalDataset { identifier: String },
}

impl std::fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileWarning::FinalDataset { identifier } => write!(
                f,
                "final output '{}' is a dataset with no downstream sink, using it as-is",
                identifier
            ),
        }
    }
}

/// An assembled fragment together with the warnings raised for it.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub fragment: PipelineFragment,
    pub warnings: Vec<CompileWarning>,
}

/// Builds pipeline fragments for sets of workflow nodes.
pub struct FragmentAssembler<'a> {
    resolver: ResourceResolver<'a>,
}

#[derive(Default)]
struct StageSet {
    stages: Vec<Stage>,
    names: StageNames,
}

impl StageSet {
    fn push(&mut self, direction: Direction, stage: Stage) {
        self.names.push(direction, stage.name.clone());
        self.stages.push(stage);
    }

    /// Instantiate a node's templates: the last stage carries the node's
    /// variable name, earlier ones are numbered.
    fn push_templates(&mut self, node: &WorkflowNode, direction: Direction, templates: &[StageTemplate]) {
        let base = node.var_name(direction);
        let last = templates.len().saturating_sub(1);
        for (k, template) in templates.iter().enumerate() {
            let name = if k == last {
                base.clone()
            } else {
                format!("{}_{}", base, k)
            };
            self.push(direction, Stage::from_template(template, name));
        }
    }
}

impl<'a> FragmentAssembler<'a> {
    pub fn new(store: &'a dyn KnowledgeStore) -> Self {
        Self {
            resolver: ResourceResolver::new(store),
        }
    }

    pub fn resolver(&self) -> &ResourceResolver<'a> {
        &self.resolver
    }

    /// Assemble one fragment over `nodes`.
    ///
    /// Every node contributes its source side (dataset loading, or the
    /// producer's output handling) and, unless `is_final`, its sink side
    /// (the consumer's input handling).
    pub async fn assemble(
        &self,
        nodes: &[&WorkflowNode],
        is_final: bool,
        target_store: Option<&TargetStore>,
    ) -> Result<Assembly> {
        if let Some(target) = target_store {
            target.validate()?;
        }

        let mut set = StageSet::default();
        let mut warnings = Vec::new();

        for node in nodes {
            if node.is_dataset() {
                if is_final {
                    let warning = CompileWarning::FinalDataset {
                        identifier: node.identifier.clone(),
                    };
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                }
                let templates = self.resolver.resolve_dataset_fragment(&node.identifier).await?;
                set.push_templates(node, Direction::Output, &templates);
            } else if !node.resource_kind.output.is_empty() {
                let producer = &node.resource_kind.output;
                let templates = self
                    .resolver
                    .resolve_stage_template(producer, Direction::Output, &node.identifier)
                    .await?;
                if is_final {
                    let export = self.export_stage(node, producer, &templates, target_store)?;
                    set.push(Direction::Output, export);
                } else {
                    let native = self.resolver.resolve_datanode_type(&node.identifier).await?;
                    set.push(Direction::Output, conversion_stage(node, &native));
                    set.push_templates(node, Direction::Output, &templates);
                }
            }

            if !is_final && !node.resource_kind.input.is_empty() {
                let consumer = &node.resource_kind.input;
                let templates = self
                    .resolver
                    .resolve_stage_template(consumer, Direction::Input, &node.identifier)
                    .await?;
                set.push_templates(node, Direction::Input, &templates);
            }
        }

        let (stages, names) = decorate(set.stages, set.names)?;
        let fragment = PipelineFragment::new(stages, names.pipe());
        tracing::debug!("Assembled fragment: {}", fragment.pipe);

        Ok(Assembly { fragment, warnings })
    }

    /// Plain fragment chaining the strategies of the given datasets in
    /// order, each stage named `<iri suffix>_<strategy>`. No adapters are
    /// added.
    pub async fn assemble_resources(&self, identifiers: &[String]) -> Result<PipelineFragment> {
        let mut stages = Vec::new();
        for identifier in identifiers {
            let templates = self.resolver.resolve_dataset_fragment(identifier).await?;
            let suffix = iri_suffix(identifier);
            for template in &templates {
                let name = format!("{}_{}", suffix, template.strategy);
                stages.push(Stage::from_template(template, name));
            }
        }
        ensure_unique_names(&stages)?;

        let pipe = stages
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(PIPE_SEPARATOR);
        Ok(PipelineFragment::new(stages, pipe))
    }

    fn export_stage(
        &self,
        node: &WorkflowNode,
        producer: &str,
        templates: &[StageTemplate],
        target_store: Option<&TargetStore>,
    ) -> Result<Stage> {
        let location = templates
            .iter()
            .find_map(StageTemplate::download_url)
            .ok_or_else(|| {
                CompileError::not_found(
                    &node.identifier,
                    format!("download location in output of tool '{}'", producer),
                )
            })?;

        let mut configuration = Map::new();
        configuration.insert("location".to_string(), Value::String(location.to_string()));
        configuration.insert("datanode".to_string(), Value::String(node.var_name(Direction::Output)));
        if let Some(target) = target_store {
            configuration.insert("documentation".to_string(), serde_json::to_value(target)?);
        }
        Ok(Stage::function(
            StageKind::ConversionFunction,
            node.var_name(Direction::Output),
            EXPORT_FUNCTION_TYPE,
            configuration,
        ))
    }
}

fn conversion_stage(node: &WorkflowNode, native: &str) -> Stage {
    let datanode = node.var_name(Direction::Output);
    let mut configuration = Map::new();
    configuration.insert("datanode".to_string(), Value::String(datanode.clone()));
    configuration.insert("datanodeType".to_string(), Value::String(native.to_string()));
    Stage::function(
        StageKind::ConversionFunction,
        format!("{}_convert", datanode),
        CONVERSION_FUNCTION_TYPE,
        configuration,
    )
}
