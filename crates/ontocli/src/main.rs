// crates/ontocli/src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ontocompiler::{ChainCompiler, CompilerConfig, FragmentAssembler, ResourceResolver, TargetStore};
use ontocore::{KnowledgeStore, WorkflowDescription};
use ontostore::{DirectorySink, InMemoryStore, ResourceDocument};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ontochain")]
#[command(about = "Compile ontology workflow descriptions into execution chains", long_about = None)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a workflow description into pipeline fragments and a chain
    Compile {
        /// Workflow description (YAML, or JSON with a .json extension)
        #[arg(short, long)]
        workflow: PathBuf,

        /// Resource document to populate the knowledge store from
        #[arg(short, long)]
        resources: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Store for documenting final outputs, as backend[:location]
        #[arg(short, long)]
        target_store: Option<String>,

        /// Maximum nesting depth of the description
        #[arg(long, default_value_t = ontocompiler::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Show the descriptor of a tool
    Inspect {
        #[arg(short, long)]
        resources: PathBuf,

        /// Tool IRI (full or prefixed)
        iri: String,
    },

    /// Print a plain pipeline chaining the given data resources
    Pipeline {
        #[arg(short, long)]
        resources: PathBuf,

        /// Data resource IRIs, from source to sink
        #[arg(required = true)]
        iris: Vec<String>,
    },

    /// List the recorded types of every data resource
    Types {
        #[arg(short, long)]
        resources: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compile {
            workflow,
            resources,
            out,
            target_store,
            max_depth,
        } => {
            compile_workflow(&workflow, &resources, out, target_store, max_depth).await?;
        }

        Commands::Inspect { resources, iri } => {
            inspect_tool(&resources, &iri).await?;
        }

        Commands::Pipeline { resources, iris } => {
            print_pipeline(&resources, iris).await?;
        }

        Commands::Types { resources } => {
            list_types(&resources).await?;
        }
    }

    Ok(())
}

async fn load_store(resources: &Path) -> Result<(ResourceDocument, InMemoryStore)> {
    let document = ResourceDocument::from_path(resources)
        .with_context(|| format!("loading resources from {}", resources.display()))?;
    let store = InMemoryStore::new();
    let count = document.populate(&store).await?;
    tracing::debug!("Loaded {} resources from {}", count, resources.display());
    Ok((document, store))
}

fn load_description(path: &Path) -> Result<WorkflowDescription> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading workflow {}", path.display()))?;
    let description = if path.extension().is_some_and(|ext| ext == "json") {
        WorkflowDescription::from_json_str(&content)?
    } else {
        WorkflowDescription::from_yaml_str(&content)?
    };
    Ok(description)
}

async fn compile_workflow(
    workflow: &Path,
    resources: &Path,
    out: PathBuf,
    target_store: Option<String>,
    max_depth: usize,
) -> Result<()> {
    let description = load_description(workflow)?;
    let (_, store) = load_store(resources).await?;

    let mut config = CompilerConfig::default().with_max_depth(max_depth);
    if let Some(spec) = target_store {
        config = config.with_target_store(spec.parse::<TargetStore>()?);
    }

    let compilation = ChainCompiler::with_config(&store, config)
        .compile(&description)
        .await?;

    let mut sink = DirectorySink::new(&out)?;
    compilation.persist(&mut sink)?;

    println!("Compilation {}", compilation.id);
    println!("   Compiled at: {}", compilation.compiled_at.to_rfc3339());
    println!("   Chain steps: {}", compilation.chain.len());
    for named in &compilation.fragments {
        println!("   Fragment: {} ({})", named.file_name, named.fragment.pipe);
    }
    for warning in &compilation.warnings {
        println!("   Warning: {}", warning);
    }
    println!("   Written to: {}", out.display());

    Ok(())
}

async fn inspect_tool(resources: &Path, iri: &str) -> Result<()> {
    let (document, store) = load_store(resources).await?;
    let iri = document.expand(iri);
    let descriptor = ResourceResolver::new(&store).descriptor(&iri).await?;
    print!("{}", serde_yaml::to_string(&descriptor)?);
    Ok(())
}

async fn print_pipeline(resources: &Path, iris: Vec<String>) -> Result<()> {
    let (document, store) = load_store(resources).await?;
    let iris: Vec<String> = iris.iter().map(|iri| document.expand(iri)).collect();
    let fragment = FragmentAssembler::new(&store).assemble_resources(&iris).await?;
    print!("{}", fragment.to_yaml()?);
    Ok(())
}

async fn list_types(resources: &Path) -> Result<()> {
    let (document, store) = load_store(resources).await?;
    for key in document.data_resources.keys() {
        let iri = document.expand(key);
        let types = store.types(&iri).await?;
        println!("{}", iri);
        for type_tag in types {
            println!("  • {}", type_tag);
        }
    }
    Ok(())
}
