//! `workflow-studio` CLI entry-point.
//!
//! Available sub-commands:
//! - `validate` — run the structural checks over a definition file.
//! - `inspect`  — print the editor view of a definition file.
//! - `normalize` — load a definition file and print it back in wire shape.
//! - `import`   — store a definition file as a new workflow.
//! - `export`   — print a stored workflow's definition.
//! - `list`     — list stored workflows.
//! - `status`   — change a stored workflow's lifecycle status.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use graph::normalize::category_for;
use graph::{EditorSession, StoreConfig, WireWorkflowDefinition, WorkflowStatus, WorkflowStore};
use persistence::{FileRepository, WorkflowRepository};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "workflow-studio",
    about = "Offline tooling for workflow graph definitions",
    version
)]
struct Cli {
    /// Directory holding stored workflows.
    #[arg(long, global = true, env = "WORKFLOW_STORE_DIR", default_value = "./workflows")]
    store: PathBuf,

    /// Undo depth for the editing store.
    #[arg(long, global = true)]
    history_capacity: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a workflow definition JSON file.
    Validate {
        /// Path to the workflow JSON file.
        path: PathBuf,
    },
    /// Show nodes, kinds and edges of a definition file.
    Inspect { path: PathBuf },
    /// Print the definition as the editor would save it.
    Normalize { path: PathBuf },
    /// Store a definition file as a new workflow and print its id.
    Import { path: PathBuf },
    /// Print a stored workflow's definition.
    Export { id: Uuid },
    /// List stored workflows, newest first.
    List,
    /// Set the lifecycle status of a stored workflow.
    Status {
        id: Uuid,
        /// One of draft, active, inactive, paused, archived.
        status: WorkflowStatus,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = StoreConfig {
        history_capacity: cli
            .history_capacity
            .unwrap_or(StoreConfig::default().history_capacity),
    };

    match cli.command {
        Command::Validate { path } => {
            let store = load_file(&path, config).await?;
            let report = store.validate();
            for issue in &report.issues {
                let node = issue.node_id.as_deref().unwrap_or("-");
                println!("{:?}\t{node}\t{}", issue.severity, issue.message);
            }
            if !report.is_valid() {
                eprintln!("❌ Validation failed: {} error(s)", report.errors().count());
                std::process::exit(1);
            }
            println!(
                "✅ Workflow is valid ({} node(s), {} warning(s))",
                store.nodes().len(),
                report.warnings().count()
            );
        }
        Command::Inspect { path } => {
            let store = load_file(&path, config).await?;
            println!("name:        {}", store.workflow_name());
            println!("description: {}", store.workflow_description());
            println!("status:      {}", store.workflow_status());
            println!("nodes:");
            for node in store.nodes() {
                println!(
                    "  {:<24} {:<20} {:<8} {}",
                    node.id,
                    node.kind,
                    category_for(node),
                    node.label
                );
            }
            println!("edges:");
            for edge in store.edges() {
                let handle = edge.source_handle.as_deref().unwrap_or("");
                println!("  {} -> {} {handle}", edge.source, edge.target);
            }
        }
        Command::Normalize { path } => {
            let store = load_file(&path, config).await?;
            let definition = store
                .get_workflow_definition()
                .context("cannot normalize workflow")?;
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }
        Command::Import { path } => {
            // Load first so broken files never reach the store.
            let store = load_file(&path, config).await?;
            let definition = store.get_workflow_definition()?;

            let repo = FileRepository::new(&cli.store);
            let record = repo
                .create_workflow(store.workflow_name(), serde_json::to_value(&definition)?)
                .await
                .context("cannot store workflow")?;
            info!(id = %record.id, root = %repo.root().display(), "imported workflow");
            println!("{}", record.id);
        }
        Command::Export { id } => {
            let repo = Arc::new(FileRepository::new(&cli.store));
            let session = EditorSession::open(repo, id, config)
                .await
                .with_context(|| format!("cannot open workflow {id}"))?;
            let mut definition = session.store().get_workflow_definition()?;
            definition.id = Some(id.to_string());
            definition.status = Some(session.store().workflow_status());
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }
        Command::List => {
            let repo = FileRepository::new(&cli.store);
            for record in repo.list_workflows().await? {
                println!(
                    "{}\t{:<8}\t{}\t{}",
                    record.id,
                    record.status,
                    record.updated_at.to_rfc3339(),
                    record.name
                );
            }
        }
        Command::Status { id, status } => {
            let repo = Arc::new(FileRepository::new(&cli.store));
            let mut session = EditorSession::open(repo, id, config)
                .await
                .with_context(|| format!("cannot open workflow {id}"))?;
            session.set_status(status).await?;
            println!("{id}\t{status}");
        }
    }

    Ok(())
}

/// Read a definition file into a fresh store.
async fn load_file(path: &Path, config: StoreConfig) -> Result<WorkflowStore> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content).context("invalid JSON")?;

    let definition = WireWorkflowDefinition::from_value(value)?;
    if definition.nodes.is_empty() && definition.name.is_empty() {
        bail!("{} does not look like a workflow definition", path.display());
    }

    let mut store = WorkflowStore::with_config(config);
    store.load_workflow(definition, None)?;
    info!(
        path = %path.display(),
        nodes = store.nodes().len(),
        edges = store.edges().len(),
        "loaded definition"
    );
    Ok(store)
}
