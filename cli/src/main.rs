mod scene_file;
mod store;

use std::path::PathBuf;

use canvas::sync::{self, ShapeStore, StoreError, SyncError};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::store::HttpShapeStore;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    ServerError { status: String, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("save failed: {0}")]
    Sync(#[from] SyncError),
}

#[derive(Parser, Debug)]
#[command(name = "floorplan-cli", about = "Floor plan persistence and reconciliation CLI")]
struct Cli {
    #[arg(long, env = "FLOORPLAN_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    Tables(TablesCommand),
    /// Print the operations a save of the scene file would dispatch.
    Plan(SceneArgs),
    /// Reconcile the scene file with the service and record assigned ids.
    Save(SceneArgs),
}

#[derive(Args, Debug)]
struct TablesCommand {
    #[command(subcommand)]
    command: TablesSubcommand,
}

#[derive(Subcommand, Debug)]
enum TablesSubcommand {
    List {
        floor_id: Uuid,
    },
    Read {
        floor_id: Uuid,
        table_id: Uuid,
    },
    Create {
        floor_id: Uuid,
        #[arg(long)]
        data: String,
    },
    Patch {
        floor_id: Uuid,
        table_id: Uuid,
        #[arg(long)]
        data: String,
    },
    Delete {
        floor_id: Uuid,
        table_id: Uuid,
    },
}

#[derive(Args, Debug)]
struct SceneArgs {
    floor_id: Uuid,

    #[arg(long, help = "JSON array of tables")]
    scene: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let ctx = CliContext { base_url: cli.base_url };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Tables(tables) => run_tables(&ctx, tables).await,
        Command::Plan(args) => run_plan(&ctx, args).await,
        Command::Save(args) => run_save(&ctx, args).await,
    }
}

async fn run_ping(cli: &CliContext) -> Result<(), CliError> {
    let client = reqwest::Client::new();
    let url = format!("{}/healthz", cli.base_url.trim_end_matches('/'));
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError {
            status: format!("HTTP {}", status.as_u16()),
            message: "health check failed".to_owned(),
        });
    }
    println!("ok");
    Ok(())
}

async fn run_tables(cli: &CliContext, tables: TablesCommand) -> Result<(), CliError> {
    let (method, path, body) = match tables.command {
        TablesSubcommand::List { floor_id } => (reqwest::Method::GET, tables_path(floor_id, None), None),
        TablesSubcommand::Read { floor_id, table_id } => {
            (reqwest::Method::GET, tables_path(floor_id, Some(table_id)), None)
        }
        TablesSubcommand::Create { floor_id, data } => {
            let body = serde_json::from_str::<Value>(&data)?;
            (reqwest::Method::POST, tables_path(floor_id, None), Some(body))
        }
        TablesSubcommand::Patch { floor_id, table_id, data } => {
            let body = serde_json::from_str::<Value>(&data)?;
            (reqwest::Method::PATCH, tables_path(floor_id, Some(table_id)), Some(body))
        }
        TablesSubcommand::Delete { floor_id, table_id } => {
            (reqwest::Method::DELETE, tables_path(floor_id, Some(table_id)), None)
        }
    };
    let json = api_request(cli, method, &path, body).await?;
    print_json(&json)
}

async fn run_plan(cli: &CliContext, args: SceneArgs) -> Result<(), CliError> {
    let shapes = scene_file::load(&args.scene)?;
    let store = HttpShapeStore::new(&cli.base_url);
    let baseline = store.list(args.floor_id).await?;
    let plan = sync::diff(&shapes, &baseline);
    print_json(&serde_json::to_value(&plan)?)
}

async fn run_save(cli: &CliContext, args: SceneArgs) -> Result<(), CliError> {
    let mut shapes = scene_file::load(&args.scene)?;
    let store = HttpShapeStore::new(&cli.base_url);
    let report = sync::save(&store, args.floor_id, &shapes).await?;

    let assigned = scene_file::apply_report(&mut shapes, &report);
    if assigned > 0 {
        scene_file::store(&args.scene, &shapes)?;
        info!(assigned, path = %args.scene.display(), "scene file updated with durable ids");
    }
    print_json(&scene_file::report_json(&report))
}

fn tables_path(floor_id: Uuid, table_id: Option<Uuid>) -> String {
    match table_id {
        Some(id) => format!("/api/floors/{floor_id}/tables/{id}"),
        None => format!("/api/floors/{floor_id}/tables"),
    }
}

async fn api_request(
    cli: &CliContext,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
) -> Result<Value, CliError> {
    let client = reqwest::Client::new();
    let url = format!("{}{}", cli.base_url.trim_end_matches('/'), path);

    let request = client.request(method, &url);
    let request = if let Some(json) = body { request.json(&json) } else { request };

    let response = request.send().await?;
    let status = response.status();
    let value = response
        .json::<Value>()
        .await
        .unwrap_or_else(|_| Value::Null);

    if !status.is_success() {
        return Err(CliError::ServerError { status: format!("HTTP {}", status.as_u16()), message: value.to_string() });
    }

    Ok(value)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
