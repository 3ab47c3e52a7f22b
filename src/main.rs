//! CLI entry point for the Nucleus API client.
//!
//! Reads `NUCLEUS_ORG` and `NUCLEUS_API_KEY` (and the optional overrides
//! documented on [`Config`]) from the environment or a `.env` file, runs one
//! API call and prints the result as JSON on stdout.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use nucleus_api::output::print_json;
use nucleus_api::services::{AssetUpdate, ListAssetsRequest, LogRequest};
use nucleus_api::{Client, Config, Context};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "nucleus_api")]
#[command(about = "Query the Nucleus Security API", long_about = None)]
struct Cli {
    /// Give up on the request after this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all projects
    Projects,
    /// Show one project
    Project { project_id: String },
    /// List the assessments of a project
    Assessments { project_id: String },
    /// List the connectors of a project
    Connectors { project_id: String },
    /// List the assets of a project
    Assets {
        project_id: String,

        #[arg(long, default_value_t = 0)]
        start: i64,

        #[arg(short, long, default_value_t = 0)]
        limit: i64,

        #[arg(long)]
        ip_address: Option<String>,

        #[arg(long)]
        asset_name: Option<String>,

        /// Match either the asset name or its IP address
        #[arg(long)]
        name_or_ip: Option<String>,

        /// Only assets in this group (repeatable)
        #[arg(short, long = "group")]
        groups: Vec<String>,

        /// Include inactive assets
        #[arg(long, default_value_t = false)]
        inactive: bool,
    },
    /// Show one asset
    Asset { project_id: String, asset_id: String },
    /// Change fields of an asset
    UpdateAsset {
        project_id: String,
        asset_id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        criticality: Option<String>,
    },
    /// List the findings of an asset
    Findings { project_id: String, asset_id: String },
    /// List the asset groups of a project
    AssetGroups { project_id: String },
    /// Fetch audit log events
    Logs {
        #[arg(long, default_value_t = 0)]
        start: i64,

        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Only events after this marker
        #[arg(long, conflicts_with = "since")]
        after: Option<String>,

        /// Only events since this RFC 3339 timestamp
        #[arg(long)]
        since: Option<DateTime<Utc>>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/nucleus_api.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("nucleus_api.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    info!(organisation = %config.organisation, "Configuration loaded");
    let client = Client::from_config(&config)?;

    let ctx = match cli.timeout {
        Some(secs) => Context::background().with_timeout(Duration::from_secs(secs)),
        None => Context::background(),
    };
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling request");
            interrupt.cancel();
        }
    });

    if let Err(e) = run(&client, &ctx, cli.command).await {
        // Alternate form includes the source chain.
        error!(error = %format_args!("{e:#}"), "Request failed");
        return Err(e);
    }
    Ok(())
}

/// Runs one subcommand and prints its result.
async fn run(client: &Client, ctx: &Context, command: Commands) -> Result<()> {
    let projects = client.projects();

    match command {
        Commands::Projects => {
            let resp = projects.list(ctx).await?;
            info!(total = resp.value.len(), "Projects fetched");
            print_json(&resp.value)?;
        }
        Commands::Project { project_id } => {
            print_json(&projects.get(ctx, &project_id).await?.value)?;
        }
        Commands::Assessments { project_id } => {
            let resp = projects.list_assessments(ctx, &project_id).await?;
            info!(total = resp.value.len(), "Assessments fetched");
            print_json(&resp.value)?;
        }
        Commands::Connectors { project_id } => {
            let resp = projects.list_connectors(ctx, &project_id).await?;
            info!(total = resp.value.len(), "Connectors fetched");
            print_json(&resp.value)?;
        }
        Commands::Assets {
            project_id,
            start,
            limit,
            ip_address,
            asset_name,
            name_or_ip,
            groups,
            inactive,
        } => {
            let request = ListAssetsRequest {
                start,
                limit,
                ip_address: ip_address.unwrap_or_default(),
                asset_name: asset_name.unwrap_or_default(),
                asset_name_or_ip: name_or_ip.unwrap_or_default(),
                asset_groups: groups,
                inactive_assets: inactive,
            };
            let resp = projects.list_assets(ctx, &project_id, &request).await?;
            info!(total = resp.value.len(), "Assets fetched");
            print_json(&resp.value)?;
        }
        Commands::Asset {
            project_id,
            asset_id,
        } => {
            print_json(&projects.get_asset(ctx, &project_id, &asset_id).await?.value)?;
        }
        Commands::UpdateAsset {
            project_id,
            asset_id,
            name,
            location,
            notes,
            criticality,
        } => {
            let update = AssetUpdate {
                name,
                location,
                notes,
                criticality,
                ..Default::default()
            };
            let resp = projects
                .update_asset(ctx, &project_id, &asset_id, &update)
                .await?;
            info!(success = resp.value.success, "Asset updated");
            print_json(&resp.value)?;
        }
        Commands::Findings {
            project_id,
            asset_id,
        } => {
            let resp = projects
                .list_asset_findings(ctx, &project_id, &asset_id)
                .await?;
            info!(total = resp.value.len(), "Findings fetched");
            print_json(&resp.value)?;
        }
        Commands::AssetGroups { project_id } => {
            let resp = projects.list_asset_groups(ctx, &project_id).await?;
            info!(total = resp.value.len(), "Asset groups fetched");
            print_json(&resp.value)?;
        }
        Commands::Logs {
            start,
            limit,
            after,
            since,
        } => {
            let mut request = LogRequest {
                start,
                limit,
                after: after.unwrap_or_default(),
                since: 0,
            };
            if let Some(since) = since {
                request = request.since_time(since);
            }
            let resp = client.logs().audit_logs(ctx, &request).await?;
            info!(total = resp.value.len(), "Audit log fetched");
            print_json(&resp.value)?;
        }
    }

    Ok(())
}
