use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use triagekit_client::TriageClient;
use triagekit_core::DraftMode;

mod eval;
mod routes;
mod server;

use server::AppState;

#[derive(Parser)]
#[command(name = "triagekit", version, about = "Support ticket triage console")]
struct Cli {
    /// Base URL of the analyze/draft service.
    #[arg(
        long,
        env = "PY_URL",
        default_value = "http://127.0.0.1:8000",
        global = true
    )]
    backend_url: String,
    /// Give up on a service call after this many seconds. Unset waits forever.
    #[arg(long, env = "TRIAGEKIT_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the triage page and its JSON API.
    Serve {
        #[arg(long, env = "TRIAGEKIT_LISTEN", default_value = "127.0.0.1:3000")]
        listen: SocketAddr,
        /// Draft mode used when a request does not name one (manual or auto).
        #[arg(long, default_value = "manual")]
        mode: DraftMode,
    },
    /// Replay golden tickets against the service and write a metrics report.
    Eval {
        #[arg(long, default_value = "golden_tickets.json")]
        golden: PathBuf,
        #[arg(long, default_value = "METRICS_REPORT.md")]
        out: PathBuf,
        /// Also write the raw metrics as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
        /// Entity threshold to measure accuracy at; repeat for several.
        #[arg(long = "threshold")]
        thresholds: Vec<f64>,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    tracing::info!("triagekit v{}", env!("CARGO_PKG_VERSION"));

    let timeout = cli
        .timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);
    let client = TriageClient::with_timeout(cli.backend_url, timeout)
        .context("building HTTP client")?;

    match cli.command {
        Commands::Serve { listen, mode } => {
            let backend_url = client.base_url().to_string();
            let state = AppState::new(Arc::new(client), backend_url, mode);
            server::run(state, listen).await?;
        }
        Commands::Eval {
            golden,
            out,
            json,
            thresholds,
        } => {
            let options = eval::EvalOptions {
                golden,
                out,
                json,
                thresholds,
            };
            eval::run(&client, &options).await?;
        }
    }

    Ok(())
}
