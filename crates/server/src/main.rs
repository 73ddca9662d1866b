use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod api;
mod config;
mod state;

use config::HostConfig;

#[derive(Parser, Debug)]
#[command(name = "routemcp-demo")]
#[command(about = "Demo web application exposing its routes over MCP", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "routemcp.toml")]
    config: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Swagger JSON file replacing the built-in API documentation
    #[arg(long)]
    docs: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "routemcp=info,routemcp_demo=info,tower_http=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let args = Args::parse();

    tracing::info!("Starting routemcp demo");

    // Load configuration
    let mut config = HostConfig::load(&args.config)?;
    if args.docs.is_some() {
        config.mcp.docs_file = args.docs;
    }

    let addr = format!("{}:{}", args.host, args.port);
    api::serve(&addr, config.mcp).await?;

    Ok(())
}
