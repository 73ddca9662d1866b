// Standalone proxy exposing a remote HTTP application as MCP tools

use anyhow::{Context, Result};
use clap::Parser;
use routemcp::{McpServer, ServerConfig};
use routemcp_core::{StaticDocs, StaticRoutes};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "routemcp-proxy")]
#[command(about = "Expose a remote HTTP application's routes as MCP tools", long_about = None)]
struct Args {
    /// JSON file with an array of {"method", "path"} route entries
    #[arg(short, long)]
    routes: PathBuf,

    /// Swagger 2.0 JSON documentation for the application
    #[arg(short, long)]
    docs: Option<PathBuf>,

    /// Base URL of the application receiving tool calls
    #[arg(short, long, env = "ROUTEMCP_BASE_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Path the protocol endpoint is served on
    #[arg(short, long, default_value = "/mcp")]
    mount: String,

    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    listen: String,

    /// Only expose routes matching these patterns
    #[arg(long)]
    include: Vec<String>,

    /// Hide routes matching these patterns
    #[arg(long)]
    exclude: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let content = std::fs::read_to_string(&args.routes)
        .with_context(|| format!("Failed to read route list {}", args.routes.display()))?;
    let routes = StaticRoutes::from_json(&content).context("Failed to parse route list")?;

    let config = ServerConfig {
        base_url: args.base_url,
        include_operations: args.include,
        exclude_operations: args.exclude,
        ..Default::default()
    };
    let mut server = McpServer::new(config, Arc::new(routes))?;

    if let Some(path) = &args.docs {
        let docs = StaticDocs::from_file(path).context("Failed to load API documentation")?;
        server = server.with_docs(Arc::new(docs))?;
    }

    let app = server.mount(&args.mount)?;
    tracing::info!(
        upstream = %server.base_url(),
        tools = server.tools().len(),
        "proxy ready"
    );

    let listener = tokio::net::TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;
    tracing::info!("Serving MCP on http://{}{}", args.listen, args.mount);

    axum::serve(listener, app).await?;

    Ok(())
}
