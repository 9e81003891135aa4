//! Chatbot server binary
//!
//! Run with: cargo run -p stockbot-rag --bin stockbot-server

use clap::Parser;
use std::path::PathBuf;
use stockbot_rag::{config::AppConfig, server::StockbotServer, Secrets};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "stockbot-server", version, about = "Stock-market document chatbot API")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, env = "STOCKBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Host address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Seed the environment from .env before anything reads it
    let dotenv_path = dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockbot_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if let Some(path) = dotenv_path {
        tracing::info!("Loaded environment from {}", path.display());
    }

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Index: {} ({} dims, {})", config.vector_db.index_name, config.vector_db.dimension, config.vector_db.metric);
    tracing::info!("  - Embedding model: {}", config.embedding_model.model_name);
    tracing::info!("  - LLM model: {}", config.llm.model_name);
    tracing::info!("  - Chunk size: {} (overlap {})", config.chunking.chunk_size, config.chunking.chunk_overlap);
    tracing::info!("  - Retriever: top {} above {}", config.retriever.top_k, config.retriever.score_threshold);

    let secrets = Secrets::from_env();
    let missing = secrets.missing();
    if !missing.is_empty() {
        tracing::warn!("Missing environment variables: {:?}", missing);
        tracing::warn!("Features needing them stay disabled until they are set");
    }

    let server = StockbotServer::new(config, secrets);

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  Chat UI: http://{}/ui/", server.address());
    println!("\nEndpoints:");
    println!("  POST /upload - Upload PDF/DOCX documents (multipart field 'files')");
    println!("  POST /query  - Ask a question (JSON or form field 'question')");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
