mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use postlens_gateway::{start_server, AppState};
use postlens_relay::MattermostRelay;
use postlens_staging::{StagingStore, StoreWriter, UploadSurface};
use postlens_understanding::ExtractionClient;

use config::Config;

#[derive(Parser)]
#[command(name = "postlens")]
#[command(about = "PostLens — screenshot upload, extraction, and chat relay")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the PostLens web server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show current server status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    postlens_logging::init_logger(&config.log_dir, &config.log_level);

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Status => {
            let client = reqwest::Client::new();
            match client
                .get(format!("http://localhost:{}/api/health", config.port))
                .send()
                .await
            {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("PostLens is not running on port {}", config.port);
                }
            }
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        "Starting PostLens"
    );

    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY not set; extraction requests will fail upstream");
    }

    let store = Arc::new(StagingStore::new());
    let writer = StoreWriter::spawn(Arc::clone(&store));
    let surface = Arc::new(UploadSurface::new(Arc::clone(&store), writer));

    let relay = Arc::new(MattermostRelay::new(config.mattermost_webhook_url.clone()));

    let mut client = ExtractionClient::new(config.openai_api_key.clone().unwrap_or_default())
        .with_concurrency(config.fanout_concurrency)
        .with_call_timeout(Duration::from_secs(config.call_timeout_secs))
        .with_sink(relay);
    if let Some(model) = &config.vision_model {
        client = client.with_model(model);
    }

    let state = AppState {
        store,
        surface,
        client: Arc::new(client),
    };

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port).parse()?;
    start_server(addr, state).await
}
