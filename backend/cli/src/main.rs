mod config;
mod extract_cmd;
mod lookup_cmd;
mod mime_detect;
mod scan_cmd;
mod status_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use ticketscan_core::TokenVerifier;
use ticketscan_draws::SazkaClient;
use ticketscan_gateway::{FirebaseVerifier, GatewayState, StaticTokenVerifier};

use config::AppConfig;
use scan_cmd::ReplayArgs;

#[derive(Parser)]
#[command(name = "ticketscan")]
#[command(about = "TicketScan: read lottery tickets and check them against official draws")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind to
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Extract ticket data from a photo
    Extract {
        image: PathBuf,
        /// Override the detected MIME type
        #[arg(long)]
        mime: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print the draw identifier for a date
    DrawId { date: String },
    /// Fetch the official results for a draw date
    Lookup {
        date: String,
        /// Saved ticket JSON (from `extract --json`) to check against the results
        #[arg(long)]
        ticket: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Score how well a still image is positioned
    Analyze { image: PathBuf },
    /// Run a scan session over a directory of frames
    Replay {
        dir: PathBuf,
        /// Frames per second to feed the session
        #[arg(long, default_value_t = 30)]
        fps: u32,
        /// Disable auto-capture; the session then only reports feedback
        #[arg(long)]
        no_auto: bool,
        /// Write the captured frame as PNG
        #[arg(long)]
        save: Option<PathBuf>,
        /// Send the captured frame through extraction
        #[arg(long)]
        extract: bool,
        /// Extract, then look up the results for the ticket's draw date
        #[arg(long)]
        lookup: bool,
    },
    /// Query a running server's health endpoint
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();
    let cli = Cli::parse();

    logging::init_logger(&config.log_dir, &config.log_level);

    match cli.command {
        Commands::Serve { port, bind } => {
            let config = AppConfig {
                port: port.unwrap_or(config.port),
                bind_address: bind.unwrap_or(config.bind_address),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Extract { image, mime, json } => {
            extract_cmd::run(&config, &image, mime, json).await?;
        }
        Commands::DrawId { date } => lookup_cmd::draw_id(&date)?,
        Commands::Lookup { date, ticket, json } => {
            lookup_cmd::run(&config, &date, ticket.as_deref(), json).await?;
        }
        Commands::Analyze { image } => scan_cmd::analyze(&image)?,
        Commands::Replay {
            dir,
            fps,
            no_auto,
            save,
            extract,
            lookup,
        } => {
            let args = ReplayArgs {
                dir,
                fps,
                auto_capture: !no_auto,
                save,
                extract,
                lookup,
            };
            scan_cmd::replay(&config, args).await?;
        }
        Commands::Status => status_cmd::run(&config).await?,
    }

    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    let Some(allowed_email) = config.allowed_user_email.clone() else {
        bail!("ALLOWED_USER_EMAIL must be set to serve the API");
    };
    let verifier = build_verifier(&config, &allowed_email)?;
    let vision = config.vision()?;
    let draws = SazkaClient::new(&config.draw_results_base_url);

    info!(
        port = config.port,
        bind = %config.bind_address,
        provider = %config.vision_provider,
        results = %config.draw_results_base_url,
        "Starting TicketScan server"
    );

    let state = GatewayState::new(Arc::new(vision), verifier, Arc::new(draws), allowed_email);
    ticketscan_gateway::start_server(config.socket_addr()?, state).await
}

fn build_verifier(config: &AppConfig, allowed_email: &str) -> Result<Arc<dyn TokenVerifier>> {
    if let Some(key) = &config.firebase_api_key {
        info!("Verifying tokens with Firebase");
        return Ok(Arc::new(FirebaseVerifier::new(key)));
    }
    if let Some(token) = &config.dev_token {
        tracing::warn!("FIREBASE_API_KEY unset, accepting TICKETSCAN_DEV_TOKEN only");
        return Ok(Arc::new(StaticTokenVerifier::new().with_token(token, allowed_email)));
    }
    bail!("set FIREBASE_API_KEY (or TICKETSCAN_DEV_TOKEN for local use) to serve the API")
}
