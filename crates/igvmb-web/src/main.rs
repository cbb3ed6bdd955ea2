//! IGV Multibrowser track server
//!
//! Run with: cargo run -p igvmb-web -- --config igvmb.toml

use std::path::PathBuf;

use clap::Parser;
use igvmb_web::config::Config;
use igvmb_web::router::build_router;
use igvmb_web::state::AppState;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "igvmb-web", about = "IGV multibrowser track server")]
struct Args {
    /// Path of the config file
    #[arg(short = 'c', long = "config", env = "IGVMB_CONFIG", default_value = "igvmb.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    info!(
        config = %args.config.display(),
        bigwig_groups = config.bigwigs.len(),
        bam_groups = config.bam.len(),
        "Starting IGV multibrowser server..."
    );

    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
