//! Build an igv session from a running track server.
//!
//! Run with: cargo run -p igvmb-loader --bin igvmb-session -- --server http://localhost:8080 --bigwig 42

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use igvmb_loader::{HttpTrackSource, LoadOutcome, SessionWidget, TrackLoader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "igvmb-session", about = "Load tracks from an igv-multibrowser server into a session file")]
struct Args {
    /// Base URL of the track server
    #[arg(long, env = "IGVMB_SERVER", default_value = "http://127.0.0.1:8080")]
    server: String,

    /// BigWig object group to load (repeatable)
    #[arg(long = "bigwig")]
    bigwigs: Vec<String>,

    /// BAM object group to load (repeatable)
    #[arg(long = "bam")]
    bams: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Mount point recorded in the session
    #[arg(long, default_value = "igv-div-1")]
    mount: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the session JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let source = HttpTrackSource::with_timeout(&args.server, Duration::from_secs(args.timeout_secs))?;
    let loader = TrackLoader::new(Arc::new(source));
    let widget = SessionWidget::new();

    loader.initialize(&widget, &args.mount).await?;

    let mut failed = 0usize;
    for id in &args.bigwigs {
        failed += report(id, loader.load_bigwig_tracks(id).await);
    }
    for id in &args.bams {
        failed += report(id, loader.load_bam_tracks(id).await);
    }

    let browser = widget
        .browser()
        .await
        .ok_or_else(|| anyhow::anyhow!("browser was not created"))?;
    println!("{}", serde_json::to_string_pretty(&browser.session().await)?);

    if failed > 0 {
        anyhow::bail!("{} track group(s) failed to load", failed);
    }
    Ok(())
}

fn report(id: &str, result: Result<LoadOutcome, igvmb_loader::LoaderError>) -> usize {
    match result {
        Ok(LoadOutcome::Loaded(r)) if r.is_complete() => {
            info!(id, registered = r.registered, "Group loaded");
            0
        }
        Ok(LoadOutcome::Loaded(r)) => {
            warn!(id, registered = r.registered, failed = r.failures.len(), "Group partially loaded");
            1
        }
        Ok(LoadOutcome::Duplicate) => 0,
        // Already logged by the loader.
        Err(_) => 1,
    }
}
