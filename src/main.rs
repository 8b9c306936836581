//! Grade Sheet server
//!
//! Serves `GET /generate-grades`, which fetches the whole batch from the
//! results portal and writes the grade workbook.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use grade_sheet::{
    roll_numbers, router, AppState, GradePipeline, PortalClient, RequestPacer, Settings,
    XlsxWriter,
};

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "grade-sheet")]
#[command(about = "Generate a grade workbook from the results portal", long_about = None)]
struct Args {
    /// Path to an optional YAML settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server port
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    match path {
        Some(path) if path.exists() => Settings::from_file(path),
        Some(path) => {
            warn!("Config file {:?} not found, using defaults", path);
            Ok(Settings::default())
        }
        None => Ok(Settings::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    let settings = load_settings(args.config.as_ref()).context("Failed to load configuration")?;
    let output_path = settings.output_path()?;

    info!("Results portal: {}", settings.base_url);
    info!(
        "Request timeout: {:?}, delay between students: {:?}",
        settings.request_timeout(),
        settings.request_delay()
    );
    info!("Output file: {:?}", output_path);

    let client = PortalClient::new(&settings)?;
    let pipeline = GradePipeline::new(
        Arc::new(client),
        Arc::new(XlsxWriter::new(output_path)),
        RequestPacer::new(settings.request_delay()),
        roll_numbers(),
    );

    let app = router(AppState {
        pipeline: Arc::new(pipeline),
    });

    let bind_addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context(format!("Failed to bind {}", bind_addr))?;
    info!("Server running at http://localhost:{}", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
