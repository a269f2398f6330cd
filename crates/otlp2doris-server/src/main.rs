use anyhow::{Context, Result};
use clap::Parser;
use otlp2doris_config::{load_from_file_path, RuntimeConfig, ServerConfig};
use std::path::PathBuf;

/// OTLP HTTP server loading telemetry into Apache Doris
#[derive(Parser)]
#[command(name = "otlp2doris")]
#[command(version)]
#[command(about = "OTLP HTTP server loading telemetry into Apache Doris via Stream Load", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// HTTP listen port (overrides config file)
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Step 1: Load base configuration (files, then environment)
    let mut config = match &cli.config {
        Some(path) => load_from_file_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RuntimeConfig::load().context("Failed to load configuration")?,
    };

    // Step 2: Apply CLI overrides (highest priority)
    apply_cli_overrides(&mut config, &cli);
    config.validate()?;

    // Step 3: Logging before anything else can log
    let server = config.server.get_or_insert_with(ServerConfig::default);
    otlp2doris_server::init_tracing(server);

    // Step 4: Build tokio runtime and run async server
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(otlp2doris_server::run_with_config(config))
}

fn apply_cli_overrides(config: &mut RuntimeConfig, cli: &Cli) {
    if let Some(port) = cli.port {
        let server = config.server.get_or_insert_with(ServerConfig::default);
        server.listen_addr = format!("0.0.0.0:{}", port);
    }

    if let Some(level) = &cli.log_level {
        let server = config.server.get_or_insert_with(ServerConfig::default);
        server.log_level = level.clone();
    }
}
