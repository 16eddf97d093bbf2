//! Campus - CLI Server
//!
//! Headless LMS backend suitable for deployment as a systemd service,
//! Docker container, or standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/campus-service/config.toml)
//! campus-service
//!
//! # Custom config path
//! campus-service --config /etc/campus/config.toml
//!
//! # Override the API port
//! campus-service --api-port 8080
//!
//! # Validate config without starting
//! campus-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use campus::config::AppConfig;
use campus::server::{init_tracing, ServerHandle, ServerOptions};

/// Campus - REST backend for an online learning platform.
#[derive(Parser, Debug)]
#[command(
    name = "campus-service",
    version,
    about = "Learning-management backend with REST API",
    long_about = "Campus - REST API server for courses, enrollments, payments, \
                  assessments and community features.\n\n\
                  Default config: ~/.config/campus-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "CAMPUS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the database URL.
    #[arg(long, env = "CAMPUS_DATABASE_URL")]
    database_url: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default admin user.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.unwrap_or_else(campus::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            AppConfig::default()
        }
    };

    // CLI overrides
    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
        config.server.api_port = port;
    }
    if let Some(url) = cli.database_url {
        info!("CLI override: database url");
        config.database.url = url;
    }
    if let Some(ref level) = cli.log_level {
        info!("CLI override: log_level = {}", level);
        config.logging.level = level.clone();
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}:{}", config.server.api_host, config.server.api_port);
        println!("   Database    : {}", config.database.connection_url());
        println!("   Log level   : {}", config.logging.level);
        println!("   Email       : {}", config.email.provider);
        println!("   Storage     : {}", if config.storage.is_configured() { "configured" } else { "disabled" });
        println!("   Video       : {}", if config.stream.is_configured() { "configured" } else { "disabled" });
        return Ok(());
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
    })
    .await?;

    handle.install_signal_handler();

    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
