//! Server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, database and
//! migrations, service wiring, the REST API and background tasks, and
//! graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::Router;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tracing::{error, info, warn};

use crate::application::{Adapters, AppServices};
use crate::config::{AppConfig, RateLimitConfig};
use crate::infrastructure::{init_database, run_migrations, DatabaseConfig};
use crate::interfaces::http::{create_api_router, AppState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Create the configured admin account when missing (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

/// Handle to a running service.
pub struct ServerHandle {
    /// Wired application services, shared with the API.
    pub services: AppServices,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Port the REST API is listening on.
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
    background: Vec<tokio::task::JoinHandle<()>>,
}

/// The global recorder can be installed once per process; restarts reuse it.
fn prometheus_handle() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics recorder installed");
    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}

impl ServerHandle {
    /// Start the service.
    ///
    /// 1. Install the Prometheus recorder
    /// 2. Connect to the database and run migrations
    /// 3. Create the default admin (if enabled)
    /// 4. Wire services and recover interrupted import jobs
    /// 5. Start the REST API (with Swagger UI) and the cache cleanup task
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!("Starting campus service...");

        let prometheus = prometheus_handle()?;

        let db_config = DatabaseConfig::from(&app_cfg.database);
        info!(url = %db_config.url, "Connecting to database");
        let db = init_database(&db_config).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            run_migrations(&db).await?;
            info!("Migrations completed");
        }

        let adapters = Adapters::from_config(&app_cfg)?;
        let services = AppServices::new(db.clone(), &app_cfg, adapters);

        if opts.create_default_admin {
            match services.users.ensure_default_admin(&app_cfg.admin).await {
                Ok(Some(admin)) => {
                    info!(email = %admin.email, "Default admin created");
                    warn!("Change the default admin password immediately");
                }
                Ok(None) => {}
                Err(e) => error!(error = %e, "Failed to create default admin"),
            }
        }

        match services.course_import.recover_interrupted().await {
            Ok(0) => {}
            Ok(n) => warn!(jobs = n, "Marked interrupted import jobs as failed"),
            Err(e) => error!(error = %e, "Failed to recover interrupted import jobs"),
        }

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let mut background = Vec::new();
        background.push(Arc::clone(&services.cache).spawn_cleanup(
            Duration::from_secs(app_cfg.cache.cleanup_interval_secs.max(1)),
            shutdown_signal.clone(),
        ));

        let state = AppState::new(services.clone(), prometheus);
        let (api_router, sweeper) =
            with_rate_limit(create_api_router(state), &app_cfg.rate_limit, shutdown_signal.clone())?;
        background.extend(sweeper);

        let api_port = app_cfg.server.api_port;
        let api_addr = format!("{}:{}", app_cfg.server.api_host, api_port);
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        info!("REST API listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("Campus service started");

        Ok(Self {
            services,
            config: app_cfg,
            api_port,
            db,
            shutdown,
            api_task,
            background,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Send the shutdown signal without waiting.
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the API and background tasks to stop, bounded by the
    /// configured shutdown timeout, then close the database.
    pub async fn wait(self) {
        info!("Waiting for server tasks to complete...");
        let timeout = Duration::from_secs(self.shutdown.timeout_secs());

        let tasks = async {
            match self.api_task.await {
                Ok(()) => info!("REST API stopped"),
                Err(e) => error!("REST API task panicked: {}", e),
            }
            for task in self.background {
                if let Err(e) = task.await {
                    error!("Background task panicked: {}", e);
                }
            }
        };
        if tokio::time::timeout(timeout, tasks).await.is_err() {
            warn!(timeout_secs = timeout.as_secs(), "Shutdown timed out; abandoning remaining tasks");
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }
        info!("Campus service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down campus service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Per-IP token bucket in front of the API. `per_second == 0` disables
/// limiting. Also returns the task that evicts idle buckets.
fn with_rate_limit(
    router: Router,
    cfg: &RateLimitConfig,
    shutdown: ShutdownSignal,
) -> Result<(Router, Option<tokio::task::JoinHandle<()>>), Box<dyn std::error::Error>> {
    if cfg.per_second == 0 {
        info!("Rate limiting disabled");
        return Ok((router, None));
    }
    let replenish_ms = (1000 / cfg.per_second).max(1);
    let governor = GovernorConfigBuilder::default()
        .per_millisecond(replenish_ms)
        .burst_size(cfg.burst.max(1))
        .finish()
        .ok_or("invalid rate limit configuration")?;
    let governor = Arc::new(governor);

    let limiter = governor.limiter().clone();
    let sweeper = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            tokio::select! {
                _ = ticker.tick() => limiter.retain_recent(),
                _ = shutdown.wait() => break,
            }
        }
    });

    info!(per_second = cfg.per_second, burst = cfg.burst, "Rate limiting enabled");
    Ok((router.layer(GovernorLayer::new(governor)), Some(sweeper)))
}

/// Initialize tracing from the application config. `RUST_LOG` wins over the
/// configured level.
///
/// Call once at process start, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
