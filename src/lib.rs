pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
pub use config::Config;
use db::Store;
use services::Scheduler;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command() {
        return cmd_init();
    }

    let config = Config::load()?;
    config.validate()?;

    match cli.command() {
        Commands::HashPassword { plaintext } => cmd_hash_password(&config, plaintext).await,
        Commands::PurgeCodes => {
            init_tracing(&config)?;
            cmd_purge_codes(&config).await
        }
        Commands::Serve | Commands::Init => {
            let prometheus_handle = init_metrics(&config)?;
            init_tracing(&config)?;
            run_server(config, prometheus_handle).await
        }
    }
}

fn init_metrics(
    config: &Config,
) -> anyhow::Result<Option<metrics_exporter_prometheus::PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }

    use metrics_exporter_prometheus::PrometheusBuilder;
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    Ok(Some(handle))
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let mut builder = tracing_loki::builder();
        for (key, value) in &config.observability.loki_labels {
            builder = builder.label(key.as_str(), value.as_str())?;
        }
        let (layer, task) = builder.build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Marketplace v{} starting...", env!("CARGO_PKG_VERSION"));

    if config.admin.password_hash.is_empty() {
        info!("admin.password_hash is empty; admin login is disabled");
    }

    let port = config.server.port;
    let maintenance = config.maintenance.clone();

    let api_state = api::create_app_state_from_config(config, prometheus_handle).await?;

    let scheduler = Arc::new(Scheduler::new(api_state.store().clone(), maintenance));
    let scheduler_handle = {
        let sched = Arc::clone(&scheduler);
        tokio::spawn(async move {
            if let Err(e) = sched.start().await {
                error!("Scheduler error: {}", e);
            }
        })
    };

    let app = api::router(api_state).await;
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    scheduler.stop().await;
    scheduler_handle.abort();
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}

fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml with default settings");
        println!("Set security.jwt_secret and admin.password_hash before serving");
    } else {
        println!("config.toml already exists, leaving it untouched");
    }
    Ok(())
}

async fn cmd_hash_password(config: &Config, plaintext: &str) -> anyhow::Result<()> {
    if plaintext.chars().count() < config.security.min_password_length {
        anyhow::bail!(
            "Password must be at least {} characters long",
            config.security.min_password_length
        );
    }

    let hash = services::credentials::hash_password(plaintext, &config.security).await?;
    println!("{hash}");
    Ok(())
}

async fn cmd_purge_codes(config: &Config) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let removed = Scheduler::new(store, config.maintenance.clone())
        .run_once()
        .await?;
    println!("Removed {removed} expired code(s)");
    Ok(())
}
