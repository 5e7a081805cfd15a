// src/main.rs

use administrativamente::{router, AppState, CacheManager, NotionHttpClient, ServerArgs, SiteConfig};
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}";

/// Sets up logging configuration.
fn setup_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    let mut config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)));
    let mut root = Root::builder().appender("stdout");

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file_appender = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(path)?;
        config = config.appender(Appender::builder().build("file", Box::new(file_appender)));
        root = root.appender("file");
    }

    log4rs::init_config(config.build(root.build(log_level))?)?;
    if let Some(path) = log_file {
        log::info!("Logging initialized. Log file: {}", path.display());
    }
    Ok(())
}

/// Drops expired cache entries once per TTL so idle keys do not pile up.
fn spawn_cache_sweeper(cache: Arc<CacheManager>) {
    let period = cache.ttl().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.purge_expired();
            if removed > 0 {
                log::debug!("Purged {} expired cache entries", removed);
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    let dotenv_loaded = args.dotenv.exists();
    if dotenv_loaded {
        dotenvy::from_path(&args.dotenv)
            .with_context(|| format!("Failed to load {}", args.dotenv.display()))?;
    }

    setup_logging(args.verbose, args.log_file.as_deref())?;
    if dotenv_loaded {
        log::info!("Loaded environment from {}", args.dotenv.display());
    }

    let config = SiteConfig::from_env()?;
    let source = NotionHttpClient::with_base_url(&config.notion_token, &config.notion_api_base)?;
    let cache = Arc::new(CacheManager::new(Duration::from_secs(args.cache_ttl)));
    spawn_cache_sweeper(cache.clone());

    let state = AppState::new(config, Arc::new(source), cache);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    log::info!("Listening on {}", args.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
