use anyhow::Context;
use tfstate_engine::WritePolicy;
use tfstate_server::{LogFormat, ServerConfig, StateServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Serve(overrides) => {
            let config = resolve_config(&cli, overrides)?;
            init_logging(&config);
            cmd_serve(config).await
        }
        Command::Config(overrides) => {
            let config = resolve_config(&cli, overrides)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

async fn cmd_serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting tfstate backend");
    StateServer::new(config).serve().await?;
    Ok(())
}

/// File values first (or defaults), then flags on top.
fn resolve_config(cli: &Cli, overrides: &Overrides) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServerConfig::default(),
    };

    if let Some(bind) = overrides.bind {
        config.bind_addr = bind;
    }
    if overrides.require_lock {
        config.write_policy = WritePolicy::RequireLock;
    }
    if let Some(max) = overrides.max_body_bytes {
        config.max_body_bytes = max;
    }
    if overrides.reject_invalid_state {
        config.reject_invalid_state = true;
    }
    if let Some(level) = &overrides.log_level {
        config.log_level = level.clone();
    }
    if cli.verbose {
        config.log_level = "debug".into();
    }
    if let Some(format) = overrides.log_format {
        config.log_format = match format {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        };
    }
    Ok(config)
}

// RUST_LOG wins over the configured level.
fn init_logging(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
