use std::path::PathBuf;

use clap::Parser;
use sportspace::config::{Config, StartupError, create_app, run_migrations};

#[derive(Parser)]
struct Args {
    /// Path to a TOML config file.
    #[clap(long, short)]
    config: Option<PathBuf>,
    #[clap(long)]
    database_url: Option<String>,
    #[clap(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    tracing_subscriber::fmt()
        .with_max_level(config.log_level()?)
        .init();

    tracing::info!(location = %config.database_url, "opening database");

    let pool = config.build_pool()?;

    let migration_pool = pool.clone();
    tokio::task::spawn_blocking(move || run_migrations(&migration_pool))
        .await
        .map_err(|e| StartupError::Io(e.into()))??;

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, create_app(pool)).await?;

    Ok(())
}
