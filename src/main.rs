use std::{path::Path, process, sync::Arc};

use spimex_trading::{
    application::{error::AppError, repos::HealthRepo, trading::TradingService},
    cache::{CacheConfig, MemoryCacheBackend, ReadThrough},
    config,
    domain::trading::NewTradingRecord,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use sqlx::PgPool;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Load(args) => run_load(settings, &args.file).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect(&settings.database).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;
    let repositories = Arc::new(
        PostgresRepositories::new(pool).with_statement_timeout(settings.database.statement_timeout),
    );

    let cache = CacheConfig::from(&settings.cache).build().await?;
    let trading = Arc::new(TradingService::new(repositories.clone(), cache));
    let health: Arc<dyn HealthRepo> = repositories;

    let state = ApiState {
        trading,
        health,
        query: settings.query,
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "Listening");

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn run_load(settings: config::Settings, file: &Path) -> Result<(), AppError> {
    let raw = tokio::fs::read(file)
        .await
        .map_err(|err| InfraError::input(file, err.to_string()))?;
    let records: Vec<NewTradingRecord> =
        serde_json::from_slice(&raw).map_err(|err| InfraError::input(file, err.to_string()))?;

    let pool = connect(&settings.database).await?;
    let repositories = Arc::new(
        PostgresRepositories::new(pool).with_statement_timeout(settings.database.statement_timeout),
    );

    // Writes never read the cache; a process-local backend keeps the loader
    // independent of the serving cache backend.
    let cache = ReadThrough::new(
        Arc::new(MemoryCacheBackend::new(settings.cache.prefix.clone())),
        settings.cache.schedule,
        settings.cache.timeout,
    );
    let service = TradingService::new(repositories, cache);

    let inserted = service.bulk_insert(records).await?;
    info!(inserted, file = %file.display(), "Load completed");
    println!("Inserted {inserted} trading results from {}", file.display());
    Ok(())
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect(&settings.database).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;
    info!("Migrations applied");
    Ok(())
}

async fn connect(database: &config::DatabaseSettings) -> Result<PgPool, AppError> {
    let url = database.url.as_deref().ok_or_else(|| {
        InfraError::configuration(
            "database url is required (provide --database-url or set SPIMEX__DATABASE__URL)",
        )
    })?;
    PostgresRepositories::connect(url, database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}
