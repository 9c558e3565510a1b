use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the spimex-trading binary.
#[derive(Debug, Parser)]
#[command(
    name = "spimex-trading",
    version,
    about = "Cached query service for exchange trading results"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "SPIMEX_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
    /// Bulk-insert trading results from a JSON file.
    Load(LoadArgs),
    /// Apply pending database migrations and exit.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the per-statement storage timeout.
    #[arg(long = "database-statement-timeout-ms", value_name = "MS")]
    pub database_statement_timeout_ms: Option<u64>,

    /// Select the cache backend (memory|redis).
    #[arg(long = "cache-backend", value_name = "BACKEND")]
    pub cache_backend: Option<String>,

    /// Override the redis connection URL.
    #[arg(long = "cache-redis-url", value_name = "URL")]
    pub cache_redis_url: Option<String>,

    /// Override the cache key prefix.
    #[arg(long = "cache-prefix", value_name = "PREFIX")]
    pub cache_prefix: Option<String>,

    /// Override the hour of the daily cache reset.
    #[arg(long = "cache-reset-hour", value_name = "HOUR")]
    pub cache_reset_hour: Option<u32>,

    /// Override the minute of the daily cache reset.
    #[arg(long = "cache-reset-minute", value_name = "MINUTE")]
    pub cache_reset_minute: Option<u32>,

    /// IANA time zone in which the reset time is interpreted.
    #[arg(long = "cache-timezone", value_name = "ZONE")]
    pub cache_timezone: Option<String>,

    /// Override the cache round-trip timeout.
    #[arg(long = "cache-timeout-ms", value_name = "MS")]
    pub cache_timeout_ms: Option<u64>,

    /// Override the page size used when `limit` is omitted.
    #[arg(long = "query-default-limit", value_name = "COUNT")]
    pub query_default_limit: Option<u32>,

    /// Override the largest accepted `limit`.
    #[arg(long = "query-max-limit", value_name = "COUNT")]
    pub query_max_limit: Option<u32>,
}

#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// JSON array of trading results to insert.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Args, Default, Clone)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,
}
