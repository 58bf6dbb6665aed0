//! CLI argument definitions for rupee.
//!
//! Every setting can come from a flag or from its environment variable.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the HTTP API |
//! | `fetch` | Run one ingestion and print the stored observations |
//! | `watch` | Run ingestion on a fixed interval until interrupted |
//! | `latest` | Print the newest stored observation |
//! | `history` | Print stored observations for a period |
//! | `banks` | Print the configured bank codes |
//!
//! # Examples
//!
//! ```bash
//! export RUPEE_DB_URI=./data/rates.duckdb RUPEE_DB_NAME=rates RUPEE_DB_COLLECTION=usd_lkr
//!
//! rupee fetch --bank SAMPATH
//! rupee history --bank HNB --period month --pretty
//! RUPEE_BANKS=SAMPATH,HNB rupee serve --listen-addr 127.0.0.1:8080
//! ```

use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// USD/LKR bank rate collector and API.
#[derive(Debug, Parser)]
#[command(name = "rupee", author, version, about = "USD/LKR bank rate collector and API")]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Enabled banks, in ingestion order.
    #[arg(
        long,
        global = true,
        env = "RUPEE_BANKS",
        value_delimiter = ',',
        default_value = "SAMPATH"
    )]
    pub banks: Vec<String>,

    /// Per-bank extraction timeout in milliseconds.
    #[arg(long, global = true, env = "RUPEE_FETCH_TIMEOUT_MS", default_value_t = 10_000)]
    pub fetch_timeout_ms: u64,

    /// Timeout for each store operation in milliseconds.
    #[arg(long, global = true, env = "RUPEE_STORE_TIMEOUT_MS", default_value_t = 5_000)]
    pub store_timeout_ms: u64,

    /// Log output format (logs go to stderr).
    #[arg(long, global = true, env = "RUPEE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Pretty-print JSON written to stdout.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Observation store location. All three values are required.
#[derive(Debug, Clone, Default, Args)]
pub struct StoreArgs {
    /// DuckDB database file.
    #[arg(long, global = true, env = "RUPEE_DB_URI")]
    pub db_uri: Option<String>,

    /// Schema holding the observation table.
    #[arg(long, global = true, env = "RUPEE_DB_NAME")]
    pub db_name: Option<String>,

    /// Observation table name.
    #[arg(long, global = true, env = "RUPEE_DB_COLLECTION")]
    pub db_collection: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Fetch rates once and store them.
    Fetch(BankArgs),
    /// Fetch rates for every configured bank on a fixed interval.
    Watch(WatchArgs),
    /// Print the newest stored observation.
    Latest(BankArgs),
    /// Print stored observations for a period (week, month, year).
    History(HistoryArgs),
    /// Print the configured bank codes.
    Banks,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, env = "RUPEE_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: SocketAddr,
}

#[derive(Debug, Clone, Args)]
pub struct BankArgs {
    /// Bank code; omit for all configured banks.
    #[arg(long)]
    pub bank: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct HistoryArgs {
    #[arg(long)]
    pub bank: Option<String>,

    /// Unknown names fall back to `week`.
    #[arg(long, default_value = "week")]
    pub period: String,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    #[arg(long, env = "RUPEE_WATCH_INTERVAL_SECS", default_value_t = 3_600)]
    pub interval_secs: u64,
}
