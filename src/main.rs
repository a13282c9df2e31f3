use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

mod config;
mod error;
mod migrate;
mod records;
mod report;
mod telemetry;

use config::Config;
use migrate::fetch::HttpDownloader;
use records::MySqlStore;

#[derive(Parser)]
#[command(name = "url-migrate", about = "Copy URL-referenced files to local disk and repoint the table at them")]
struct Cli {
    /// Env file with connection, table and storage settings (default: .env if present)
    #[arg(long)]
    env_file: Option<PathBuf>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Only list the records that would be migrated
    #[arg(long, default_value_t = false)]
    plan: bool,
    #[arg(long, default_value_t = 10)]
    plan_limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);
    config::load_env_file(cli.env_file.as_deref())?;
    telemetry::config::init_tracing();

    let cfg = Config::from_env().context("load configuration")?;

    let pool = records::connect(&cfg.db).await?;
    let store = MySqlStore::new(pool, cfg.table.clone(), cfg.selection_mode);
    let downloader = HttpDownloader::new(&cfg.http)?;

    migrate::run(&cfg, &store, &downloader, migrate::RunOptions { plan: cli.plan, plan_limit: cli.plan_limit }).await
}
