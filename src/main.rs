use anyhow::{Context, Result};
use log::info;
use std::env;

use timetable_solver::{config, server};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config(env::args().nth(1))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level()))
        .init();
    let search = config.search_config();
    let limits = config.limits();
    info!("Search settings: {search:?}, request limits: {limits:?}");

    let bind_address = config.bind_address();
    server::run_server(&bind_address, search, limits)
        .await
        .with_context(|| format!("server on {bind_address} failed"))
}
