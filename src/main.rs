//! Game server (default binary).
//!
//! Listens on `CONNECT4_HOST:CONNECT4_PORT` (default `0.0.0.0:8004`) and runs
//! until stopped. See `connect4::server` for the environment variables.

use anyhow::Result;
use log::info;

use connect4::server::{check_tcp_listen_available, run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    colog::init();

    let config = ServerConfig::from_env();
    check_tcp_listen_available(&config.host, config.port).map_err(|e| {
        anyhow::anyhow!("cannot listen on {}:{}: {}", config.host, config.port, e)
    })?;

    info!("Server started at port {}", config.port);
    run_server(config, None).await
}
