//! # triehttp - Entry Point
//! src/main.rs
//!
//! Lee la configuración, arma el router y bloquea en el loop de accept.

use std::error::Error;
use tracing::{error, info};
use triehttp::config::Config;
use triehttp::server::Server;
use triehttp::{handlers, logging};

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::new();
    logging::init(&config.log_level);

    if let Err(e) = config.validate() {
        error!(error = %e, "configuración inválida");
        return Err(e.into());
    }

    info!(
        host = %config.host,
        port = config.port,
        directory = ?config.directory,
        read_timeout_ms = config.read_timeout_ms,
        max_body_bytes = config.max_body_bytes,
        "iniciando triehttp"
    );

    let router = handlers::routes(&config)?;
    let server = Server::bind(config, router)?;
    server.run()?;

    Ok(())
}
