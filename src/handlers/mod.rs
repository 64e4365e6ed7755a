//! # Rutas de la Aplicación
//! src/handlers/mod.rs
//!
//! Handlers de ejemplo y la función que arma el router del servidor.
//!
//! | Método | Path               | Handler                  |
//! |--------|--------------------|--------------------------|
//! | GET    | `/`                | [`root_handler`]         |
//! | GET    | `/ping`            | [`ping_handler`]         |
//! | GET    | `/echo/:id`        | [`echo_handler`]         |
//! | GET    | `/user-agent`      | [`user_agent_handler`]   |
//! | GET    | `/files/:filename` | [`FileRoutes::read`]     |
//! | POST   | `/files/:filename` | [`FileRoutes::write`]    |
//!
//! Las rutas `/files` solo se registran si hay `--directory`.

pub mod access_log;
pub mod basic;
pub mod files;

pub use access_log::access_log;
pub use basic::*;
pub use files::FileRoutes;

use crate::config::Config;
use crate::router::{RouteError, Router};
use std::sync::Arc;
use tracing::info;

/// Construye el router completo a partir de la configuración
pub fn routes(config: &Config) -> Result<Router, RouteError> {
    let mut builder = Router::builder();

    builder
        .get("/", root_handler)?
        .get("/ping", ping_handler)?
        .get("/echo/:id", echo_handler)?
        .get("/user-agent", user_agent_handler)?;

    match &config.directory {
        Some(directory) => {
            let files = Arc::new(FileRoutes::new(directory));
            let reader = Arc::clone(&files);
            builder
                .get("/files/:filename", move |req, res| reader.read(req, res))?
                .post("/files/:filename", move |req, res| files.write(req, res))?;
            info!(directory = %directory.display(), "rutas /files habilitadas");
        }
        None => info!("sin --directory: rutas /files deshabilitadas"),
    }

    builder.attach_middleware("/", access_log);
    Ok(builder.build())
}
