//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing` con un filtro por nivel y salida de texto.
//! `RUST_LOG` tiene prioridad sobre el nivel configurado.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Instala el subscriber global
///
/// Si ya había uno instalado (por ejemplo en tests) no hace nada.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("triehttp={}", level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
