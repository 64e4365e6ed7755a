//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Servidor TCP que:
//! 1. Escucha en `host:port`
//! 2. Acepta conexiones y lanza un thread por cada una
//! 3. Lee y parsea el request, lo pasa al router
//! 4. Envía la respuesta y cierra la conexión (sin keep-alive)

pub mod tcp;

// Re-exportar para facilitar el uso
pub use tcp::{handle_connection, Server};
