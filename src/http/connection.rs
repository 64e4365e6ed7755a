//! # Conexión de salida
//! src/http/connection.rs
//!
//! Lado de escritura de una conexión. La respuesta es dueña exclusiva de él
//! durante un request y lo cierra después del flush.

use std::io::{self, Write};
use std::net::{Shutdown, TcpStream};

/// Destino de una respuesta: un stream escribible que se puede cerrar
pub trait Connection: Write + Send {
    /// Cierra la conexión; no habrá más escrituras
    fn close(&mut self) -> io::Result<()>;
}

impl Connection for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            // El peer ya se fue; no hay nada más que cerrar
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}
