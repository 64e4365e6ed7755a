//! # Handlers de Archivos
//! src/handlers/files.rs
//!
//! - `GET /files/:filename`: lee `<root>/<filename>`
//! - `POST /files/:filename`: escribe el body del request en `<root>/<filename>`
//!
//! El nombre se une al directorio raíz tal cual llega: no se sanea `..` ni
//! rutas absolutas. Quien exponga estas rutas debe agregar esa validación.

use crate::http::{Request, Response, StatusCode};
use crate::router::HandlerResult;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Rutas de archivos sobre un directorio raíz
#[derive(Debug, Clone)]
pub struct FileRoutes {
    root: PathBuf,
}

impl FileRoutes {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Handler para `GET /files/:filename`
    ///
    /// NotFound → 404, cualquier otro error de I/O → 500.
    pub fn read(&self, req: &Request, res: &mut Response) -> HandlerResult {
        let Some(filename) = req.param("filename") else {
            return res
                .status(StatusCode::InternalServerError)
                .send("Could not find param 'filename'");
        };

        let full_path = self.root.join(filename);
        match fs::read(&full_path) {
            Ok(data) => {
                debug!(path = %full_path.display(), bytes = data.len(), "archivo leído");
                res.set_header("Content-Type", "application/octet-stream");
                res.send_file(filename, data)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                res.status(StatusCode::NotFound).send("File not found")
            }
            Err(e) => {
                error!(path = %full_path.display(), error = %e, "no se pudo leer el archivo");
                res.status(StatusCode::InternalServerError)
                    .send("Internal server error")
            }
        }
    }

    /// Handler para `POST /files/:filename`; 201 sin body si todo sale bien
    pub fn write(&self, req: &Request, res: &mut Response) -> HandlerResult {
        let Some(filename) = req.param("filename") else {
            return res
                .status(StatusCode::InternalServerError)
                .send("Could not find param 'filename'");
        };

        let full_path = self.root.join(filename);
        match fs::write(&full_path, req.body()) {
            Ok(()) => {
                debug!(path = %full_path.display(), bytes = req.body().len(), "archivo escrito");
                res.status(StatusCode::Created).end()
            }
            Err(e) => {
                error!(path = %full_path.display(), error = %e, "no se pudo escribir el archivo");
                res.status(StatusCode::InternalServerError)
                    .send("Internal server error")
            }
        }
    }
}
