//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Una [`Response`] acumula status, headers y body de un request y escribe
//! exactamente un mensaje HTTP en la conexión.
//!
//! ## Estados
//!
//! ```text
//! Building ──write_header()──▶ HeadersLocked ──flush()──▶ Sent
//!     └──────────────────────────flush()─────────────────────┘
//! ```
//!
//! - En `HeadersLocked` los cambios de status/headers se ignoran (con log).
//! - En `Sent` se ignora todo; los finalizadores (`send*`, `end`, `flush`)
//!   retornan [`ResponseError::AlreadySent`] sin escribir nada.
//!
//! ## Modos de escritura
//!
//! - **buffered** (por defecto): `write` agrega al buffer y el flush envía
//!   un solo mensaje con `Content-Length`.
//! - **chunked**: activo cuando `Transfer-Encoding` es exactamente
//!   `chunked`. Cada `write` sale al socket como `<hex>\r\n<data>\r\n`; la
//!   primera escritura envía antes la cabecera. El chunk final `0\r\n\r\n`
//!   no se agrega solo: se emite con un `write` vacío.
//!
//! ## Ejemplo
//!
//! ```
//! use std::net::{TcpListener, TcpStream};
//! use triehttp::http::{Response, StatusCode};
//!
//! let listener = TcpListener::bind("127.0.0.1:0").unwrap();
//! let _client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
//! let (stream, _) = listener.accept().unwrap();
//!
//! let mut response = Response::new(stream);
//! response
//!     .status(StatusCode::Ok)
//!     .set_header("Content-Type", "application/json");
//! response.send(r#"{"message": "Hello"}"#).unwrap();
//! assert!(response.is_sent());
//! ```

use super::connection::Connection;
use super::status::reason_phrase;
use super::Headers;
use serde::Serialize;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, warn};

/// Valor del header `Server` cuando el handler no pone uno
pub const SERVER_NAME: &str = concat!("triehttp/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_PROTOCOL: &str = "HTTP/1.1";

/// Errores que los finalizadores reportan al handler
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("response already sent")]
    AlreadySent,

    #[error("could not encode json: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("connection write failed: {0}")]
    Io(#[from] io::Error),
}

/// Estado de la respuesta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    Building,
    HeadersLocked,
    Sent,
}

/// Respuesta HTTP ligada a una conexión
pub struct Response {
    conn: Box<dyn Connection>,
    protocol: String,
    status: u16,
    /// Texto de razón explícito; si falta se busca en la tabla
    status_text: Option<String>,
    headers: Headers,
    body: Vec<u8>,
    state: ResponseState,
    /// La cabecera ya salió al socket (modo chunked)
    head_on_wire: bool,
}

impl Response {
    /// Crea una respuesta 200 vacía sobre la conexión dada
    pub fn new<C: Connection + 'static>(conn: C) -> Self {
        Self {
            conn: Box::new(conn),
            protocol: DEFAULT_PROTOCOL.to_string(),
            status: 200,
            status_text: None,
            headers: Headers::new(),
            body: Vec::new(),
            state: ResponseState::Building,
            head_on_wire: false,
        }
    }

    // === Mutadores de cabecera ===

    /// Cambia el código de estado
    ///
    /// El texto de razón vuelve a salir de la tabla de estados.
    pub fn status(&mut self, code: impl Into<u16>) -> &mut Self {
        let code = code.into();
        if self.head_is_mutable("status") {
            self.status = code;
            self.status_text = None;
        }
        self
    }

    /// Reemplaza el texto de razón de la línea de estado
    pub fn status_text(&mut self, text: impl Into<String>) -> &mut Self {
        if self.head_is_mutable("status_text") {
            self.status_text = Some(text.into());
        }
        self
    }

    /// Agrega o reemplaza un header
    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        if self.head_is_mutable(name) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Fija status y headers de una vez y bloquea la cabecera
    ///
    /// Después de esta llamada `status`, `status_text` y `set_header` no
    /// tienen efecto.
    pub fn write_header(&mut self, code: impl Into<u16>, headers: &[(&str, &str)]) {
        let code = code.into();
        if !self.head_is_mutable("write_header") {
            return;
        }
        for (name, value) in headers {
            self.headers.insert(*name, *value);
        }
        self.status = code;
        self.status_text = None;
        self.state = ResponseState::HeadersLocked;
    }

    // === Body ===

    /// Escribe bytes en el body
    ///
    /// En modo buffered solo acumula. En modo chunked emite un chunk de
    /// inmediato (un slice vacío emite el chunk terminal).
    /// Después del envío la escritura se descarta y retorna `Ok`.
    pub fn write(&mut self, data: &[u8]) -> Result<(), ResponseError> {
        if self.state == ResponseState::Sent {
            warn!(bytes = data.len(), "respuesta ya enviada; escritura descartada");
            return Ok(());
        }
        if self.is_chunked() {
            self.write_chunk(data)
        } else {
            self.body.extend_from_slice(data);
            Ok(())
        }
    }

    fn write_chunk(&mut self, data: &[u8]) -> Result<(), ResponseError> {
        let mut out = Vec::with_capacity(data.len() + 16);
        if !self.head_on_wire {
            out = self.serialize_head();
            self.head_on_wire = true;
            self.state = ResponseState::HeadersLocked;
        }
        encode_chunk(&mut out, data);
        self.conn.write_all(&out)?;
        self.conn.flush()?;
        Ok(())
    }

    // === Finalizadores ===

    /// Envía `body` como texto plano (si no había `Content-Type`)
    pub fn send(&mut self, body: impl AsRef<[u8]>) -> Result<(), ResponseError> {
        self.ensure_unsent()?;
        let body = body.as_ref();
        if !body.is_empty() {
            self.default_header("Content-Type", "text/plain");
        }
        self.body.extend_from_slice(body);
        self.flush()
    }

    /// Envía el contenido de un archivo; el `Content-Type` sale de la extensión
    pub fn send_file(&mut self, filename: &str, body: impl AsRef<[u8]>) -> Result<(), ResponseError> {
        self.ensure_unsent()?;
        self.default_header("Content-Type", content_type_for(filename));
        self.body.extend_from_slice(body.as_ref());
        self.flush()
    }

    /// Serializa `value` como JSON y lo envía
    ///
    /// Si la serialización falla, la respuesta queda intacta y el error
    /// vuelve al handler.
    pub fn send_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ResponseError> {
        self.ensure_unsent()?;
        let encoded = serde_json::to_vec(value)?;
        self.default_header("Content-Type", "application/json");
        self.body.extend_from_slice(&encoded);
        self.flush()
    }

    pub fn send_html(&mut self, body: impl AsRef<[u8]>) -> Result<(), ResponseError> {
        self.ensure_unsent()?;
        self.default_header("Content-Type", "text/html; charset=utf-8");
        self.body.extend_from_slice(body.as_ref());
        self.flush()
    }

    /// Envía lo que haya en el buffer
    pub fn end(&mut self) -> Result<(), ResponseError> {
        self.flush()
    }

    /// Serializa, escribe y cierra la conexión. Solo funciona una vez.
    pub fn flush(&mut self) -> Result<(), ResponseError> {
        self.ensure_unsent()?;
        self.state = ResponseState::Sent;

        let mut out = Vec::new();
        if !self.head_on_wire {
            out = self.serialize_head();
            self.head_on_wire = true;
        }
        if self.is_chunked() {
            if !self.body.is_empty() {
                encode_chunk(&mut out, &self.body);
            }
        } else {
            out.extend_from_slice(&self.body);
        }

        self.conn.write_all(&out)?;
        self.conn.flush()?;
        self.conn.close()?;
        debug!(status = self.status, bytes = out.len(), "respuesta enviada");
        Ok(())
    }

    // === Accesores ===

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn state(&self) -> ResponseState {
        self.state
    }

    pub fn is_sent(&self) -> bool {
        self.state == ResponseState::Sent
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Body acumulado (vacío en modo chunked salvo lo que quede por enviar)
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_chunked(&self) -> bool {
        self.headers.get("Transfer-Encoding") == Some("chunked")
    }

    // === Internos ===

    fn head_is_mutable(&self, what: &str) -> bool {
        match self.state {
            ResponseState::Building => true,
            ResponseState::HeadersLocked => {
                warn!(what, "cabecera bloqueada; cambio ignorado");
                false
            }
            ResponseState::Sent => {
                warn!(what, "respuesta ya enviada; cambio ignorado");
                false
            }
        }
    }

    fn ensure_unsent(&self) -> Result<(), ResponseError> {
        if self.state == ResponseState::Sent {
            warn!(status = self.status, "intento de enviar una respuesta dos veces");
            return Err(ResponseError::AlreadySent);
        }
        Ok(())
    }

    /// Header por defecto; ignora el bloqueo porque no viene del handler
    fn default_header(&mut self, name: &str, value: &str) {
        if !self.headers.contains(name) {
            self.headers.insert(name, value);
        }
    }

    /// Completa protocolo, status y headers obligatorios justo antes de serializar
    fn fill_defaults(&mut self) {
        if self.protocol.is_empty() {
            self.protocol = DEFAULT_PROTOCOL.to_string();
        }
        if self.status == 0 {
            self.status = 200;
        }
        if !self.headers.contains("Content-Length") && !self.is_chunked() {
            let length = self.body.len().to_string();
            self.headers.insert("Content-Length", length);
        }
        if !self.headers.contains("Date") {
            self.headers
                .insert("Date", httpdate::fmt_http_date(SystemTime::now()));
        }
        if !self.headers.contains("Server") {
            self.headers.insert("Server", SERVER_NAME);
        }
    }

    /// Línea de estado + headers + línea vacía
    fn serialize_head(&mut self) -> Vec<u8> {
        self.fill_defaults();

        let reason = self
            .status_text
            .as_deref()
            .unwrap_or_else(|| reason_phrase(self.status));
        let mut head = format!("{} {} {}\r\n", self.protocol, self.status, reason);
        for (name, value) in self.headers.iter() {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");
        head.into_bytes()
    }
}

/// `<len hex>\r\n<data>\r\n`
fn encode_chunk(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(format!("{:x}\r\n", data.len()).as_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
}

/// Tipo MIME según la extensión del archivo
///
/// ```
/// use triehttp::http::response::content_type_for;
///
/// assert_eq!(content_type_for("index.HTML"), "text/html");
/// assert_eq!(content_type_for("data"), "application/octet-stream");
/// ```
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "xml" => "application/xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}
