//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Convierte el buffer leído del socket en un [`Request`] estructurado.
//!
//! ## Formato
//!
//! ```text
//! POST /files/a.txt HTTP/1.1\r\n
//! Host: localhost:4221\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hello
//! ```
//!
//! ## Algoritmo
//!
//! 1. Separar el buffer en la primera frontera `\r\n\r\n` (cabecera / body).
//! 2. La primera línea que empiece con un método conocido seguido de espacio
//!    define método y path.
//! 3. El resto de líneas `Name: Value` van al mapa de headers (gana la última).
//! 4. `Host`, `User-Agent`, `Content-Type` y `Content-Length` se copian
//!    también a campos dedicados.
//!
//! El body son exactamente los bytes después de la frontera; no se valida
//! contra `Content-Length` ni se decodifica chunked.

use super::Headers;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Frontera entre cabecera y body
const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Métodos HTTP reconocidos por el parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    HEAD,
}

impl Method {
    /// Todos los tokens que el parser intenta reconocer
    pub const ALL: [Method; 7] = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::PATCH,
        Method::OPTIONS,
        Method::HEAD,
    ];

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::OPTIONS => "OPTIONS",
            Method::HEAD => "HEAD",
        }
    }
}

impl FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ParseError::UnsupportedMethod(s.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errores de parsing
///
/// Todas las variantes pertenecen a la clase "MalformedRequest": el servidor
/// responde siempre `400 Bad Request` antes de cerrar la conexión.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No hay `\r\n\r\n` en el buffer
    #[error("malformed request: missing blank line after head")]
    MissingHeadTerminator,

    /// Ninguna línea empieza con un método conocido
    #[error("malformed request: no request line with a recognized method")]
    MissingRequestLine,

    #[error("malformed request: unsupported method {0}")]
    UnsupportedMethod(String),

    #[error("malformed request: empty path")]
    EmptyPath,

    #[error("malformed request: missing Host header")]
    MissingHost,
}

/// Request HTTP parseado
///
/// Se crea una vez por conexión. Solo el router lo modifica, para llenar
/// los parámetros de path.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    host: String,
    user_agent: String,
    content_type: Option<String>,
    content_length: Option<usize>,
    headers: Headers,
    body: Vec<u8>,
    segments: Vec<String>,
    params: HashMap<String, String>,
}

impl Request {
    /// Parsea un request desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use triehttp::http::{Method, Request};
    ///
    /// let raw = b"GET /echo/abc HTTP/1.1\r\nHost: x\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::GET);
    /// assert_eq!(request.path(), "/echo/abc");
    /// assert_eq!(request.segments(), ["echo", "abc"]);
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let boundary =
            find_head_end(buffer).ok_or(ParseError::MissingHeadTerminator)?;
        let head = String::from_utf8_lossy(&buffer[..boundary]);
        let body = buffer[boundary + HEAD_TERMINATOR.len()..].to_vec();

        let mut request_line: Option<(Method, String)> = None;
        let mut headers = Headers::new();
        let mut host = String::new();
        let mut user_agent = String::new();
        let mut content_type = None;
        let mut content_length = None;

        for line in head.lines() {
            if request_line.is_none() {
                if let Some(parsed) = Self::parse_request_line(line) {
                    request_line = Some(parsed);
                    continue;
                }
            }

            let Some((name, value)) = line.split_once(':') else {
                debug!(line, "línea de cabecera sin ':' ignorada");
                continue;
            };
            let name = name.trim();
            let value = value.trim();

            if name.eq_ignore_ascii_case("Host") {
                host = value.to_string();
            } else if name.eq_ignore_ascii_case("User-Agent") {
                user_agent = value.to_string();
            } else if name.eq_ignore_ascii_case("Content-Type") {
                content_type = Some(value.to_string());
            } else if name.eq_ignore_ascii_case("Content-Length") {
                content_length = match value.parse::<usize>() {
                    Ok(n) => Some(n),
                    Err(e) => {
                        warn!(value, error = %e, "Content-Length inválido, se ignora");
                        None
                    }
                };
            }

            headers.insert(name, value);
        }

        let (method, path) = request_line.ok_or(ParseError::MissingRequestLine)?;
        if path.is_empty() {
            return Err(ParseError::EmptyPath);
        }
        if host.is_empty() {
            return Err(ParseError::MissingHost);
        }

        let segments = split_path(&path);

        Ok(Request {
            method,
            path,
            host,
            user_agent,
            content_type,
            content_length,
            headers,
            body,
            segments,
            params: HashMap::new(),
        })
    }

    /// Reconoce `<METHOD> <PATH> ...`
    ///
    /// Retorna `None` si la línea no empieza con un método conocido
    /// seguido de un espacio.
    fn parse_request_line(line: &str) -> Option<(Method, String)> {
        let method = Method::ALL.iter().copied().find(|m| {
            line.strip_prefix(m.as_str())
                .is_some_and(|rest| rest.starts_with(' '))
        })?;
        let path = line
            .split(' ')
            .nth(1)
            .map(|p| p.trim().to_string())
            .unwrap_or_default();
        Some((method, path))
    }

    // === Accesores ===

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// `None` si faltaba o no era un entero válido
    pub fn content_length(&self) -> Option<usize> {
        self.content_length
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Segmentos del path, sin los `/` de los extremos
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Parámetros extraídos por el router
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Obtiene un parámetro de path específico
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}

/// Posición donde empieza `\r\n\r\n`, si existe
pub(crate) fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
}

/// Divide un path en segmentos
///
/// Los `/` de los extremos se ignoran; los segmentos vacíos intermedios
/// (`/a//b`) se conservan como literales vacíos.
///
/// ```
/// use triehttp::http::request::split_path;
///
/// assert!(split_path("/").is_empty());
/// assert_eq!(split_path("/files/a.txt/"), ["files", "a.txt"]);
/// ```
pub fn split_path(path: &str) -> Vec<String> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').map(str::to_string).collect()
}
