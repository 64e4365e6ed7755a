//! # Módulo HTTP
//!
//! Implementa la parte de protocolo HTTP/1.1 que necesita el servidor, sin
//! librerías de alto nivel:
//!
//! - Parsing de requests desde bytes crudos
//! - Headers ordenados por inserción
//! - Tabla de códigos de estado
//! - Respuestas con envío único, modo buffered o chunked
//!
//! ### Formato de Request
//!
//! ```text
//! GET /echo/abc HTTP/1.1\r\n
//! Host: localhost:4221\r\n
//! User-Agent: curl/8.4.0\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 3\r\n
//! Date: Sun, 18 Oct 2026 10:00:00 GMT\r\n
//! Server: triehttp/0.1.0\r\n
//! \r\n
//! abc
//! ```
//!
//! No hay keep-alive: cada conexión atiende un request y se cierra.

pub mod connection;
pub mod headers;
pub mod request;
pub mod response;
pub mod status;

pub use connection::Connection;
pub use headers::Headers;
pub use request::{Method, ParseError, Request};
pub use response::{Response, ResponseError, ResponseState};
pub use status::StatusCode;
