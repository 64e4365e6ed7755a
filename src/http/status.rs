//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Tabla fija de códigos de estado que conoce el servidor. La respuesta
//! guarda el código como número (`u16`), así que cualquier código es válido
//! en el cable; esta tabla solo aporta el texto de razón.
//!
//! - **2xx**: Éxito (200, 201, 202, 204)
//! - **3xx**: Redirección (301, 302, 304)
//! - **4xx**: Error del cliente (400, 401, 403, 404, 405, 408, 409, 413, 422)
//! - **5xx**: Error del servidor (500, 501, 502, 503)

/// Texto usado cuando el código no está en la tabla
pub const UNKNOWN_REASON: &str = "Unknown";

/// Códigos de estado HTTP con texto de razón conocido
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,
    /// 201 Created - Recurso creado (POST /files/:filename)
    Created = 201,
    Accepted = 202,
    /// 204 No Content - Petición exitosa sin contenido en el body
    NoContent = 204,

    MovedPermanently = 301,
    Found = 302,
    NotModified = 304,

    /// 400 Bad Request - Request malformado
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    /// 404 Not Found - Ruta o recurso no encontrado
    NotFound = 404,
    MethodNotAllowed = 405,
    RequestTimeout = 408,
    Conflict = 409,
    /// 413 Payload Too Large - Content-Length por encima del límite configurado
    PayloadTooLarge = 413,
    UnprocessableEntity = 422,

    /// 500 Internal Server Error - Error interno del servidor
    InternalServerError = 500,
    NotImplemented = 501,
    BadGateway = 502,
    ServiceUnavailable = 503,
}

impl StatusCode {
    const ALL: [StatusCode; 20] = [
        StatusCode::Ok,
        StatusCode::Created,
        StatusCode::Accepted,
        StatusCode::NoContent,
        StatusCode::MovedPermanently,
        StatusCode::Found,
        StatusCode::NotModified,
        StatusCode::BadRequest,
        StatusCode::Unauthorized,
        StatusCode::Forbidden,
        StatusCode::NotFound,
        StatusCode::MethodNotAllowed,
        StatusCode::RequestTimeout,
        StatusCode::Conflict,
        StatusCode::PayloadTooLarge,
        StatusCode::UnprocessableEntity,
        StatusCode::InternalServerError,
        StatusCode::NotImplemented,
        StatusCode::BadGateway,
        StatusCode::ServiceUnavailable,
    ];

    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use triehttp::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Busca el código en la tabla
    ///
    /// ```
    /// use triehttp::http::StatusCode;
    /// assert_eq!(StatusCode::from_u16(404), Some(StatusCode::NotFound));
    /// assert_eq!(StatusCode::from_u16(299), None);
    /// ```
    pub fn from_u16(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_u16() == code)
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NoContent => "No Content",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::Conflict => "Conflict",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::UnprocessableEntity => "Unprocessable Entity",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::BadGateway => "Bad Gateway",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }
}

/// Texto de razón para un código numérico arbitrario
///
/// Los códigos fuera de la tabla retornan `"Unknown"`.
///
/// ```
/// use triehttp::http::status::reason_phrase;
/// assert_eq!(reason_phrase(201), "Created");
/// assert_eq!(reason_phrase(799), "Unknown");
/// ```
pub fn reason_phrase(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .map(|s| s.reason_phrase())
        .unwrap_or(UNKNOWN_REASON)
}

impl From<StatusCode> for u16 {
    fn from(status: StatusCode) -> u16 {
        status.as_u16()
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
