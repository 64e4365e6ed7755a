//! # Cadena de Middleware
//! src/router/middleware.rs
//!
//! Composición tipo cebolla con continuación explícita. Cada middleware
//! recibe un [`Next`] y decide si llamarlo y cuándo:
//!
//! ```text
//! root_mw ─▶ api_mw ─▶ leaf_mw ─▶ handler
//!    ◀──────────◀──────────◀─────────┘
//! ```
//!
//! `Next` avanza por un slice ordenado (raíz → hoja); no se arma una cadena
//! de closures anidadas por request.

use crate::http::{Request, Response, ResponseError};
use std::sync::Arc;

/// Resultado de un handler o middleware
pub type HandlerResult = Result<(), ResponseError>;

/// Handler final de una ruta
pub type Handler = Arc<dyn Fn(&Request, &mut Response) -> HandlerResult + Send + Sync>;

/// Middleware con continuación explícita
pub type Middleware =
    Arc<dyn Fn(&Request, &mut Response, Next<'_>) -> HandlerResult + Send + Sync>;

/// Resto de la cadena a partir del middleware actual
pub struct Next<'a> {
    chain: &'a [Middleware],
    handler: &'a Handler,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [Middleware], handler: &'a Handler) -> Self {
        Self { chain, handler }
    }

    /// Ejecuta el siguiente eslabón (o el handler si ya no quedan middleware)
    ///
    /// No llamarlo corta la cadena: ni los middleware más profundos ni el
    /// handler se ejecutan.
    pub fn run(self, request: &Request, response: &mut Response) -> HandlerResult {
        match self.chain.split_first() {
            Some((current, rest)) => current(request, response, Next::new(rest, self.handler)),
            None => (self.handler)(request, response),
        }
    }

    /// Middleware que faltan antes del handler
    pub fn remaining(&self) -> usize {
        self.chain.len()
    }
}
