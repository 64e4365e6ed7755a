//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Router basado en un trie de segmentos con parámetros (`/echo/:id`) y
//! middleware por path.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router::lookup → [middleware raíz … middleware hoja] → Handler → Response
//! ```
//!
//! Hay dos fases separadas por tipos:
//! - [`RouterBuilder`]: registro de rutas y middleware (mutable)
//! - [`Router`]: solo lectura, compartido entre threads con `Arc`
//!
//! Así el registro nunca compite con las búsquedas del servidor.

pub mod middleware;
pub mod trie;

pub use middleware::{Handler, HandlerResult, Middleware, Next};
pub use trie::RouteMatch;

use crate::http::request::split_path;
use crate::http::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use trie::RouteNode;

/// Body fijo de las respuestas 404 del router
pub const NOT_FOUND_BODY: &str = "page not found";

/// Errores de registro de rutas
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Un nodo admite un solo hijo paramétrico
    #[error("route {pattern}: parameter :{requested} conflicts with :{existing} at the same position")]
    ConflictingParam {
        pattern: String,
        existing: String,
        requested: String,
    },
}

/// Fase de registro del router
///
/// # Ejemplo
/// ```
/// use triehttp::router::Router;
///
/// let mut builder = Router::builder();
/// builder
///     .get("/echo/:id", |req, res| {
///         res.send(req.param("id").unwrap_or_default())
///     })
///     .unwrap();
/// let router = builder.build();
///
/// let route = router.lookup(triehttp::http::Method::GET, &["echo", "abc"]);
/// assert!(route.found);
/// assert_eq!(route.params["id"], "abc");
/// ```
#[derive(Default)]
pub struct RouterBuilder {
    root: RouteNode,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra `handler` para `method` en `pattern`
    ///
    /// Varios métodos pueden convivir en el mismo path; registrar dos veces
    /// el mismo método reemplaza el handler anterior.
    pub fn route<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        let segments = split_path(pattern);
        self.root
            .insert(pattern, &segments, method, Arc::new(handler))?;
        debug!(%method, pattern, "ruta registrada");
        Ok(self)
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::POST, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::PUT, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::DELETE, pattern, handler)
    }

    /// Adjunta un middleware al nodo de `path`
    ///
    /// No crea nodos: si el path no existe todavía no hace nada y retorna
    /// `false`. Los middleware de un mismo nodo corren en orden de adjunción.
    pub fn attach_middleware<F>(&mut self, path: &str, middleware: F) -> bool
    where
        F: Fn(&Request, &mut Response, Next<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        let segments = split_path(path);
        match self.root.find_mut(&segments) {
            Some(node) => {
                node.push_middleware(Arc::new(middleware));
                debug!(path, "middleware adjuntado");
                true
            }
            None => {
                warn!(path, "no existe el nodo; middleware no adjuntado");
                false
            }
        }
    }

    /// Cierra la fase de registro
    pub fn build(self) -> Router {
        Router { root: self.root }
    }
}

/// Router de solo lectura
pub struct Router {
    root: RouteNode,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Busca `method` sobre los segmentos ya separados del path
    pub fn lookup<S: AsRef<str>>(&self, method: Method, segments: &[S]) -> RouteMatch {
        self.root.lookup(method, segments)
    }

    /// Resuelve el request y ejecuta middleware + handler sobre `response`
    ///
    /// - Sin ruta: 404 con [`NOT_FOUND_BODY`].
    /// - Con ruta: los parámetros se copian al request y corre la cadena.
    ///   Los errores del handler solo se registran en el log.
    /// - Si nadie envió la respuesta, se envía tal como quedó.
    pub fn dispatch(&self, request: &mut Request, response: &mut Response) {
        let route = self.lookup(request.method(), request.segments());

        let handler = match route.handler {
            Some(handler) if route.found => handler,
            _ => {
                debug!(method = %request.method(), path = request.path(), "ruta no encontrada");
                if let Err(e) = response.status(StatusCode::NotFound).send(NOT_FOUND_BODY) {
                    warn!(error = %e, "no se pudo enviar el 404");
                }
                return;
            }
        };

        request.set_params(route.params);
        let request: &Request = request;

        if let Err(e) = Next::new(&route.middlewares, &handler).run(request, response) {
            warn!(method = %request.method(), path = request.path(), error = %e, "el handler retornó un error");
        }

        if !response.is_sent() {
            if let Err(e) = response.end() {
                warn!(error = %e, "no se pudo enviar la respuesta");
            }
        }
    }
}
