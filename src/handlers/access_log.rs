//! # Access log
//! src/handlers/access_log.rs
//!
//! Middleware que envuelve toda la cadena en un span `request` y registra
//! método, path, status y latencia al volver.

use crate::http::{Request, Response};
use crate::router::{HandlerResult, Next};
use std::time::Instant;
use tracing::{info, info_span};

pub fn access_log(req: &Request, res: &mut Response, next: Next<'_>) -> HandlerResult {
    let span = info_span!("request", method = %req.method(), path = req.path());
    let _guard = span.enter();

    let start = Instant::now();
    let result = next.run(req, res);

    info!(
        status = res.status_code(),
        sent = res.is_sent(),
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "request atendido"
    );
    result
}
