//! # Handlers Básicos
//! src/handlers/basic.rs
//!
//! - `GET /`: 200 con body `cool`
//! - `GET /ping`: devuelve los headers recibidos
//! - `GET /echo/:id`: devuelve el parámetro capturado
//! - `GET /user-agent`: devuelve el header `User-Agent`

use crate::http::{Request, Response, StatusCode};
use crate::router::HandlerResult;

/// Handler para `/`
pub fn root_handler(_req: &Request, res: &mut Response) -> HandlerResult {
    res.status(StatusCode::Ok).send("cool")
}

/// Handler para `/ping`
///
/// Una línea `Name: Value\r\n` por header, en el orden en que llegaron.
pub fn ping_handler(req: &Request, res: &mut Response) -> HandlerResult {
    let mut body = String::new();
    for (name, value) in req.headers().iter() {
        body.push_str(name);
        body.push_str(": ");
        body.push_str(value);
        body.push_str("\r\n");
    }
    res.send(body)
}

/// Handler para `/echo/:id`
pub fn echo_handler(req: &Request, res: &mut Response) -> HandlerResult {
    let Some(id) = req.param("id") else {
        return res
            .status(StatusCode::InternalServerError)
            .send("Could not find param 'id'");
    };

    res.status(StatusCode::Ok)
        .set_header("Content-Type", "text/plain");
    res.send(id)
}

/// Handler para `/user-agent`
pub fn user_agent_handler(req: &Request, res: &mut Response) -> HandlerResult {
    res.status(StatusCode::Ok)
        .set_header("Content-Type", "text/plain");
    res.send(req.user_agent())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::connection::testing::MemoryConnection;

    fn run(handler: fn(&Request, &mut Response) -> HandlerResult, raw: &[u8]) -> String {
        let conn = MemoryConnection::default();
        let mut res = Response::new(conn.clone());
        let req = Request::parse(raw).unwrap();
        handler(&req, &mut res).unwrap();
        conn.text()
    }

    #[test]
    fn test_root_handler() {
        let text = run(root_handler, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Length: 4\r\n"));
        assert!(text.ends_with("\r\n\r\ncool"));
    }

    #[test]
    fn test_ping_echoes_headers_in_order() {
        let text = run(
            ping_handler,
            b"GET /ping HTTP/1.1\r\nHost: x\r\nAccept: */*\r\nX-Trace: 9\r\n\r\n",
        );
        assert!(text.ends_with("\r\n\r\nHost: x\r\nAccept: */*\r\nX-Trace: 9\r\n"));
    }

    #[test]
    fn test_echo_without_param() {
        // Sin pasar por el router no hay parámetros
        let text = run(echo_handler, b"GET /echo/abc HTTP/1.1\r\nHost: x\r\n\r\n");
        assert!(text.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[test]
    fn test_user_agent() {
        let text = run(
            user_agent_handler,
            b"GET /user-agent HTTP/1.1\r\nHost: x\r\nUser-Agent: foobar/1.2.3\r\n\r\n",
        );
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 12\r\n"));
        assert!(text.ends_with("\r\n\r\nfoobar/1.2.3"));
    }
}
