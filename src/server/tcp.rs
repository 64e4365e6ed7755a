//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Un thread por conexión. Cada thread hace, en orden:
//! leer request → parsear → router → handler → flush → cerrar.
//!
//! ## Lectura del request
//!
//! No se confía en una sola lectura: se lee hasta ver `\r\n\r\n` (con tope
//! `max_head_bytes`) y después exactamente `Content-Length` bytes más (con
//! tope `max_body_bytes`).
//!
//! ## Contrato de errores
//!
//! | Situación                              | Respuesta            |
//! |----------------------------------------|----------------------|
//! | el peer cierra sin mandar nada         | ninguna              |
//! | request malformado / cabecera cortada  | 400 `Bad Request: …` |
//! | cabecera más grande que el límite      | 400                  |
//! | `Content-Length` mayor que el límite   | 413                  |
//! | timeout con datos parciales            | 408                  |
//! | timeout sin datos                      | ninguna              |

use crate::config::{Config, ConnectionLimits};
use crate::http::request::find_head_end;
use crate::http::{Request, Response, StatusCode};
use crate::router::Router;
use std::io::{self, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

/// Servidor HTTP/1.1: un listener y un router ya construido
pub struct Server {
    config: Config,
    router: Arc<Router>,
    listener: TcpListener,
}

impl Server {
    /// Abre el listener en `config.address()`
    ///
    /// El router llega terminado: no se puede registrar nada mientras el
    /// servidor atiende conexiones.
    pub fn bind(config: Config, router: Router) -> io::Result<Self> {
        let address = config.address();
        let listener = TcpListener::bind(&address)?;
        info!(%address, "servidor escuchando");

        Ok(Self {
            config,
            router: Arc::new(router),
            listener,
        })
    }

    /// Dirección real del listener (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Loop de accept; bloquea el thread actual
    pub fn run(&self) -> io::Result<()> {
        let limits = self.config.connection_limits();
        info!("modo concurrente: un thread por conexión");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let router = Arc::clone(&self.router);
                    let peer = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());
                    debug!(%peer, "nueva conexión");

                    thread::spawn(move || {
                        if let Err(e) = handle_connection(stream, &router, limits) {
                            warn!(%peer, error = %e, "error en la conexión");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "error al aceptar conexión");
                }
            }
        }

        Ok(())
    }
}

/// Resultado de leer un request del socket
#[derive(Debug, PartialEq, Eq)]
enum ReadOutcome {
    /// El peer cerró sin mandar nada
    Empty,
    /// Cabecera completa y body según `Content-Length`
    Complete(Vec<u8>),
    /// El peer cerró antes de terminar la cabecera
    Incomplete(Vec<u8>),
    HeadTooLarge,
    BodyTooLarge(usize),
    /// Timeout; `true` si alcanzó a llegar algo
    TimedOut(bool),
}

/// Atiende una conexión completa
pub fn handle_connection(stream: TcpStream, router: &Router, limits: ConnectionLimits) -> io::Result<()> {
    stream.set_read_timeout(limits.read_timeout)?;
    stream.set_write_timeout(limits.write_timeout)?;
    let mut reader = stream.try_clone()?;

    let raw = match read_request(&mut reader, &limits)? {
        ReadOutcome::Empty => {
            debug!("conexión cerrada sin datos");
            return Ok(());
        }
        ReadOutcome::TimedOut(false) => {
            debug!("timeout de lectura sin datos");
            return Ok(());
        }
        ReadOutcome::TimedOut(true) => {
            warn!("timeout de lectura con request parcial");
            reply(stream, StatusCode::RequestTimeout, "Request Timeout");
            return Ok(());
        }
        ReadOutcome::HeadTooLarge => {
            warn!(limit = limits.max_head_bytes, "cabecera demasiado grande");
            let body = format!("Bad Request: request head exceeds {} bytes", limits.max_head_bytes);
            reply(stream, StatusCode::BadRequest, &body);
            return Ok(());
        }
        ReadOutcome::BodyTooLarge(declared) => {
            warn!(declared, limit = limits.max_body_bytes, "body demasiado grande");
            reply(stream, StatusCode::PayloadTooLarge, "Payload Too Large");
            return Ok(());
        }
        ReadOutcome::Complete(raw) | ReadOutcome::Incomplete(raw) => raw,
    };
    debug!(bytes = raw.len(), "request leído");

    let mut response = Response::new(stream);
    match Request::parse(&raw) {
        Ok(mut request) => {
            debug!(method = %request.method(), path = request.path(), "request parseado");
            router.dispatch(&mut request, &mut response);
        }
        Err(e) => {
            warn!(error = %e, "request malformado");
            if let Err(e) = response
                .status(StatusCode::BadRequest)
                .send(format!("Bad Request: {}", e))
            {
                warn!(error = %e, "no se pudo enviar el 400");
            }
        }
    }

    Ok(())
}

/// Respuesta de texto plano fuera del router
fn reply(stream: TcpStream, status: StatusCode, body: &str) {
    let mut response = Response::new(stream);
    if let Err(e) = response.status(status).send(body) {
        warn!(status = status.as_u16(), error = %e, "no se pudo enviar la respuesta");
    }
}

/// Lee cabecera y body del socket
fn read_request<R: Read>(reader: &mut R, limits: &ConnectionLimits) -> io::Result<ReadOutcome> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 4096];

    // 1. Cabecera
    let head_end = loop {
        if let Some(pos) = find_head_end(&buffer) {
            if pos > limits.max_head_bytes {
                return Ok(ReadOutcome::HeadTooLarge);
            }
            break pos;
        }
        if buffer.len() > limits.max_head_bytes {
            return Ok(ReadOutcome::HeadTooLarge);
        }

        match read_some(reader, &mut chunk)? {
            Some(0) if buffer.is_empty() => return Ok(ReadOutcome::Empty),
            Some(0) => return Ok(ReadOutcome::Incomplete(buffer)),
            Some(n) => buffer.extend_from_slice(&chunk[..n]),
            None => return Ok(ReadOutcome::TimedOut(!buffer.is_empty())),
        }
    };

    // 2. Body
    let Some(declared) = declared_content_length(&buffer[..head_end]) else {
        return Ok(ReadOutcome::Complete(buffer));
    };
    if declared > limits.max_body_bytes {
        return Ok(ReadOutcome::BodyTooLarge(declared));
    }

    let wanted = head_end + 4 + declared;
    while buffer.len() < wanted {
        match read_some(reader, &mut chunk)? {
            // El peer cerró antes; el parser no valida el largo del body
            Some(0) => break,
            Some(n) => buffer.extend_from_slice(&chunk[..n]),
            None => return Ok(ReadOutcome::TimedOut(true)),
        }
    }
    buffer.truncate(wanted);

    Ok(ReadOutcome::Complete(buffer))
}

/// Una lectura; `None` si venció el timeout
fn read_some<R: Read>(reader: &mut R, chunk: &mut [u8]) -> io::Result<Option<usize>> {
    loop {
        match reader.read(chunk) {
            Ok(n) => return Ok(Some(n)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Ok(None)
            }
            Err(e) => return Err(e),
        }
    }
}

/// `Content-Length` de la cabecera, si está y es un entero válido
///
/// Con varias líneas gana la última, igual que en `Request::parse`.
fn declared_content_length(head: &[u8]) -> Option<usize> {
    String::from_utf8_lossy(head)
        .lines()
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("Content-Length")
                .then(|| value.trim().to_string())
        })
        .last()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::HandlerResult;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::net::Shutdown;
    use std::time::Duration;

    /// Reader que entrega el request en pedazos
    struct Pieces(VecDeque<Vec<u8>>);

    impl Read for Pieces {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(piece) => {
                    let n = piece.len().min(buf.len());
                    buf[..n].copy_from_slice(&piece[..n]);
                    if n < piece.len() {
                        self.0.push_front(piece[n..].to_vec());
                    }
                    Ok(n)
                }
                None => Ok(0),
            }
        }
    }

    fn pieces(parts: &[&[u8]]) -> Pieces {
        Pieces(parts.iter().map(|p| p.to_vec()).collect())
    }

    fn limits() -> ConnectionLimits {
        ConnectionLimits {
            read_timeout: Some(Duration::from_secs(5)),
            write_timeout: Some(Duration::from_secs(5)),
            max_head_bytes: 1024,
            max_body_bytes: 64,
        }
    }

    #[test]
    fn test_read_request_across_pieces() {
        let mut reader = pieces(&[
            b"POST /up HTTP/1.1\r\nHo",
            b"st: x\r\nContent-Length: 10\r\n\r\n01234",
            b"56789",
        ]);
        let outcome = read_request(&mut reader, &limits()).unwrap();
        assert_eq!(
            outcome,
            ReadOutcome::Complete(
                b"POST /up HTTP/1.1\r\nHost: x\r\nContent-Length: 10\r\n\r\n0123456789".to_vec()
            )
        );
    }

    #[test]
    fn test_read_request_without_content_length() {
        let mut reader = pieces(&[b"GET / HTTP/1.1\r\nHost: x\r\n\r\n"]);
        let outcome = read_request(&mut reader, &limits()).unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n".to_vec()));
    }

    #[test]
    fn test_read_request_truncates_extra_bytes() {
        let mut reader = pieces(&[b"POST / HTTP/1.1\r\nHost: x\r\nContent-Length: 2\r\n\r\nabcdef"]);
        let ReadOutcome::Complete(raw) = read_request(&mut reader, &limits()).unwrap() else {
            panic!("expected complete request");
        };
        assert!(raw.ends_with(b"\r\n\r\nab"));
    }

    #[test]
    fn test_read_request_outcomes() {
        assert_eq!(read_request(&mut pieces(&[]), &limits()).unwrap(), ReadOutcome::Empty);
        assert_eq!(
            read_request(&mut pieces(&[b"GET / HTTP/1.1\r\n"]), &limits()).unwrap(),
            ReadOutcome::Incomplete(b"GET / HTTP/1.1\r\n".to_vec())
        );
        assert_eq!(
            read_request(&mut pieces(&[&[b'a'; 2048]]), &limits()).unwrap(),
            ReadOutcome::HeadTooLarge
        );
        assert_eq!(
            read_request(
                &mut pieces(&[b"POST / HTTP/1.1\r\nHost: x\r\nContent-Length: 65\r\n\r\n"]),
                &limits()
            )
            .unwrap(),
            ReadOutcome::BodyTooLarge(65)
        );
    }

    #[test]
    fn test_declared_content_length() {
        assert_eq!(declared_content_length(b"POST / HTTP/1.1\r\ncontent-length: 7"), Some(7));
        assert_eq!(declared_content_length(b"POST / HTTP/1.1\r\nContent-Length: x"), None);
        assert_eq!(declared_content_length(b"GET / HTTP/1.1\r\nHost: x"), None);
        assert_eq!(
            declared_content_length(b"POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 5"),
            Some(5)
        );
        assert_eq!(
            declared_content_length(b"POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: x"),
            None
        );
    }

    #[test]
    fn test_read_request_duplicate_content_length_last_wins() {
        let mut reader = pieces(&[
            b"POST /p HTTP/1.1\r\nHost: x\r\nContent-Length: 3\r\nContent-Length: 5\r\n\r\nhel",
            b"lo",
        ]);
        let ReadOutcome::Complete(raw) = read_request(&mut reader, &limits()).unwrap() else {
            panic!("expected complete request");
        };

        let request = Request::parse(&raw).unwrap();
        assert_eq!(request.content_length(), Some(5));
        assert_eq!(request.body(), b"hello");
    }

    // ==================== Conexiones reales ====================

    fn ephemeral_listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").expect("bind")
    }

    fn echo_body(req: &Request, res: &mut Response) -> HandlerResult {
        res.send(req.body().to_vec())
    }

    fn test_router() -> Arc<Router> {
        let mut builder = Router::builder();
        builder
            .get("/echo/:id", |req, res| {
                res.set_header("Content-Type", "text/plain");
                res.send(req.param("id").unwrap_or_default())
            })
            .unwrap()
            .post("/body", echo_body)
            .unwrap();
        Arc::new(builder.build())
    }

    /// Atiende una conexión en otro thread; el cliente escribe con `client`
    fn exchange(limits: ConnectionLimits, client: impl FnOnce(&mut TcpStream)) -> String {
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();
        let router = test_router();

        let t = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &router, limits).unwrap();
        });

        let mut stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        client(&mut stream);

        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).unwrap();
        t.join().unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_handle_connection_echo() {
        let text = exchange(limits(), |s| {
            s.write_all(b"GET /echo/abc123 HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
        });

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 6\r\n"));
        assert!(text.ends_with("\r\n\r\nabc123"));
    }

    #[test]
    fn test_handle_connection_body_in_two_writes() {
        let text = exchange(limits(), |s| {
            s.write_all(b"POST /body HTTP/1.1\r\nHost: x\r\nContent-Length: 11\r\n\r\nhello").unwrap();
            s.flush().unwrap();
            thread::sleep(Duration::from_millis(50));
            s.write_all(b" world").unwrap();
        });

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("\r\n\r\nhello world"));
    }

    #[test]
    fn test_handle_connection_not_found() {
        let text = exchange(limits(), |s| {
            s.write_all(b"GET /nope HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
        });
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.ends_with("page not found"));
    }

    #[test]
    fn test_handle_connection_parse_error() {
        // Bytes no-HTTP: el cliente cierra la escritura sin mandar \r\n\r\n
        let text = exchange(limits(), |s| {
            s.write_all(b"\x00\x01\x02\x03garbage").unwrap();
            s.shutdown(Shutdown::Write).unwrap();
        });

        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(text.contains("Bad Request: malformed request"));
    }

    #[test]
    fn test_handle_connection_missing_host() {
        let text = exchange(limits(), |s| {
            s.write_all(b"GET /echo/a HTTP/1.1\r\n\r\n").unwrap();
        });
        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(text.ends_with("missing Host header"));
    }

    #[test]
    fn test_handle_connection_body_too_large() {
        let text = exchange(limits(), |s| {
            s.write_all(b"POST /body HTTP/1.1\r\nHost: x\r\nContent-Length: 100\r\n\r\n").unwrap();
        });
        assert!(text.starts_with("HTTP/1.1 413 Payload Too Large\r\n"));
    }

    #[test]
    fn test_handle_connection_partial_request_times_out() {
        let mut short = limits();
        short.read_timeout = Some(Duration::from_millis(100));

        let text = exchange(short, |s| {
            s.write_all(b"GET /echo/slow HTTP/1.1\r\n").unwrap();
        });
        assert!(text.starts_with("HTTP/1.1 408 Request Timeout\r\n"));
    }

    #[test]
    fn test_handle_connection_peer_closed_immediately() {
        let text = exchange(limits(), |s| {
            s.shutdown(Shutdown::Write).unwrap();
        });
        assert!(text.is_empty());
    }

    #[test]
    fn test_server_bind_and_run() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 0;

        let mut builder = Router::builder();
        builder.get("/", |_req, res| res.send("up")).unwrap();
        let server = Server::bind(config, builder.build()).unwrap();
        let addr = server.local_addr().unwrap();
        thread::spawn(move || server.run());

        for _ in 0..3 {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
            let mut text = String::new();
            stream.read_to_string(&mut text).unwrap();
            assert!(text.ends_with("\r\n\r\nup"));
        }
    }
}
