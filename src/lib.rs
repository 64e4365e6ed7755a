//! # triehttp
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo implementado sobre `std::net`, con un router
//! trie (segmentos literales y `:param`) y middleware tipo cebolla.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: parsing del request, headers, códigos de estado y la respuesta
//! - `router`: trie de rutas, middleware por nodo y dispatch
//! - `server`: listener TCP y lectura de cada conexión
//! - `handlers`: rutas de ejemplo (`/echo/:id`, `/files/:filename`, …)
//! - `config`: argumentos CLI y variables de entorno
//! - `logging`: inicialización de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use triehttp::config::Config;
//! use triehttp::router::Router;
//! use triehttp::server::Server;
//!
//! let mut builder = Router::builder();
//! builder
//!     .get("/hello/:name", |req, res| {
//!         let name = req.param("name").unwrap_or("world");
//!         res.send(format!("hello {}", name))
//!     })
//!     .expect("ruta válida");
//!
//! let server = Server::bind(Config::default(), builder.build()).expect("bind");
//! server.run().expect("servidor");
//! ```

pub mod config;
pub mod handlers;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;
