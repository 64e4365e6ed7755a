//! # Trie de rutas
//! src/router/trie.rs
//!
//! Cada nodo representa un segmento de path. Un nodo tiene:
//! - handlers por método
//! - hijos literales, indexados por el texto exacto del segmento
//! - a lo sumo un hijo paramétrico (`:nombre`)
//! - la lista de middleware adjuntos en ese nodo
//!
//! En la búsqueda el hijo literal siempre le gana al paramétrico del mismo
//! nivel, y no hay backtracking: si el literal elegido no lleva a ninguna
//! parte, la ruta no existe.

use super::middleware::{Handler, Middleware};
use super::RouteError;
use crate::http::Method;
use std::collections::HashMap;
use std::sync::Arc;

/// Resultado de una búsqueda en el trie
pub struct RouteMatch {
    /// Handler del método pedido, si la ruta existe
    pub handler: Option<Handler>,
    /// Middleware acumulados de la raíz al último nodo visitado
    pub middlewares: Vec<Middleware>,
    /// Parámetros de path capturados
    pub params: HashMap<String, String>,
    pub found: bool,
}

/// Clasificación de un segmento de patrón
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Param(&'a str),
}

impl<'a> Segment<'a> {
    /// `:x` es paramétrico; `:` solo es literal
    fn classify(segment: &'a str) -> Self {
        match segment.strip_prefix(':') {
            Some(name) if !name.is_empty() => Segment::Param(name),
            _ => Segment::Literal(segment),
        }
    }
}

struct ParamEdge {
    name: String,
    node: RouteNode,
}

#[derive(Default)]
pub(crate) struct RouteNode {
    handlers: HashMap<Method, Handler>,
    literal_children: HashMap<String, RouteNode>,
    param_child: Option<Box<ParamEdge>>,
    middlewares: Vec<Middleware>,
}

impl RouteNode {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Camina el patrón creando los nodos que falten y guarda el handler
    pub(crate) fn insert(
        &mut self,
        pattern: &str,
        segments: &[String],
        method: Method,
        handler: Handler,
    ) -> Result<(), RouteError> {
        let mut node = self;
        for segment in segments {
            node = match Segment::classify(segment) {
                Segment::Literal(literal) => node
                    .literal_children
                    .entry(literal.to_string())
                    .or_default(),
                Segment::Param(name) => {
                    let edge = node.param_child.get_or_insert_with(|| {
                        Box::new(ParamEdge {
                            name: name.to_string(),
                            node: RouteNode::new(),
                        })
                    });
                    if edge.name != name {
                        return Err(RouteError::ConflictingParam {
                            pattern: pattern.to_string(),
                            existing: edge.name.clone(),
                            requested: name.to_string(),
                        });
                    }
                    &mut edge.node
                }
            };
        }
        node.handlers.insert(method, handler);
        Ok(())
    }

    /// Igual que `insert` pero sin crear nodos
    pub(crate) fn find_mut(&mut self, segments: &[String]) -> Option<&mut RouteNode> {
        let mut node = self;
        for segment in segments {
            node = match Segment::classify(segment) {
                Segment::Literal(literal) => node.literal_children.get_mut(literal)?,
                Segment::Param(_) => &mut node.param_child.as_mut()?.node,
            };
        }
        Some(node)
    }

    pub(crate) fn push_middleware(&mut self, middleware: Middleware) {
        self.middlewares.push(middleware);
    }

    pub(crate) fn lookup<S: AsRef<str>>(&self, method: Method, segments: &[S]) -> RouteMatch {
        let mut node = self;
        let mut route = RouteMatch {
            handler: None,
            middlewares: node.middlewares.clone(),
            params: HashMap::new(),
            found: false,
        };

        for segment in segments {
            let segment = segment.as_ref();
            if let Some(next) = node.literal_children.get(segment) {
                node = next;
            } else if let Some(edge) = &node.param_child {
                route.params.insert(edge.name.clone(), segment.to_string());
                node = &edge.node;
            } else {
                return route;
            }
            route.middlewares.extend(node.middlewares.iter().map(Arc::clone));
        }

        if let Some(handler) = node.handlers.get(&method) {
            route.handler = Some(Arc::clone(handler));
            route.found = true;
        }
        route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Segment::classify("users"), Segment::Literal("users"));
        assert_eq!(Segment::classify(":id"), Segment::Param("id"));
        assert_eq!(Segment::classify(":"), Segment::Literal(":"));
        assert_eq!(Segment::classify(""), Segment::Literal(""));
    }

    #[test]
    fn test_find_mut_does_not_create() {
        let mut root = RouteNode::new();
        assert!(root.find_mut(&["a".to_string()]).is_none());
        assert!(root.literal_children.is_empty());
        assert!(root.find_mut(&[]).is_some());
    }
}
