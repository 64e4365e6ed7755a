//! # Headers HTTP
//! src/http/headers.rs
//!
//! Mapa de headers que conserva el orden de inserción. Tanto el request como
//! la respuesta lo usan, de modo que la serialización y el eco de `/ping`
//! salen siempre en el mismo orden.
//!
//! Las búsquedas ignoran mayúsculas/minúsculas (ASCII). Insertar un nombre
//! que ya existe reemplaza la entrada en su posición original.

/// Lista ordenada de pares `Name: Value`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta o reemplaza un header (gana la última ocurrencia)
    ///
    /// ```
    /// use triehttp::http::Headers;
    ///
    /// let mut headers = Headers::new();
    /// headers.insert("Host", "a");
    /// headers.insert("host", "b");
    /// assert_eq!(headers.get("HOST"), Some("b"));
    /// assert_eq!(headers.len(), 1);
    /// ```
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.entries[i] = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Obtiene el valor de un header
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    /// Itera en orden de inserción
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let mut headers = Headers::new();
        headers.insert("Host", "x");
        headers.insert("Accept", "*/*");
        headers.insert("User-Agent", "curl");

        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Host", "Accept", "User-Agent"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut headers = Headers::new();
        headers.insert("A", "1");
        headers.insert("B", "2");
        headers.insert("a", "3");

        let pairs: Vec<(&str, &str)> = headers.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("B", "2")]);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let headers: Headers = [("Content-Length", "10")].into_iter().collect();
        assert_eq!(headers.get("content-length"), Some("10"));
        assert!(headers.contains("CONTENT-LENGTH"));
        assert!(!headers.contains("Content-Type"));
    }

    #[test]
    fn test_remove() {
        let mut headers = Headers::new();
        headers.insert("X-One", "1");
        assert_eq!(headers.remove("x-one"), Some("1".to_string()));
        assert!(headers.is_empty());
        assert_eq!(headers.remove("x-one"), None);
    }
}
