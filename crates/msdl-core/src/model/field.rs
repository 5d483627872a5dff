//! Cached fields over live XML nodes
//!
//! Every entity field has two sources of truth: an in-memory cache and the
//! backing node. Reads prefer the cache and fall back to the node when the
//! cache is unset; writes update both at once.

use crate::xml::{NodeId, XmlTree};

/// Two-state field cache
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cached<T> {
    /// Nothing cached; reads go to the backing node
    #[default]
    Unset,
    Value(T),
}

impl<T: Clone> Cached<T> {
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Cached::Unset, Cached::Value)
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Cached::Value(_))
    }

    pub fn cached(&self) -> Option<&T> {
        match self {
            Cached::Value(value) => Some(value),
            Cached::Unset => None,
        }
    }

    /// Cached value, or the result of `read` when unset
    pub fn get_or_read(&self, read: impl FnOnce() -> Option<T>) -> Option<T> {
        match self {
            Cached::Value(value) => Some(value.clone()),
            Cached::Unset => read(),
        }
    }

    pub fn set(&mut self, value: T) {
        *self = Cached::Value(value);
    }

    /// Drop the cached value so the next read goes to the node
    pub fn invalidate(&mut self) {
        *self = Cached::Unset;
    }
}

/// A text field stored at a fixed child path below an entity node
#[derive(Debug, Clone, PartialEq)]
pub struct TextField {
    path: &'static [&'static str],
    cache: Cached<String>,
}

impl TextField {
    /// Bind a field to `path` and prime the cache from the node
    pub fn load(tree: &XmlTree, node: NodeId, path: &'static [&'static str]) -> Self {
        Self {
            path,
            cache: Cached::from_option(tree.path_text(node, path).map(str::to_string)),
        }
    }

    /// Unbound field with an empty cache
    pub fn unset(path: &'static [&'static str]) -> Self {
        Self {
            path,
            cache: Cached::Unset,
        }
    }

    pub fn path(&self) -> &'static [&'static str] {
        self.path
    }

    pub fn get(&self, tree: &XmlTree, node: NodeId) -> Option<String> {
        self.cache
            .get_or_read(|| tree.path_text(node, self.path).map(str::to_string))
    }

    pub fn set(&mut self, tree: &mut XmlTree, node: NodeId, value: &str) {
        tree.set_path_text(node, self.path, value);
        self.cache.set(value.to_string());
    }

    /// Remove the element and clear the cache
    pub fn clear(&mut self, tree: &mut XmlTree, node: NodeId) {
        tree.remove_path(node, self.path);
        self.cache.invalidate();
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}

/// Parse a text field into a number, logging and dropping bad values
pub(crate) fn parse_field<T: std::str::FromStr>(field: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(field, value = %raw, "unparseable field value");
            None
        }
    }
}
