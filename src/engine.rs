//! Projection orchestrator
//!
//! [`Chisel`] decides which walks to run from the [`Fields`] it is given:
//! the root is resolved first, then the include selector builds a fresh tree,
//! and finally the exclude selector prunes whatever is left.

use crate::error::{Result, SelectError};
use crate::fields::Fields;
use crate::select::exclude::{gather, prune};
use crate::select::include::include;
use crate::select::{Selector, SelectorCache, Subset};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Projection engine holding its own selector cache
#[derive(Debug, Default)]
pub struct Chisel {
    cache: SelectorCache,
}

impl Chisel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: SelectorCache) -> Self {
        Chisel { cache }
    }

    /// An engine that re-parses every selector; suited to untrusted selector text
    pub fn without_cache() -> Self {
        Self::with_cache(SelectorCache::disabled())
    }

    pub fn cache(&self) -> &SelectorCache {
        &self.cache
    }

    /// Parse `dsl` through the cache
    pub fn parse(&self, dsl: &str) -> Result<Arc<Selector>> {
        self.cache.get_or_parse(dsl)
    }

    pub fn include(&self, tree: Value, dsl: &str) -> Result<Value> {
        self.project(tree, &Fields::including(dsl))
    }

    pub fn exclude(&self, tree: Value, dsl: &str) -> Result<Value> {
        self.project(tree, &Fields::excluding(dsl))
    }

    pub fn root(&self, tree: Value, root: &str) -> Result<Value> {
        self.project(tree, &Fields::rooted(root))
    }

    /// Apply `fields` to `tree`
    ///
    /// Include copies out of the tree; exclude prunes it in place, which is
    /// why the tree is taken by value. Any error aborts the whole call.
    pub fn project(&self, tree: Value, fields: &Fields) -> Result<Value> {
        if !is_container(&tree) {
            debug!("tree is not a container, returning it unchanged");
            return Ok(tree);
        }

        let tree = match fields.root() {
            Some(root) => self.resolve_root(tree, root)?,
            None => tree,
        };

        let include_selector = fields.include().map(|dsl| self.parse(dsl)).transpose()?;
        let exclude_selector = fields.exclude().map(|dsl| self.parse(dsl)).transpose()?;

        if !is_container(&tree) {
            debug!("root is not a container, returning it unchanged");
            return Ok(tree);
        }

        match (include_selector, exclude_selector) {
            (None, None) => {
                debug!("no selectors, returning tree unchanged");
                Ok(tree)
            }
            (Some(include_selector), exclude_selector) => {
                debug!(exclude = exclude_selector.is_some(), "running include");
                let mut result = include(&object_nodes(&tree), "", &include_selector);

                if let Some(exclude_selector) = exclude_selector {
                    let mut nodes: Vec<&mut Map<String, Value>> = result.iter_mut().collect();
                    prune(&mut nodes, &exclude_selector);
                }

                Ok(normalize(result))
            }
            (None, Some(exclude_selector)) => {
                debug!("running exclude");
                let mut result = into_object_nodes(tree);
                let mut nodes: Vec<&mut Map<String, Value>> = result.iter_mut().collect();
                prune(&mut nodes, &exclude_selector);

                Ok(normalize(result))
            }
        }
    }

    /// Move the logical root: an optional `[n]` / `[a:b]` on the top-level
    /// array, then an optional dotted path gathered out of what remains
    fn resolve_root(&self, tree: Value, root: &str) -> Result<Value> {
        let root = root.trim();

        let (tree, path) = match root.strip_prefix('[') {
            Some(rest) => {
                let close = rest
                    .find(']')
                    .ok_or_else(|| SelectError::malformed(0, "unclosed '[' in root"))?;
                let tree = narrow_root(tree, &rest[..close])?;
                let path = rest[close + 1..].trim();
                (tree, path.strip_prefix('.').unwrap_or(path))
            }
            None => (tree, root),
        };

        if path.is_empty() {
            return Ok(tree);
        }

        debug!(root = path, "gathering root");
        let selector = self.parse(path)?;
        let mut tree = tree;
        let mut nodes: Vec<&mut Map<String, Value>> = match &mut tree {
            Value::Object(map) => vec![map],
            Value::Array(items) => items.iter_mut().filter_map(Value::as_object_mut).collect(),
            _ => Vec::new(),
        };

        let mut picks = gather(&mut nodes, &selector);
        Ok(match picks.len() {
            0 => Value::Null,
            1 => picks.swap_remove(0),
            _ => Value::Array(picks),
        })
    }
}

fn is_container(tree: &Value) -> bool {
    matches!(tree, Value::Object(_) | Value::Array(_))
}

/// Apply a 0-based root bracket such as `0`, `-1` or `1:3` to the object
/// elements of the top-level array
fn narrow_root(tree: Value, bracket: &str) -> Result<Value> {
    let mut items: Vec<Value> = match tree {
        Value::Array(items) => items.into_iter().filter(Value::is_object).collect(),
        other => vec![other],
    };
    let len = items.len();

    match bracket.split_once(':') {
        None => {
            let index = root_index(bracket)?.ok_or_else(|| {
                SelectError::malformed(1, "expected an index inside '[]' in root")
            })?;
            let at = root_offset(index, len)?;
            Ok(items.swap_remove(at))
        }
        Some((start, end)) => {
            let start = root_index(start)?.map(|i| root_offset(i, len)).transpose()?;
            let end = root_index(end)?.map(|i| root_offset(i, len)).transpose()?;

            let subset = Subset::resolve(
                Some(start.unwrap_or(0) as i64 + 1),
                end.map(|e| e as i64 + 1),
            );
            subset.size(len).remove_complement(&mut items);
            Ok(Value::Array(items))
        }
    }
}

fn root_index(text: &str) -> Result<Option<i64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    text.parse::<i64>()
        .map(Some)
        .map_err(|_| SelectError::malformed(1, format!("invalid root index `{}`", text)))
}

fn root_offset(index: i64, len: usize) -> Result<usize> {
    let resolved = if index < 0 { len as i64 + index } else { index };
    if resolved < 0 || resolved >= len as i64 {
        return Err(SelectError::RootOutOfBounds { index, len });
    }
    Ok(resolved as usize)
}

fn object_nodes(tree: &Value) -> Vec<&Map<String, Value>> {
    match tree {
        Value::Object(map) => vec![map],
        Value::Array(items) => {
            let nodes: Vec<&Map<String, Value>> =
                items.iter().filter_map(Value::as_object).collect();
            if nodes.len() < items.len() {
                warn!(skipped = items.len() - nodes.len(), "dropping non-object array elements");
            }
            nodes
        }
        _ => Vec::new(),
    }
}

fn into_object_nodes(tree: Value) -> Vec<Map<String, Value>> {
    match tree {
        Value::Object(map) => vec![map],
        Value::Array(items) => {
            let total = items.len();
            let nodes: Vec<Map<String, Value>> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect();
            if nodes.len() < total {
                warn!(skipped = total - nodes.len(), "dropping non-object array elements");
            }
            nodes
        }
        _ => Vec::new(),
    }
}

/// One node comes back bare; anything else comes back as an array
fn normalize(mut nodes: Vec<Map<String, Value>>) -> Value {
    if nodes.len() == 1 {
        if let Some(node) = nodes.pop() {
            return Value::Object(node);
        }
    }
    Value::Array(nodes.into_iter().map(Value::Object).collect())
}
