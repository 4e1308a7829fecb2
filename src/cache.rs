//! Type-detail cache
//!
//! Every type resolved during an analysis run lands here, keyed by its
//! declaration string with any leading `::` normalized away (`::UserInfo`
//! and `UserInfo` are the same type). The cache serves two purposes:
//!
//! - repeated references resolve to a `Done` marker instead of a fresh
//!   recursive analysis,
//! - a slot is reserved *before* a type's analysis starts, so recursive
//!   type graphs (a configuration tree owning sub-configurations of its own
//!   type) terminate with an `InProcess` marker instead of looping.
//!
//! The full cache is what `ttx analyze --output` dumps as the sibling
//! `*_dependence.json` file.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::TypeNode;

/// Outcome of reserving a cache slot for a type about to be analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheHit {
    /// Not seen before; a marker now holds the slot
    Miss,
    /// Analysis of this type is running further up the recursion
    InProgress,
    /// A completed analysis is stored
    Done,
}

/// Declaration string → resolved type node
#[derive(Debug, Clone, Default)]
pub struct TypeCache {
    entries: HashMap<String, TypeNode>,
}

impl TypeCache {
    /// Reserve a slot for `key`, reporting what was already there
    pub fn begin(&mut self, key: &str) -> CacheHit {
        let key = normalize(key);
        if key.is_empty() {
            return CacheHit::Miss;
        }
        match self.entries.get(key) {
            None => {
                self.entries.insert(key.to_string(), TypeNode::default());
                CacheHit::Miss
            }
            Some(node) if node.is_marker() => CacheHit::InProgress,
            Some(_) => CacheHit::Done,
        }
    }

    /// Store a completed analysis under `key`
    pub fn complete(&mut self, key: &str, node: TypeNode) {
        let key = normalize(key);
        if key.is_empty() {
            return;
        }
        self.entries.insert(key.to_string(), node);
    }

    pub fn get(&self, key: &str) -> Option<&TypeNode> {
        self.entries.get(normalize(key))
    }

    /// Number of resolved (non-marker) entries
    pub fn len(&self) -> usize {
        self.entries.values().filter(|n| !n.is_marker()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the cache as a dependence file.
    ///
    /// Top-level keys are always emitted sorted for deterministic output;
    /// `sort_keys` additionally sorts every nested object's keys (matching
    /// a plain JSON dump with sorted keys) instead of keeping field order.
    pub fn save(&self, path: &Path, sort_keys: bool) -> Result<()> {
        let sorted: BTreeMap<&String, &TypeNode> = self
            .entries
            .iter()
            .filter(|(_, n)| !n.is_marker())
            .collect();

        let json = if sort_keys {
            let value = serde_json::to_value(&sorted).context("Failed to build dependence JSON")?;
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string_pretty(&sorted)?
        };

        std::fs::write(path, json)
            .with_context(|| format!("Failed to write dependence file {}", path.display()))?;
        Ok(())
    }
}

/// Cache key for a declaration string: `::Asset` and `Asset` name the same
/// type.
pub fn key(raw: &str) -> &str {
    let raw = raw.trim();
    raw.strip_prefix("::").unwrap_or(raw)
}

fn normalize(k: &str) -> &str {
    key(k)
}
