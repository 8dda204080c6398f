//! Interned string constants shared by the emitted artifacts.
//!
//! Route templates and wire names appear in more than one artifact. Instead
//! of repeating the literals, every writer interns them here and emits the
//! returned reference; the cache is then dumped once as the generated
//! `strings` module. Interning is keyed by a logical name (the route's crate
//! path, or crate path plus member), so the same value used by two routes
//! still gets two constants and stays independently greppable.

use std::collections::{HashMap, HashSet};

use crate::names;

/// Module name the cache is dumped under, also the prefix of every reference.
pub const STRINGS_MODULE: &str = "strings";

/// One interned constant: the emitted identifier and the literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
}

/// Insertion-ordered intern table. Two passes over the same routes in the
/// same order produce identical entries, which keeps the artifacts
/// byte-stable.
#[derive(Debug, Default)]
pub struct StringCache {
    entries: Vec<CacheEntry>,
    by_logical: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl StringCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `value` under `logical_key` and returns the reference text
    /// (`strings::<key>`). A repeated logical key reuses the first entry and
    /// ignores the new value; distinct logical keys that collapse to the same
    /// identifier get a numeric suffix.
    pub fn add(&mut self, logical_key: &str, value: &str) -> String {
        if let Some(&idx) = self.by_logical.get(logical_key) {
            return reference(&self.entries[idx].key);
        }
        let key = self.claim_key(logical_key);
        self.by_logical
            .insert(logical_key.to_string(), self.entries.len());
        self.entries.push(CacheEntry {
            key: key.clone(),
            value: value.to_string(),
        });
        reference(&key)
    }

    /// Interned entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn claim_key(&mut self, logical_key: &str) -> String {
        let base = names::safe_name(logical_key);
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn reference(key: &str) -> String {
    format!("{STRINGS_MODULE}::{key}")
}
