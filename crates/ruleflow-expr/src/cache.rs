//! Compiled-expression cache
//!
//! Maps expression source text to its compiled form. Only the
//! single-expression form is cached; scripts are parsed per call. The
//! map supports many concurrent readers with occasional inserts, and
//! insertion is idempotent. When the configured capacity is reached new
//! entries are simply not retained; evaluation still succeeds, it just
//! pays the parse again.

use crate::ast::Program;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Default maximum number of cached expressions
pub const DEFAULT_CACHE_SIZE: usize = 512;

/// Concurrent source-to-program cache
#[derive(Debug)]
pub struct ExpressionCache {
    entries: DashMap<String, Arc<Program>>,
    max_size: usize,
}

impl ExpressionCache {
    /// Create a cache with the given capacity
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_size,
        }
    }

    /// Look up a compiled program by source
    pub fn get(&self, source: &str) -> Option<Arc<Program>> {
        self.entries.get(source).map(|entry| Arc::clone(entry.value()))
    }

    /// Insert a compiled program unless the cache is full
    pub fn insert(&self, source: &str, program: Arc<Program>) {
        if self.entries.len() >= self.max_size && !self.entries.contains_key(source) {
            debug!(
                cache_size = self.entries.len(),
                "expression cache full, not retaining compiled form"
            );
            return;
        }
        self.entries.insert(source.to_string(), program);
    }

    /// Number of cached programs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for ExpressionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}
