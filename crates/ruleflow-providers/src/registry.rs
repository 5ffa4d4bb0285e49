//! Action provider registry
//!
//! Providers are registered during the build phase and consulted on the
//! hot path whenever a rule instantiates an action. Dispatch order is
//! descending provider priority with registration order as the
//! deterministic tie-breaker. Sorting is lazy: registration marks the
//! order dirty and the next dispatch re-sorts once.

use ruleflow_domain::{ActionDefinition, Error, Result, SharedAction, SharedActionProvider};
use std::sync::PoisonError;
use std::sync::RwLock;
use tracing::debug;

struct Providers {
    /// (registration index, provider) pairs
    entries: Vec<(usize, SharedActionProvider)>,
    sorted: bool,
}

/// Priority-sorted registry of action providers
pub struct ActionRegistry {
    inner: RwLock<Providers>,
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry").finish_non_exhaustive()
    }
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Providers {
                entries: Vec::new(),
                sorted: true,
            }),
        }
    }

    /// Register a provider
    ///
    /// Registration must complete before the first `execute`; dispatch
    /// afterwards is read-only.
    pub fn register(&self, provider: SharedActionProvider) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        debug!(
            provider = provider.provider_name(),
            priority = provider.priority(),
            "registering action provider"
        );
        let index = inner.entries.len();
        inner.entries.push((index, provider));
        inner.sorted = false;
    }

    /// Create an action for a definition
    ///
    /// The first provider (in dispatch order) whose `supports` matches
    /// the definition's type tag creates the action. No match is an
    /// action-creation error.
    pub fn create_action(&self, definition: &ActionDefinition) -> Result<SharedAction> {
        self.ensure_sorted();
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        for (_, provider) in &inner.entries {
            if provider.supports(&definition.action_type) {
                return provider.create_action(definition);
            }
        }
        Err(Error::action_creation(
            &definition.action_type,
            format!(
                "No action provider supports type '{}'",
                definition.action_type
            ),
        ))
    }

    /// Provider names in dispatch order, for diagnostics
    pub fn provider_names(&self) -> Vec<String> {
        self.ensure_sorted();
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .entries
            .iter()
            .map(|(_, p)| p.provider_name().to_string())
            .collect()
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.entries.len()
    }

    /// Whether no provider is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_sorted(&self) {
        {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            if inner.sorted {
                return;
            }
        }
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if !inner.sorted {
            inner
                .entries
                .sort_by_key(|(index, provider)| (std::cmp::Reverse(provider.priority()), *index));
            inner.sorted = true;
        }
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
