//! Per-placeholder load state.
//!
//! Each placeholder gets an `EmbedKey` when it is created. The key is written
//! to the node as `data-embed-key` so platform callbacks that only see the
//! element can find the registry entry again.

use std::collections::HashMap;
use std::fmt;

use crate::link::TweetLink;

/// Attribute carrying the placeholder's key.
pub const EMBED_KEY_ATTR: &str = "data-embed-key";

/// Context-local identity of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmbedKey(u32);

impl EmbedKey {
    pub fn parse(value: &str) -> Option<Self> {
        value.parse().ok().map(EmbedKey)
    }
}

impl fmt::Display for EmbedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-state lifecycle of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbedState {
    #[default]
    Unloaded,
    Loaded,
}

impl EmbedState {
    /// Move to `Loaded`. Returns false if the transition already happened.
    pub fn try_load(&mut self) -> bool {
        match self {
            EmbedState::Unloaded => {
                *self = EmbedState::Loaded;
                true
            }
            EmbedState::Loaded => false,
        }
    }

    pub fn is_loaded(self) -> bool {
        self == EmbedState::Loaded
    }
}

#[derive(Debug)]
struct PlaceholderEntry<N> {
    link: TweetLink,
    /// Dropped once the placeholder has been swapped out.
    node: Option<N>,
    state: EmbedState,
}

/// Mapping from placeholder key to its link, node and state.
#[derive(Debug)]
pub struct Registry<N> {
    next_key: u32,
    entries: HashMap<EmbedKey, PlaceholderEntry<N>>,
}

impl<N> Default for Registry<N> {
    fn default() -> Self {
        Self {
            next_key: 0,
            entries: HashMap::new(),
        }
    }
}

impl<N: Clone> Registry<N> {
    /// Reserve a fresh key. Keys are never reused.
    pub fn allocate(&mut self) -> EmbedKey {
        let key = EmbedKey(self.next_key);
        self.next_key += 1;
        key
    }

    pub fn insert(&mut self, key: EmbedKey, link: TweetLink, node: N) {
        self.entries.insert(
            key,
            PlaceholderEntry {
                link,
                node: Some(node),
                state: EmbedState::Unloaded,
            },
        );
    }

    /// Transition `key` to loaded and hand back its placeholder node and link.
    ///
    /// Returns `None` for unknown keys and for keys that already loaded.
    pub fn begin_load(&mut self, key: EmbedKey) -> Option<(N, TweetLink)> {
        let entry = self.entries.get_mut(&key)?;
        if !entry.state.try_load() {
            return None;
        }
        let node = entry.node.take()?;
        Some((node, entry.link.clone()))
    }

    pub fn state(&self, key: EmbedKey) -> Option<EmbedState> {
        self.entries.get(&key).map(|entry| entry.state)
    }

    /// Drop unloaded entries whose placeholder `discard` rejects and return
    /// their keys. Loaded entries are kept so later triggers stay no-ops.
    pub fn prune(&mut self, mut discard: impl FnMut(&N) -> bool) -> Vec<EmbedKey> {
        let mut pruned = Vec::new();
        self.entries.retain(|key, entry| match &entry.node {
            Some(node) if !entry.state.is_loaded() && discard(node) => {
                pruned.push(*key);
                false
            }
            _ => true,
        });
        pruned.sort();
        pruned
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn loaded_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.state.is_loaded())
            .count()
    }
}
