//! Shared viewport watcher.
//!
//! One watcher per `EmbedContext`, created with it and never torn down. The
//! watch set is the authority on whether a placeholder may still be triggered
//! by intersection: `release` removes and unobserves in one step, so only the
//! first trigger for a key ever sees `true`.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::platform::ViewportObserver;
use crate::state::EmbedKey;

pub struct VisibilityWatcher<O: ViewportObserver> {
    observer: O,
    watched: RefCell<HashMap<EmbedKey, O::Node>>,
}

impl<O: ViewportObserver> VisibilityWatcher<O> {
    pub fn new(observer: O) -> Self {
        Self {
            observer,
            watched: RefCell::new(HashMap::new()),
        }
    }

    /// Start watching `node` under `key`.
    pub fn watch(&self, key: EmbedKey, node: O::Node) {
        self.observer.observe(&node);
        if let Some(previous) = self.watched.borrow_mut().insert(key, node) {
            self.observer.unobserve(&previous);
        }
    }

    /// Stop watching `key`. Returns false if it was not being watched.
    pub fn release(&self, key: EmbedKey) -> bool {
        let node = self.watched.borrow_mut().remove(&key);
        match node {
            Some(node) => {
                self.observer.unobserve(&node);
                true
            }
            None => false,
        }
    }

    pub fn is_watching(&self, key: EmbedKey) -> bool {
        self.watched.borrow().contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.watched.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.borrow().is_empty()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}
