//! The embed context.
//!
//! `EmbedContext` owns everything that would otherwise be page-wide state:
//! the watch set, the script loader and the placeholder registry. Hosts build
//! one per page (or per test) and pass content subtrees to `decorate`.
//!
//! # Handlers
//!
//! Intersection and click handlers are synchronous. They claim the
//! placeholder (`VisibilityWatcher::release`, `EmbedState::try_load`) before
//! anything else, swap the DOM, and only then spawn the part that waits for
//! the widget script.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures_util::task::{LocalSpawn, LocalSpawnExt};

use crate::config::EmbedConfig;
use crate::error::EmbedError;
use crate::link::LinkMatcher;
use crate::loader::ScriptLoader;
use crate::platform::{EmbedDom, ViewportObserver, WidgetHost};
use crate::state::{EMBED_KEY_ATTR, EmbedKey, EmbedState, Registry};
use crate::watcher::VisibilityWatcher;

pub struct EmbedContext<D, O, W>
where
    D: EmbedDom,
    O: ViewportObserver<Node = D::Node>,
{
    pub(crate) config: EmbedConfig,
    pub(crate) matcher: LinkMatcher,
    pub(crate) dom: D,
    pub(crate) watcher: VisibilityWatcher<O>,
    pub(crate) widgets: Rc<W>,
    pub(crate) loader: ScriptLoader<W>,
    pub(crate) registry: RefCell<Registry<D::Node>>,
    spawner: Box<dyn LocalSpawn>,
    pub(crate) this: Weak<Self>,
}

impl<D, O, W> EmbedContext<D, O, W>
where
    D: EmbedDom + 'static,
    D::Node: 'static,
    O: ViewportObserver<Node = D::Node> + 'static,
    W: WidgetHost<Node = D::Node> + 'static,
{
    pub fn new(
        config: EmbedConfig,
        dom: D,
        observer: O,
        widgets: Rc<W>,
        spawner: Box<dyn LocalSpawn>,
    ) -> Result<Rc<Self>, EmbedError> {
        config.validate()?;
        let matcher = LinkMatcher::new(&config);
        let loader = ScriptLoader::new(Rc::clone(&widgets), config.script_src.clone());
        Ok(Rc::new_cyclic(|this| Self {
            config,
            matcher,
            dom,
            watcher: VisibilityWatcher::new(observer),
            widgets,
            loader,
            registry: RefCell::new(Registry::default()),
            spawner,
            this: this.clone(),
        }))
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn watcher(&self) -> &VisibilityWatcher<O> {
        &self.watcher
    }

    pub fn widgets(&self) -> &W {
        &self.widgets
    }

    pub fn loader(&self) -> &ScriptLoader<W> {
        &self.loader
    }

    /// Key of a placeholder node created by this context.
    pub fn key_of(&self, node: &D::Node) -> Option<EmbedKey> {
        self.dom
            .attribute(node, EMBED_KEY_ATTR)
            .and_then(|value| EmbedKey::parse(&value))
    }

    pub fn embed_state(&self, key: EmbedKey) -> Result<EmbedState, EmbedError> {
        self.registry
            .borrow()
            .state(key)
            .ok_or(EmbedError::UnknownEmbed(key))
    }

    /// Number of placeholders this context has created.
    pub fn placeholder_count(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Intersection callback for one observed placeholder.
    ///
    /// Returns true if this call started the load.
    pub fn handle_intersection(&self, key: EmbedKey, intersecting: bool) -> bool {
        if !intersecting {
            return false;
        }
        if !self.watcher.release(key) {
            return false;
        }
        tracing::debug!(%key, "placeholder near viewport");
        self.materialize(key)
    }

    /// Click callback for one placeholder.
    ///
    /// Returns true if this call started the load.
    pub fn handle_click(&self, key: EmbedKey) -> bool {
        self.watcher.release(key);
        tracing::debug!(%key, "placeholder clicked");
        self.materialize(key)
    }

    pub(crate) fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        if let Err(err) = self.spawner.spawn_local(task) {
            tracing::warn!(%err, "failed to spawn embed task");
        }
    }
}
