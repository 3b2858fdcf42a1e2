//! Scanning cooked content for post links.
//!
//! `decorate` is safe to call any number of times on the same or overlapping
//! subtrees: links are marked processed before anything else happens to
//! them, and containers that already hold a placeholder or loaded embed are
//! left alone.

use std::rc::Rc;

use crate::context::EmbedContext;
use crate::link::LinkRejection;
use crate::placeholder::{EMBED_CLASS, PLACEHOLDER_CLASS, placeholder_spec};
use crate::platform::{EmbedDom, Marker, PlatformError, ViewportObserver, WidgetHost};
use crate::state::EmbedKey;

/// Why a candidate link did not get a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("link is not inside an embeddable container")]
    NoContainer,
    #[error("container already holds an embed")]
    AlreadyEmbedded,
    #[error(transparent)]
    Unsupported(#[from] LinkRejection),
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// What a single `decorate` pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Unprocessed links that looked like post links.
    pub candidates: usize,
    pub placeholders: usize,
    pub no_container: usize,
    pub already_embedded: usize,
    pub unsupported: usize,
    pub platform_failures: usize,
    /// Pre-rendered embeds handed straight to the widget script.
    pub legacy_embeds: usize,
    /// Unloaded placeholders dropped because the host discarded them.
    pub pruned: usize,
}

impl ScanReport {
    fn record_skip(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::NoContainer => self.no_container += 1,
            SkipReason::AlreadyEmbedded => self.already_embedded += 1,
            SkipReason::Unsupported(_) => self.unsupported += 1,
            SkipReason::Platform(_) => self.platform_failures += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.no_container + self.already_embedded + self.unsupported + self.platform_failures
    }
}

impl<D, O, W> EmbedContext<D, O, W>
where
    D: EmbedDom + 'static,
    D::Node: 'static,
    O: ViewportObserver<Node = D::Node> + 'static,
    W: WidgetHost<Node = D::Node> + 'static,
{
    /// Decorate one rendered content subtree.
    ///
    /// Never fails: links that cannot be embedded are skipped and counted.
    pub fn decorate(&self, root: &D::Node) -> ScanReport {
        let mut report = ScanReport::default();
        // A detached root may simply not be adopted yet; only a live one
        // says anything about placeholders that left the document.
        if self.dom.is_connected(root) {
            report.pruned = self.prune_discarded();
        }

        for link in self.dom.links(root) {
            if self.dom.has_marker(&link, Marker::Processed) {
                continue;
            }
            let Some(href) = self.dom.attribute(&link, "href") else {
                continue;
            };
            if !self.matcher.looks_like_post(&href) {
                continue;
            }
            report.candidates += 1;

            match self.embed_link(&link, &href) {
                Ok(key) => {
                    tracing::debug!(%key, %href, "replaced onebox with placeholder");
                    report.placeholders += 1;
                }
                Err(reason) => {
                    tracing::debug!(%href, %reason, "skipping link");
                    report.record_skip(&reason);
                }
            }
        }

        report.legacy_embeds = self.revive_legacy_embeds(root);
        report
    }

    fn embed_link(&self, link: &D::Node, href: &str) -> Result<EmbedKey, SkipReason> {
        self.dom.mark(link, Marker::Processed)?;

        let container = self
            .dom
            .closest_with_class(link, &self.config.container_class)
            .ok_or(SkipReason::NoContainer)?;
        // Detached by an earlier link of the same container in this pass.
        if !self.dom.has_parent(&container) || self.holds_embed(&container) {
            return Err(SkipReason::AlreadyEmbedded);
        }

        let tweet = self.matcher.parse(href)?;

        let key = self.registry.borrow_mut().allocate();
        let placeholder =
            self.dom
                .create(&placeholder_spec(tweet.id(), tweet.canonical_url(), key))?;
        self.dom.replace(&container, &placeholder)?;

        self.registry
            .borrow_mut()
            .insert(key, tweet, placeholder.clone());
        self.watcher.watch(key, placeholder.clone());

        let this = self.this.clone();
        let on_click = Box::new(move || {
            if let Some(ctx) = this.upgrade() {
                ctx.handle_click(key);
            }
        });
        if let Err(err) = self.dom.on_click(&placeholder, on_click) {
            // Still loads on intersection.
            tracing::warn!(%key, %err, "failed to attach click handler");
        }

        Ok(key)
    }

    /// Forget unloaded placeholders that are no longer in the document.
    fn prune_discarded(&self) -> usize {
        let pruned = self
            .registry
            .borrow_mut()
            .prune(|node| !self.dom.is_connected(node));
        for key in &pruned {
            self.watcher.release(*key);
            tracing::debug!(%key, "placeholder discarded before loading");
        }
        pruned.len()
    }

    fn holds_embed(&self, container: &D::Node) -> bool {
        let loaded_embed = self
            .dom
            .elements_with_class(container, EMBED_CLASS)
            .iter()
            .any(|node| self.dom.has_marker(node, Marker::EmbedLoaded));
        loaded_embed
            || !self
                .dom
                .elements_with_class(container, PLACEHOLDER_CLASS)
                .is_empty()
    }

    /// Hand pre-rendered embed blockquotes without the loaded marker straight
    /// to the widget script.
    fn revive_legacy_embeds(&self, root: &D::Node) -> usize {
        let mut revived = 0;
        for node in self.dom.elements_with_class(root, EMBED_CLASS) {
            if self.dom.tag_name(&node) != "blockquote"
                || self.dom.has_marker(&node, Marker::EmbedLoaded)
            {
                continue;
            }
            if let Err(err) = self.dom.mark(&node, Marker::EmbedLoaded) {
                tracing::warn!(%err, "failed to mark legacy embed");
                continue;
            }
            if let Err(err) = self.dom.mark(&node, Marker::Processed) {
                tracing::warn!(%err, "failed to mark legacy embed processed");
            }

            let ready = self.loader.ensure_loaded();
            let widgets = Rc::clone(&self.widgets);
            self.spawn(async move {
                ready.await;
                widgets.load_widgets(&node);
            });
            revived += 1;
        }
        revived
    }
}
