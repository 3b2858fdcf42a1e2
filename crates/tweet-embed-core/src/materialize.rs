//! Swapping a placeholder for the real embed.

use std::rc::Rc;

use crate::context::EmbedContext;
use crate::placeholder::embed_spec;
use crate::platform::{EmbedDom, Marker, ViewportObserver, WidgetHost};
use crate::state::EmbedKey;

impl<D, O, W> EmbedContext<D, O, W>
where
    D: EmbedDom + 'static,
    D::Node: 'static,
    O: ViewportObserver<Node = D::Node> + 'static,
    W: WidgetHost<Node = D::Node> + 'static,
{
    /// Replace the placeholder for `key` with the embed blockquote and render
    /// it once the widget script is ready.
    ///
    /// The loaded transition and the DOM swap happen before this returns;
    /// waiting for the script and the render call run as a spawned task.
    /// Returns false if the placeholder was already loaded or is unknown.
    pub fn materialize(&self, key: EmbedKey) -> bool {
        let Some((placeholder, link)) = self.registry.borrow_mut().begin_load(key) else {
            tracing::debug!(%key, "embed already loaded");
            return false;
        };

        if let Err(err) = self.dom.mark(&placeholder, Marker::EmbedLoaded) {
            tracing::warn!(%key, %err, "failed to mark placeholder loaded");
        }

        let embed = match self.dom.create(&embed_spec(link.canonical_url())) {
            Ok(embed) => embed,
            Err(err) => {
                tracing::warn!(%key, %err, "failed to create embed node");
                return true;
            }
        };
        if let Err(err) = self.dom.replace(&placeholder, &embed) {
            tracing::warn!(%key, %err, "failed to swap placeholder for embed");
            return true;
        }

        let ready = self.loader.ensure_loaded();
        let widgets = Rc::clone(&self.widgets);
        let tweet_id = link.id().to_owned();
        self.spawn(async move {
            ready.await;
            if !widgets.load_widgets(&embed) {
                tracing::debug!(%tweet_id, "widget global missing; leaving embed markup inert");
            }
        });
        true
    }
}
