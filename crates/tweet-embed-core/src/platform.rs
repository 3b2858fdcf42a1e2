//! Platform abstraction traits for embed operations.
//!
//! These traits define the interface between the embed logic and the
//! environment it decorates. The browser implementation in
//! `tweet-embed-browser` talks to the real DOM; `MemoryDom` implements
//! `EmbedDom` over an in-memory tree.

use futures_util::future::LocalBoxFuture;

use crate::node::NodeSpec;

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Boolean flags kept on nodes as `data-*` attributes.
///
/// A marker counts as set when the attribute is present, whatever its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// The scanner has looked at this node.
    Processed,
    /// The node holds (or has been replaced by) a loaded embed.
    EmbedLoaded,
}

impl Marker {
    pub const fn attribute(self) -> &'static str {
        match self {
            Marker::Processed => "data-processed",
            Marker::EmbedLoaded => "data-embed-loaded",
        }
    }
}

/// Document access needed to scan content and swap embeds in.
///
/// All methods take `&self`; implementations use interior mutability the way
/// the browser DOM does.
pub trait EmbedDom {
    /// Handle to an element. Cloning yields another handle to the same element.
    type Node: Clone;

    /// Every `<a>` element under `root` (inclusive), in document order.
    fn links(&self, root: &Self::Node) -> Vec<Self::Node>;

    /// Every element under `root` (inclusive) carrying `class`, in document order.
    fn elements_with_class(&self, root: &Self::Node, class: &str) -> Vec<Self::Node>;

    /// Lowercase tag name.
    fn tag_name(&self, node: &Self::Node) -> String;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str)
    -> Result<(), PlatformError>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Whether `node` currently sits under a parent.
    fn has_parent(&self, node: &Self::Node) -> bool;

    /// Whether `node` is part of the live document.
    fn is_connected(&self, node: &Self::Node) -> bool;

    /// Nearest element carrying `class`, starting at `node` itself.
    fn closest_with_class(&self, node: &Self::Node, class: &str) -> Option<Self::Node>;

    /// Create a detached element tree from a description.
    fn create(&self, spec: &NodeSpec) -> Result<Self::Node, PlatformError>;

    /// Put `new` where `old` currently sits. `old` ends up detached.
    fn replace(&self, old: &Self::Node, new: &Self::Node) -> Result<(), PlatformError>;

    /// Run `handler` whenever `node` is clicked.
    fn on_click(&self, node: &Self::Node, handler: Box<dyn Fn()>) -> Result<(), PlatformError>;

    fn has_marker(&self, node: &Self::Node, marker: Marker) -> bool {
        self.attribute(node, marker.attribute()).is_some()
    }

    fn mark(&self, node: &Self::Node, marker: Marker) -> Result<(), PlatformError> {
        self.set_attribute(node, marker.attribute(), "true")
    }
}

/// Viewport proximity notifications.
///
/// Implementations report back through `EmbedContext::handle_intersection`;
/// the trait only covers registration.
pub trait ViewportObserver {
    type Node;

    fn observe(&self, node: &Self::Node);

    fn unobserve(&self, node: &Self::Node);
}

/// The third-party widget script and its global rendering object.
pub trait WidgetHost {
    type Node;

    /// Whether the script's global rendering object already exists.
    fn widgets_available(&self) -> bool;

    /// Append a script tag for `src`. The returned future resolves on the
    /// tag's load event and never resolves if the script fails to load.
    fn inject_script(&self, src: &str) -> Result<LocalBoxFuture<'static, ()>, PlatformError>;

    /// Ask the widget script to render embeds within `node`.
    ///
    /// Returns false when the global rendering object is unavailable.
    fn load_widgets(&self, node: &Self::Node) -> bool;
}
