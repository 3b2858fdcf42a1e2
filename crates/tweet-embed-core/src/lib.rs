//! tweet-embed-core: lazy native tweet embeds without a browser.
//!
//! This crate provides:
//! - `EmbedContext` - scanner, watcher, materializer and script loader wired together
//! - `EmbedDom`, `ViewportObserver`, `WidgetHost` - the platform seams
//! - `MemoryDom` - in-memory document implementing `EmbedDom`
//! - `TweetLink` / `LinkMatcher` - post URL normalization and id extraction
//!
//! The browser implementation of the platform traits lives in `tweet-embed-browser`.

pub mod config;
pub mod context;
pub mod error;
pub mod link;
pub mod loader;
pub mod materialize;
pub mod memory;
pub mod node;
pub mod placeholder;
pub mod platform;
pub mod scanner;
pub mod state;
pub mod watcher;

#[cfg(test)]
mod testing;

pub use config::EmbedConfig;
pub use context::EmbedContext;
pub use error::EmbedError;
pub use link::{LinkMatcher, LinkRejection, TweetLink};
pub use loader::ScriptLoader;
pub use memory::{MemoryDom, NodeId};
pub use node::NodeSpec;
pub use placeholder::{EMBED_CLASS, PLACEHOLDER_CLASS, embed_spec, placeholder_spec};
pub use platform::{EmbedDom, Marker, PlatformError, ViewportObserver, WidgetHost};
pub use scanner::{ScanReport, SkipReason};
pub use smol_str::SmolStr;
pub use state::{EmbedKey, EmbedState};
pub use watcher::VisibilityWatcher;
