//! Placeholder and embed node descriptions.

use crate::node::NodeSpec;
use crate::platform::Marker;
use crate::state::{EMBED_KEY_ATTR, EmbedKey};

/// Class of the lazy placeholder card.
pub const PLACEHOLDER_CLASS: &str = "twitter-embed-placeholder";
/// Class the widget script looks for on embed blockquotes.
pub const EMBED_CLASS: &str = "twitter-tweet";

pub const TWEET_ID_ATTR: &str = "data-tweet-id";
pub const ORIGINAL_URL_ATTR: &str = "data-original-url";

// min-height keeps layout jitter down when the widget swaps in.
const PLACEHOLDER_STYLE: &str = "border: 1px solid #e1e8ed; border-radius: 12px; \
padding: 20px; margin: 10px 0; background: #f7f9fa; cursor: pointer; \
text-align: center; min-height: 420px; display: flex; flex-direction: column; \
justify-content: center; align-items: center; transition: min-height 0.2s;";

/// Placeholder card for an unloaded embed.
pub fn placeholder_spec(tweet_id: &str, canonical_url: &str, key: EmbedKey) -> NodeSpec {
    NodeSpec::new("div")
        .class(PLACEHOLDER_CLASS)
        .attr(Marker::Processed.attribute(), "true")
        .attr(TWEET_ID_ATTR, tweet_id)
        .attr(ORIGINAL_URL_ATTR, canonical_url)
        .attr(EMBED_KEY_ATTR, key.to_string())
        .style(PLACEHOLDER_STYLE)
        .child(
            NodeSpec::new("div")
                .style("color: #1da1f2; font-size: 24px; margin-bottom: 10px;")
                .text("🐦"),
        )
        .child(
            NodeSpec::new("div")
                .style("color: #14171a; font-weight: bold; margin-bottom: 5px;")
                .text("Twitter Post"),
        )
        .child(
            NodeSpec::new("div")
                .style("color: #657786; font-size: 14px;")
                .text("Click to load tweet"),
        )
}

/// Blockquote the widget script upgrades into a rendered post.
pub fn embed_spec(canonical_url: &str) -> NodeSpec {
    NodeSpec::new("blockquote")
        .class(EMBED_CLASS)
        .attr(Marker::Processed.attribute(), "true")
        .attr(Marker::EmbedLoaded.attribute(), "true")
        .child(
            NodeSpec::new("a")
                .attr("href", canonical_url)
                .attr(Marker::Processed.attribute(), "true"),
        )
}
