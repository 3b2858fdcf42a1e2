use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::EmbedError;

/// Settings for an `EmbedContext`.
///
/// Deserializes from camelCase keys; every field is optional and falls back
/// to the values a stock Discourse install expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbedConfig {
    /// Class of the rich-preview wrapper the host renders around links.
    pub container_class: SmolStr,
    /// Margin around the viewport, in pixels, that counts as visible.
    pub root_margin_px: u32,
    /// Widget script fetched once per context.
    pub script_src: String,
    /// Host that canonical URLs are rewritten to.
    pub canonical_host: SmolStr,
    /// Hosts accepted as-is.
    pub canonical_hosts: Vec<SmolStr>,
    /// Hosts rewritten to `canonical_host`.
    pub alias_hosts: Vec<SmolStr>,
    /// Name the decoration callback is registered under.
    pub decorator_id: SmolStr,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            container_class: SmolStr::new_static("onebox"),
            root_margin_px: 100,
            script_src: "https://platform.twitter.com/widgets.js".to_owned(),
            canonical_host: SmolStr::new_static("twitter.com"),
            canonical_hosts: vec![
                SmolStr::new_static("twitter.com"),
                SmolStr::new_static("www.twitter.com"),
                SmolStr::new_static("mobile.twitter.com"),
            ],
            alias_hosts: vec![
                SmolStr::new_static("x.com"),
                SmolStr::new_static("www.x.com"),
                SmolStr::new_static("mobile.x.com"),
            ],
            decorator_id: SmolStr::new_static("twitter-native-embed"),
        }
    }
}

impl EmbedConfig {
    pub fn validate(&self) -> Result<(), EmbedError> {
        if self.container_class.trim().is_empty() {
            return Err(EmbedError::InvalidConfig(
                "containerClass must not be empty".into(),
            ));
        }
        if self.canonical_host.trim().is_empty() {
            return Err(EmbedError::InvalidConfig(
                "canonicalHost must not be empty".into(),
            ));
        }
        if self.script_src.trim().is_empty() {
            return Err(EmbedError::InvalidConfig("scriptSrc must not be empty".into()));
        }
        Ok(())
    }

    /// Root margin in CSS syntax, e.g. `100px`.
    pub fn root_margin(&self) -> String {
        format!("{}px", self.root_margin_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config: EmbedConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EmbedConfig::default());
        assert_eq!(config.root_margin(), "100px");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_camel_case_overrides() {
        let config: EmbedConfig =
            serde_json::from_str(r#"{"rootMarginPx": 250, "containerClass": "preview"}"#).unwrap();
        assert_eq!(config.root_margin(), "250px");
        assert_eq!(config.container_class, "preview");
        assert_eq!(config.canonical_host, "twitter.com");
    }

    #[test]
    fn test_rejects_blank_container_class() {
        let config = EmbedConfig {
            container_class: SmolStr::new_static("  "),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EmbedError::InvalidConfig(_))
        ));
    }
}
