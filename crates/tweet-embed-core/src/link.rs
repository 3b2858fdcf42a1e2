//! Post link recognition and normalization.
//!
//! A post link is `https://<host>/<user>/status/<digits>` where the host is
//! either canonical (kept) or an alias (rewritten to the canonical host before
//! the id is extracted).

use std::sync::LazyLock;

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
use regex_lite::Regex;
#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
use regex::Regex;
use smol_str::SmolStr;
use url::Url;

use crate::config::EmbedConfig;

static STATUS_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/status/([0-9]+)").unwrap());

/// Why an href was not turned into a `TweetLink`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkRejection {
    #[error("not an absolute http(s) URL")]
    NotUrl,
    #[error("host {0} is not a known post host")]
    ForeignHost(String),
    #[error("no numeric status segment")]
    MissingStatusId,
    #[error("canonical host {0} cannot be applied")]
    BadCanonicalHost(SmolStr),
}

/// A recognized post link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetLink {
    id: SmolStr,
    canonical_url: String,
    aliased: bool,
}

impl TweetLink {
    /// Numeric post identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The link with its host rewritten to the canonical host.
    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }

    /// Whether the original href used an alias host.
    pub fn was_aliased(&self) -> bool {
        self.aliased
    }
}

/// Recognizes post links for a configured set of hosts.
#[derive(Debug, Clone)]
pub struct LinkMatcher {
    canonical_host: SmolStr,
    canonical_hosts: Vec<SmolStr>,
    alias_hosts: Vec<SmolStr>,
}

impl LinkMatcher {
    pub fn new(config: &EmbedConfig) -> Self {
        let canonical_host = SmolStr::new(config.canonical_host.to_ascii_lowercase());
        let mut canonical_hosts: Vec<SmolStr> = config
            .canonical_hosts
            .iter()
            .map(|h| SmolStr::new(h.to_ascii_lowercase()))
            .collect();
        if !canonical_hosts.contains(&canonical_host) {
            canonical_hosts.push(canonical_host.clone());
        }
        Self {
            canonical_host,
            canonical_hosts,
            alias_hosts: config
                .alias_hosts
                .iter()
                .map(|h| SmolStr::new(h.to_ascii_lowercase()))
                .collect(),
        }
    }

    /// Cheap substring check used to pick candidate links before parsing.
    pub fn looks_like_post(&self, href: &str) -> bool {
        if !href.contains("/status/") {
            return false;
        }
        let href = href.to_ascii_lowercase();
        self.canonical_hosts
            .iter()
            .chain(&self.alias_hosts)
            .any(|host| href.contains(&format!("{host}/")))
    }

    /// Normalize `href` and extract the post id.
    pub fn parse(&self, href: &str) -> Result<TweetLink, LinkRejection> {
        let mut url = Url::parse(href.trim()).map_err(|_| LinkRejection::NotUrl)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LinkRejection::NotUrl);
        }
        let host = url
            .host_str()
            .ok_or(LinkRejection::NotUrl)?
            .to_ascii_lowercase();

        let aliased = if self.canonical_hosts.iter().any(|h| *h == host) {
            false
        } else if self.alias_hosts.iter().any(|h| *h == host) {
            url.set_host(Some(&self.canonical_host))
                .map_err(|_| LinkRejection::BadCanonicalHost(self.canonical_host.clone()))?;
            true
        } else {
            return Err(LinkRejection::ForeignHost(host));
        };

        let id = STATUS_ID_RE
            .captures(url.path())
            .and_then(|caps| caps.get(1))
            .map(|m| SmolStr::new(m.as_str()))
            .ok_or(LinkRejection::MissingStatusId)?;

        Ok(TweetLink {
            id,
            canonical_url: url.into(),
            aliased,
        })
    }
}
