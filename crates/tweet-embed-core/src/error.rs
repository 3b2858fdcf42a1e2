use miette::Diagnostic;
use thiserror::Error;

use crate::platform::PlatformError;
use crate::state::EmbedKey;

#[derive(Debug, Error, Diagnostic)]
pub enum EmbedError {
    #[error("platform operation failed: {0}")]
    #[diagnostic(code(tweet_embed::platform))]
    Platform(#[from] PlatformError),

    #[error("invalid embed configuration: {0}")]
    #[diagnostic(
        code(tweet_embed::config),
        help("every configuration field has a default; omit it rather than leaving it empty")
    )]
    InvalidConfig(String),

    #[error("no placeholder registered for {0}")]
    #[diagnostic(code(tweet_embed::unknown_embed))]
    UnknownEmbed(EmbedKey),
}
