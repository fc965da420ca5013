//! Error type for the transform pipeline.

use crate::render::RenderError;
use csf::{NamingError, ParseError};
use thiserror::Error;

/// Errors from turning a story module into a test module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The story module could not be read.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A title or story name has no usable characters for an id.
    #[error("Naming error: {0}")]
    Naming(#[from] NamingError),

    /// A prefixer hook returned something that does not fit its slot.
    #[error("Malformed {hook} result for {}: {reason}", .story.as_deref().unwrap_or("module"))]
    MalformedPrefixerResult {
        hook: &'static str,
        story: Option<String>,
        reason: String,
    },

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
