//! Minimal Component Story Format (CSF) reader.
//!
//! This crate reads story modules into a structural model:
//! - The default export ("meta") with its title and story filters
//! - Named story exports, in declaration order
//! - The `play` interaction script attached to each story, as source text
//!
//! It also provides the naming conventions that map export keys to display
//! names and stable story ids.
//!
//! # Example
//!
//! ```
//! use csf::{CsfParser, StoryParser};
//!
//! let source = "export default { title: 'Button' };\nexport const Primary = {};";
//! let module = CsfParser.parse(source, &|title| title.to_string()).unwrap();
//! assert_eq!(module.title(), Some("Button"));
//! assert_eq!(module.stories[0].export_name, "Primary");
//! ```

pub mod lexer;
pub mod module;
pub mod naming;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use naming::{sanitize, story_name_from_export, to_id, NamingError};

/// Errors that can occur when reading a story module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unterminated string literal at line {line}")]
    UnterminatedString { line: usize },

    #[error("Unterminated template literal at line {line}")]
    UnterminatedTemplate { line: usize },

    #[error("Unterminated comment at line {line}")]
    UnterminatedComment { line: usize },

    #[error("Unterminated regular expression at line {line}")]
    UnterminatedRegex { line: usize },

    #[error("Unterminated JSX element at line {line}")]
    UnterminatedJsx { line: usize },

    #[error("Unbalanced '{delimiter}' at line {line}")]
    Unbalanced { delimiter: String, line: usize },

    #[error("CSF: missing default export")]
    MissingDefaultExport,

    #[error("CSF: duplicate default export at line {line}")]
    DuplicateDefaultExport { line: usize },

    #[error("CSF: default export must be an object at line {line}")]
    InvalidDefaultExport { line: usize },

    #[error("CSF: cannot resolve default export '{name}'")]
    UnresolvedDefaultExport { name: String },

    #[error("CSF: unexpected dynamic title at line {line}")]
    DynamicTitle { line: usize },

    #[error("CSF: duplicate export '{name}'")]
    DuplicateExport { name: String },

    #[error("CSF: invalid story pattern {pattern}: {reason}")]
    InvalidStoryPattern { pattern: String, reason: String },
}

/// An `includeStories` / `excludeStories` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryFilter {
    /// Exact export name.
    Name(String),
    /// Regular expression literal, e.g. `/.*Data$/`.
    Pattern(String),
}

/// The default export of a story module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Group title, after the caller's title transformation.
    pub title: Option<String>,

    /// Source text of the `component` annotation.
    pub component: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_stories: Vec<StoryFilter>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_stories: Vec<StoryFilter>,
}

/// Per-story annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryAnnotations {
    /// Source text of the interaction script, a callable expression.
    pub play: Option<String>,
}

/// One named story export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub export_name: String,
    pub annotations: StoryAnnotations,
}

/// Structural model of a story module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryModule {
    pub meta: Meta,
    /// Stories in declaration order; export names are unique.
    pub stories: Vec<Story>,
}

impl StoryModule {
    /// The module title, if one was declared.
    pub fn title(&self) -> Option<&str> {
        self.meta.title.as_deref()
    }

    /// Look up a story by export name.
    pub fn story(&self, export_name: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.export_name == export_name)
    }
}

/// Turns story module source text into a [`StoryModule`].
pub trait StoryParser {
    /// Parse `source`, passing the declared title through `make_title`.
    fn parse(
        &self,
        source: &str,
        make_title: &dyn Fn(&str) -> String,
    ) -> Result<StoryModule, ParseError>;
}

/// The built-in token-level CSF parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsfParser;

impl StoryParser for CsfParser {
    fn parse(
        &self,
        source: &str,
        make_title: &dyn Fn(&str) -> String,
    ) -> Result<StoryModule, ParseError> {
        module::read_module(source, make_title)
    }
}

/// Parse a story module, keeping the declared title as is.
pub fn load_csf(source: &str) -> Result<StoryModule, ParseError> {
    CsfParser.parse(source, &|title| title.to_string())
}
