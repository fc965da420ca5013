//! Story-to-test synthesis.
//!
//! This crate turns a story module into a test module:
//! - Each story becomes a `describe(<export>, ...)` block holding one
//!   `it("play-test" | "smoke-test", ...)` case
//! - Story blocks are nested in a `describe(<title>, ...)` block, optionally
//!   led by a shared `beforeEach(...)`
//! - The suite is appended to the original module behind an entry guard, or
//!   replaced by a placeholder suite when nothing was generated
//!
//! Hooks ([`TestPrefixer`], [`BeforeEachPrefixer`]) let callers decide what
//! each test runs, given the story's id, title, and display name.
//!
//! # Example
//!
//! ```
//! use storytest_core::{transform_csf, TransformOptions};
//!
//! let code = "export default { title: 'Button' };\nexport const Primary = {};";
//! let output = transform_csf(code, &TransformOptions::new()).unwrap();
//! assert!(output.contains("it(\"smoke-test\", undefined);"));
//! ```

pub mod ast;
pub mod config;
pub mod context;
pub mod emit;
pub mod error;
pub mod options;
pub mod prefixer;
pub mod render;
pub mod suite;
pub mod synth;
pub mod template;
pub mod testing;
pub mod transform;

pub use ast::{Expression, Fragment, FragmentError, Identifier, Statement};
pub use config::{ConfigError, TestPrefixerConfig, TransformConfig};
pub use context::{build_context, TestContext};
pub use emit::{EmissionState, EntryGuard};
pub use error::TransformError;
pub use options::TransformOptions;
pub use prefixer::{BeforeEachPrefixer, PrefixedTest, TestPrefixer};
pub use render::{RenderError, Renderer};
pub use suite::Suite;
pub use synth::TestKind;
pub use template::{TemplateBeforeEach, TemplateError, TemplatePrefixer};
pub use transform::{synthesize, transform_csf, transform_csf_with};
