//! The `storytest` command line: turn story files into test files.
//!
//! ```bash
//! storytest src/Button.stories.tsx
//! storytest --out-dir generated --config storytest.json src/*.stories.tsx
//! ```

pub mod cli;
pub mod runner;

pub use cli::Cli;
pub use runner::run;
