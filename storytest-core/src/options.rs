//! Transform options.

use crate::emit::EntryGuard;
use crate::prefixer::{BeforeEachPrefixer, TestPrefixer};
use std::fmt;
use std::sync::Arc;

/// Maps a declared title to the title used in ids and suite names.
pub type TitleFn = dyn Fn(&str) -> String + Send + Sync;

/// Options for one transform call.
///
/// Options are immutable once built and may be shared across threads.
#[derive(Clone, Default)]
pub struct TransformOptions {
    /// Drop the original module body from the output.
    pub clear_body: bool,
    /// Emit a placeholder suite when no tests were generated.
    pub insert_test_if_empty: bool,
    pub test_prefixer: Option<Arc<dyn TestPrefixer>>,
    pub before_each_prefixer: Option<Arc<dyn BeforeEachPrefixer>>,
    /// Title transformation; identity when absent.
    pub make_title: Option<Arc<TitleFn>>,
    pub entry_guard: EntryGuard,
}

impl TransformOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clear_body(mut self, clear_body: bool) -> Self {
        self.clear_body = clear_body;
        self
    }

    pub fn with_insert_test_if_empty(mut self, insert: bool) -> Self {
        self.insert_test_if_empty = insert;
        self
    }

    pub fn with_test_prefixer(mut self, prefixer: impl TestPrefixer + 'static) -> Self {
        self.test_prefixer = Some(Arc::new(prefixer));
        self
    }

    pub fn with_before_each_prefixer(mut self, prefixer: impl BeforeEachPrefixer + 'static) -> Self {
        self.before_each_prefixer = Some(Arc::new(prefixer));
        self
    }

    pub fn with_make_title(mut self, make_title: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.make_title = Some(Arc::new(make_title));
        self
    }

    pub fn with_entry_guard(mut self, guard: EntryGuard) -> Self {
        self.entry_guard = guard;
        self
    }

    /// Apply the title transformation.
    pub fn make_title(&self, title: &str) -> String {
        match &self.make_title {
            Some(make_title) => make_title(title),
            None => title.to_string(),
        }
    }
}

impl fmt::Debug for TransformOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformOptions")
            .field("clear_body", &self.clear_body)
            .field("insert_test_if_empty", &self.insert_test_if_empty)
            .field("test_prefixer", &self.test_prefixer.is_some())
            .field("before_each_prefixer", &self.before_each_prefixer.is_some())
            .field("make_title", &self.make_title.is_some())
            .field("entry_guard", &self.entry_guard)
            .finish()
    }
}
