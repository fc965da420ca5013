//! Testing utilities.
//!
//! - `MockParser` returns a scripted story module (or error) without reading
//!   any source, and counts how often it was called
//! - `StoryModuleBuilder` assembles story module models tersely

use csf::{Meta, ParseError, Story, StoryAnnotations, StoryModule, StoryParser};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A parser that returns a scripted result.
///
/// The declared title is still passed through the caller's title function.
#[derive(Debug)]
pub struct MockParser {
    result: Result<StoryModule, ParseError>,
    calls: AtomicUsize,
}

impl MockParser {
    pub fn new(module: StoryModule) -> Self {
        Self {
            result: Ok(module),
            calls: AtomicUsize::new(0),
        }
    }

    /// A parser that always fails with `error`.
    pub fn failing(error: ParseError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `parse` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StoryParser for MockParser {
    fn parse(
        &self,
        _source: &str,
        make_title: &dyn Fn(&str) -> String,
    ) -> Result<StoryModule, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut module = self.result.clone()?;
        module.meta.title = module.meta.title.as_deref().map(make_title);
        Ok(module)
    }
}

/// Builder for story module models.
#[derive(Debug, Clone, Default)]
pub struct StoryModuleBuilder {
    module: StoryModule,
}

impl StoryModuleBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            module: StoryModule {
                meta: Meta {
                    title: Some(title.into()),
                    ..Default::default()
                },
                stories: Vec::new(),
            },
        }
    }

    /// A module whose meta has no title.
    pub fn untitled() -> Self {
        Self::default()
    }

    /// Add a story without a play script.
    pub fn story(mut self, export_name: &str) -> Self {
        self.module.stories.push(Story {
            export_name: export_name.to_string(),
            annotations: StoryAnnotations::default(),
        });
        self
    }

    /// Add a story with a play script.
    pub fn play_story(mut self, export_name: &str, play: &str) -> Self {
        self.module.stories.push(Story {
            export_name: export_name.to_string(),
            annotations: StoryAnnotations {
                play: Some(play.to_string()),
            },
        });
        self
    }

    pub fn build(self) -> StoryModule {
        self.module
    }
}
