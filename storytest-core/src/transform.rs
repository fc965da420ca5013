//! The transform entry points.

use crate::emit::emit;
use crate::error::Result;
use crate::options::TransformOptions;
use crate::prefixer::make_before_each;
use crate::render::Renderer;
use crate::suite::{module_suite, story_suite, Suite};
use crate::synth::make_test_case;
use csf::{CsfParser, StoryModule, StoryParser};

/// Transform a story module into a test module using the built-in parser.
pub fn transform_csf(code: &str, options: &TransformOptions) -> Result<String> {
    transform_csf_with(&CsfParser, code, options)
}

/// Transform a story module with a caller-supplied parser.
///
/// The parser is called once; its errors propagate unchanged. Nothing is
/// emitted unless every stage succeeds.
pub fn transform_csf_with<P>(parser: &P, code: &str, options: &TransformOptions) -> Result<String>
where
    P: StoryParser + ?Sized,
{
    let module = parser.parse(code, &|title| options.make_title(title))?;
    tracing::debug!(
        title = ?module.title(),
        stories = module.stories.len(),
        "parsed story module"
    );

    let rendered = match synthesize(&module, options)? {
        Some(suite) => Some(Renderer::new().render(&suite.into_statement())?),
        None => None,
    };

    let (state, output) = emit(code, rendered.as_deref(), module.title(), options);
    tracing::debug!(?state, bytes = output.len(), "emitted test module");
    Ok(output)
}

/// Build the module suite, or nothing when the module yields no tests.
pub fn synthesize(module: &StoryModule, options: &TransformOptions) -> Result<Option<Suite>> {
    let Some(title) = module.title().filter(|title| !title.is_empty()) else {
        tracing::debug!("module has no title, skipping stories");
        return Ok(None);
    };

    let prefixer = options.test_prefixer.as_deref();
    let mut stories = Vec::with_capacity(module.stories.len());
    for story in &module.stories {
        let play = story.annotations.play.as_deref();
        let test = make_test_case(&story.export_name, title, play, prefixer)?;
        stories.push(story_suite(&story.export_name, test));
    }
    if stories.is_empty() {
        return Ok(None);
    }

    let before_each = options
        .before_each_prefixer
        .as_deref()
        .map(make_before_each)
        .transpose()?;
    Ok(module_suite(title, stories, before_each))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockParser, StoryModuleBuilder};

    #[test]
    fn test_transform_appends_guarded_suite() {
        let code = "export default { title: 'Button' };\nexport const Primary = {};";
        let output = transform_csf(code, &TransformOptions::new()).unwrap();
        assert_eq!(
            output,
            format!(
                "{code}\n\nif (!require.main) {{\n  describe(\"Button\", () => {{\n    describe(\"Primary\", () => {{\n      it(\"smoke-test\", undefined);\n    }});\n  }});\n}}"
            )
        );
    }

    #[test]
    fn test_synthesize_skips_untitled_modules() {
        let module = StoryModuleBuilder::untitled().story("Primary").build();
        assert!(synthesize(&module, &TransformOptions::new()).unwrap().is_none());

        let module = StoryModuleBuilder::new("").story("Primary").build();
        assert!(synthesize(&module, &TransformOptions::new()).unwrap().is_none());
    }

    #[test]
    fn test_before_each_hook_not_called_without_stories() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let options = TransformOptions::new().with_before_each_prefixer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            crate::ast::Fragment::from(crate::ast::Expression::raw("setup"))
        });

        let parser = MockParser::new(StoryModuleBuilder::new("Button").build());
        transform_csf_with(&parser, "", &options).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let parser = MockParser::new(StoryModuleBuilder::new("Button").story("Primary").build());
        transform_csf_with(&parser, "", &options).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parser_called_once_with_make_title() {
        let parser = MockParser::new(StoryModuleBuilder::new("Button").story("Primary").build());
        let options = TransformOptions::new().with_make_title(|title| format!("Lib/{title}"));
        let output = transform_csf_with(&parser, "", &options).unwrap();

        assert_eq!(parser.calls(), 1);
        assert!(output.contains("describe(\"Lib/Button\""));
    }
}
