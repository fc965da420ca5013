//! Story module reader.
//!
//! Walks the top-level statements of a story module and extracts the default
//! export ("meta") and the named story exports, together with the `play`
//! annotation of each story. Only top-level structure is interpreted; story
//! bodies are kept as source text.

use std::collections::HashMap;

use regex::Regex;

use crate::lexer::{line_at, tokenize, Token, TokenKind};
use crate::{Meta, ParseError, Story, StoryAnnotations, StoryFilter, StoryModule};

/// Export that fixes the order of stories in a module.
const NAMED_EXPORTS_ORDER: &str = "__namedExportsOrder";

/// Maximum number of identifier hops when resolving `export default meta`.
const MAX_RESOLVE_DEPTH: usize = 8;

/// Keywords that cannot end an expression.
const OPERATOR_KEYWORDS: &[&str] = &[
    "typeof", "new", "delete", "void", "await", "yield", "in", "instanceof", "as", "satisfies",
    "extends", "keyof", "return", "throw",
];

/// Keywords that continue an expression started on a previous line.
const CONTINUING_KEYWORDS: &[&str] = &["as", "satisfies", "instanceof", "in", "of"];

/// Read a story module from source text.
pub fn read_module(
    source: &str,
    make_title: &dyn Fn(&str) -> String,
) -> Result<StoryModule, ParseError> {
    let tokens = tokenize(source)?;
    let mut reader = Reader {
        src: source,
        tokens,
        locals: HashMap::new(),
        exports: Vec::new(),
        assignments: HashMap::new(),
        default_export: None,
    };
    reader.read_statements()?;
    reader.finish(make_title)
}

/// Half-open token range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Range {
    start: usize,
    end: usize,
}

impl Range {
    fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

#[derive(Debug, Clone)]
enum DefaultExport {
    /// `export default <expr>`
    Expression(Range),
    /// `export { meta as default }`
    Local(String),
    /// `export default function` / `export default class`
    Declaration { line: usize },
}

#[derive(Debug, Clone)]
struct ExportEntry {
    exported: String,
    /// Local binding the export refers to, when it is declared in this module.
    local: Option<String>,
}

#[derive(Debug, Clone)]
enum PropertyValue {
    Expression(Range),
    /// Method shorthand; the range covers the parameter list through the body.
    Method {
        is_async: bool,
        generator: bool,
        range: Range,
    },
    Shorthand(String),
}

#[derive(Debug, Clone)]
struct Property {
    key: String,
    value: PropertyValue,
}

struct Reader<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    /// Top-level `const`/`let`/`var` initializers by binding name.
    locals: HashMap<String, Range>,
    exports: Vec<ExportEntry>,
    /// `Local.play = <expr>` assignments by local name.
    assignments: HashMap<String, Range>,
    default_export: Option<DefaultExport>,
}

impl<'a> Reader<'a> {
    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn len(&self) -> usize {
        self.tokens.len()
    }

    fn text(&self, i: usize) -> &'a str {
        match self.tokens.get(i) {
            Some(token) => token.text(self.src),
            None => "",
        }
    }

    fn is_punct(&self, i: usize, punct: &str) -> bool {
        self.tokens
            .get(i)
            .is_some_and(|t| t.kind == TokenKind::Punct && t.text(self.src) == punct)
    }

    fn is_ident(&self, i: usize, name: &str) -> bool {
        self.tokens
            .get(i)
            .is_some_and(|t| t.kind == TokenKind::Ident && t.text(self.src) == name)
    }

    fn ident(&self, i: usize) -> Option<&'a str> {
        self.tokens
            .get(i)
            .filter(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text(self.src))
    }

    fn line(&self, i: usize) -> usize {
        let offset = self
            .tokens
            .get(i)
            .map(|t| t.start)
            .unwrap_or(self.src.len());
        line_at(self.src, offset)
    }

    fn source_of(&self, range: Range) -> &'a str {
        if range.is_empty() {
            return "";
        }
        &self.src[self.tokens[range.start].start..self.tokens[range.end - 1].end]
    }

    /// Index of the delimiter closing the opener at `open`.
    fn matching_close(&self, open: usize) -> Result<usize, ParseError> {
        let mut depth = 0usize;
        for i in open..self.len() {
            if self.tokens[i].kind != TokenKind::Punct {
                continue;
            }
            match self.text(i) {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            }
        }
        Err(ParseError::Unbalanced {
            delimiter: self.text(open).to_string(),
            line: self.line(open),
        })
    }

    fn ends_expression(&self, i: usize) -> bool {
        let Some(token) = self.tokens.get(i) else {
            return false;
        };
        match &token.kind {
            TokenKind::Ident => !OPERATOR_KEYWORDS.contains(&self.text(i)),
            TokenKind::Punct => matches!(self.text(i), ")" | "]" | "}" | "++" | "--"),
            _ => true,
        }
    }

    fn continues_expression(&self, i: usize) -> bool {
        let Some(token) = self.tokens.get(i) else {
            return false;
        };
        match &token.kind {
            TokenKind::Punct => !matches!(
                self.text(i),
                "{" | "!" | "~" | "++" | "--" | "..." | "@" | "#"
            ),
            TokenKind::Ident => CONTINUING_KEYWORDS.contains(&self.text(i)),
            TokenKind::Template(_) => true,
            _ => false,
        }
    }

    /// Exclusive end of the expression starting at `start`.
    ///
    /// Stops before a depth-zero `;`, an unbalanced closer, a depth-zero `,`
    /// when `stop_at_comma` is set, or a line break where a semicolon would be
    /// inserted.
    fn expression_end(&self, start: usize, stop_at_comma: bool) -> usize {
        let mut depth = 0usize;
        let mut i = start;
        while i < self.len() {
            if depth == 0
                && i > start
                && self.tokens[i].newline_before
                && self.ends_expression(i - 1)
                && !self.continues_expression(i)
            {
                break;
            }
            if self.tokens[i].kind == TokenKind::Punct {
                match self.text(i) {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => {
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                    }
                    ";" if depth == 0 => break,
                    "," if depth == 0 && stop_at_comma => break,
                    "<" if depth == 0 => {
                        if let Some(close) = self.type_list_end(i, self.len()) {
                            i = close + 1;
                            continue;
                        }
                    }
                    _ => {}
                }
            }
            i += 1;
        }
        i
    }

    /// If the `<` at `open` starts a type parameter or type argument list
    /// (`async <T,>(x: T) => x`, `value as Map<K, V>`), the index of its `>`.
    fn type_list_end(&self, open: usize, limit: usize) -> Option<usize> {
        let opens_list = open == 0
            || self.tokens[open - 1].kind == TokenKind::Ident
            || matches!(
                self.text(open - 1),
                ":" | "(" | "[" | "{" | "," | "=" | "=>" | "?"
            );
        if !opens_list {
            return None;
        }

        let mut angle = 0usize;
        for i in open..limit {
            let text = self.text(i);
            match &self.tokens[i].kind {
                TokenKind::Punct if text.chars().all(|c| c == '<') => angle += text.len(),
                TokenKind::Punct if text.chars().all(|c| c == '>') => {
                    if text.len() >= angle {
                        let closes = match self.tokens.get(i + 1) {
                            None => true,
                            Some(next) => {
                                next.kind == TokenKind::Punct
                                    && matches!(
                                        self.text(i + 1),
                                        "(" | ")" | "[" | "]" | "}" | "," | ";" | "."
                                    )
                            }
                        };
                        return closes.then_some(i);
                    }
                    angle -= text.len();
                }
                TokenKind::Punct => {
                    if !matches!(
                        text,
                        "," | "." | "|" | "&" | "[" | "]" | "(" | ")" | "{" | "}" | ":" | "?"
                            | "=>" | "=" | "..." | ";"
                    ) {
                        return None;
                    }
                }
                TokenKind::Ident | TokenKind::Str(_) | TokenKind::Number => {}
                _ => return None,
            }
        }
        None
    }

    /// Index after the statement starting at `start`, including its `;`.
    fn statement_end(&self, start: usize) -> usize {
        let end = self.expression_end(start, false);
        let end = if self.is_punct(end, ";") { end + 1 } else { end };
        // unbalanced closers at top level are skipped one at a time
        end.max(start + 1)
    }

    /// Consume the `;` terminating a statement whose expression ends at `end`.
    fn finish_statement(&self, end: usize) -> usize {
        if self.is_punct(end, ";") {
            end + 1
        } else {
            end
        }
    }

    /// Skip a TypeScript type annotation; returns the index of the token that
    /// ends it (`=`, `,`, `;`, or a statement boundary).
    fn type_end(&self, start: usize) -> usize {
        let mut depth = 0usize;
        let mut angle = 0usize;
        let mut i = start;
        while i < self.len() {
            let token = &self.tokens[i];
            if depth == 0
                && angle == 0
                && i > start
                && token.newline_before
                && !matches!(self.text(i - 1), "|" | "&" | ":" | "," | "=>" | "<")
                && !matches!(self.text(i), "|" | "&" | "=")
            {
                break;
            }
            if token.kind == TokenKind::Punct {
                let text = self.text(i);
                match text {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => {
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                    }
                    "=" | "," | ";" if depth == 0 && angle == 0 => break,
                    _ if text.chars().all(|c| c == '<') => angle += text.len(),
                    _ if text.chars().all(|c| c == '>') => {
                        angle = angle.saturating_sub(text.len())
                    }
                    _ => {}
                }
            }
            i += 1;
        }
        i
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn read_statements(&mut self) -> Result<(), ParseError> {
        let mut i = 0;
        while i < self.len() {
            i = self.read_statement(i)?;
        }
        Ok(())
    }

    fn read_statement(&mut self, i: usize) -> Result<usize, ParseError> {
        if self.is_punct(i, ";") {
            return Ok(i + 1);
        }
        if self.is_ident(i, "export") {
            return self.read_export(i + 1);
        }
        if matches!(self.ident(i), Some("const" | "let" | "var")) && self.ident(i + 1).is_some() {
            return self.read_declarations(i + 1, false);
        }
        if self.is_ident(i, "function") || (self.is_ident(i, "async") && self.is_ident(i + 1, "function")) {
            return self.skip_function(i).map(|(_, end)| end);
        }
        if self.is_ident(i, "class") {
            return self.skip_class(i);
        }
        if let Some(object) = self.ident(i) {
            if self.is_punct(i + 1, ".") && self.is_ident(i + 2, "play") && self.is_punct(i + 3, "=") {
                let end = self.expression_end(i + 4, false);
                if end > i + 4 {
                    self.assignments
                        .insert(object.to_string(), Range::new(i + 4, end));
                }
                return Ok(self.finish_statement(end.max(i + 4)));
            }
        }
        Ok(self.statement_end(i))
    }

    fn read_export(&mut self, i: usize) -> Result<usize, ParseError> {
        if self.is_ident(i, "default") {
            return self.read_default_export(i + 1);
        }
        match self.ident(i) {
            Some("const" | "let" | "var") => self.read_declarations(i + 1, true),
            Some("function") | Some("async") if self.is_ident(i, "function") || self.is_ident(i + 1, "function") => {
                let (name, end) = self.skip_function(i)?;
                if let Some(name) = name {
                    self.add_export(name.clone(), Some(name))?;
                }
                Ok(end)
            }
            Some("class") => self.skip_class(i),
            _ if self.is_punct(i, "{") => self.read_export_clause(i),
            // type-only exports, `export *`, enums, namespaces
            _ => Ok(self.statement_end(i)),
        }
    }

    fn read_default_export(&mut self, i: usize) -> Result<usize, ParseError> {
        if self.default_export.is_some() {
            return Err(ParseError::DuplicateDefaultExport {
                line: self.line(i),
            });
        }
        let is_declaration = self.is_ident(i, "function")
            || self.is_ident(i, "class")
            || (self.is_ident(i, "async") && self.is_ident(i + 1, "function"));
        if is_declaration {
            self.default_export = Some(DefaultExport::Declaration { line: self.line(i) });
            return if self.is_ident(i, "class") {
                self.skip_class(i)
            } else {
                self.skip_function(i).map(|(_, end)| end)
            };
        }
        let end = self.expression_end(i, false);
        self.default_export = Some(DefaultExport::Expression(Range::new(i, end)));
        Ok(self.finish_statement(end).max(i))
    }

    /// `export { a, b as c } [from '...']`
    fn read_export_clause(&mut self, open: usize) -> Result<usize, ParseError> {
        let close = self.matching_close(open)?;
        let reexport = self.is_ident(close + 1, "from");

        let mut i = open + 1;
        while i < close {
            let Some(local) = self.specifier_name(i) else {
                i += 1;
                continue;
            };
            let mut exported = local.clone();
            let mut next = i + 1;
            if self.is_ident(next, "as") {
                if let Some(alias) = self.specifier_name(next + 1) {
                    exported = alias;
                }
                next += 2;
            }
            if exported == "default" {
                if self.default_export.is_some() {
                    return Err(ParseError::DuplicateDefaultExport {
                        line: self.line(i),
                    });
                }
                self.default_export = Some(DefaultExport::Local(local));
            } else if local != "type" || self.ident(next).is_none() {
                let local = (!reexport).then_some(local);
                self.add_export(exported, local)?;
            }
            i = next;
            while i < close && !self.is_punct(i, ",") {
                i += 1;
            }
            i += 1;
        }

        let after = if reexport { close + 3 } else { close + 1 };
        Ok(self.finish_statement(after))
    }

    fn specifier_name(&self, i: usize) -> Option<String> {
        match &self.tokens.get(i)?.kind {
            TokenKind::Ident => Some(self.text(i).to_string()),
            TokenKind::Str(value) => Some(value.clone()),
            _ => None,
        }
    }

    fn read_declarations(&mut self, mut i: usize, exported: bool) -> Result<usize, ParseError> {
        loop {
            let Some(name) = self.ident(i) else {
                // destructuring patterns are not stories
                return Ok(self.statement_end(i));
            };
            let name = name.to_string();
            let mut k = i + 1;
            if self.is_punct(k, "!") {
                k += 1;
            }
            if self.is_punct(k, ":") {
                k = self.type_end(k + 1);
            }
            let mut end = k;
            if self.is_punct(k, "=") {
                end = self.expression_end(k + 1, true);
                self.locals.insert(name.clone(), Range::new(k + 1, end));
            }
            if exported {
                self.add_export(name.clone(), Some(name))?;
            }
            if self.is_punct(end, ",") {
                i = end + 1;
                continue;
            }
            return Ok(self.finish_statement(end).max(i + 1));
        }
    }

    /// Skip a function declaration; returns its name and the index after it.
    fn skip_function(&self, mut i: usize) -> Result<(Option<String>, usize), ParseError> {
        if self.is_ident(i, "async") {
            i += 1;
        }
        i += 1; // `function`
        if self.is_punct(i, "*") {
            i += 1;
        }
        let name = self.ident(i).map(str::to_string);
        let mut k = if name.is_some() { i + 1 } else { i };
        if self.is_punct(k, "<") {
            while k < self.len() && !self.is_punct(k, "(") {
                k += 1;
            }
        }
        if !self.is_punct(k, "(") {
            return Ok((name, self.statement_end(k)));
        }
        let params_close = self.matching_close(k)?;
        let mut body = params_close + 1;
        while body < self.len() && !self.is_punct(body, "{") {
            // overload signature without a body
            if self.is_punct(body, ";") {
                return Ok((name, body + 1));
            }
            body += 1;
        }
        if body >= self.len() {
            return Ok((name, body));
        }
        Ok((name, self.matching_close(body)? + 1))
    }

    fn skip_class(&self, i: usize) -> Result<usize, ParseError> {
        let mut body = i + 1;
        while body < self.len() && !self.is_punct(body, "{") {
            body += 1;
        }
        if body >= self.len() {
            return Ok(body);
        }
        Ok(self.matching_close(body)? + 1)
    }

    fn add_export(&mut self, exported: String, local: Option<String>) -> Result<(), ParseError> {
        if self.exports.iter().any(|e| e.exported == exported) {
            return Err(ParseError::DuplicateExport { name: exported });
        }
        self.exports.push(ExportEntry { exported, local });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// Drop `satisfies T` / `as T` suffixes, non-null assertions and wrapping
    /// parentheses.
    fn strip(&self, range: Range) -> Result<Range, ParseError> {
        let mut range = range;
        loop {
            if range.is_empty() {
                return Ok(range);
            }
            let mut depth = 0usize;
            let mut cut = None;
            for i in range.start..range.end {
                if self.tokens[i].kind == TokenKind::Punct {
                    match self.text(i) {
                        "(" | "[" | "{" => depth += 1,
                        ")" | "]" | "}" => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                } else if depth == 0
                    && i > range.start
                    && (self.is_ident(i, "satisfies") || self.is_ident(i, "as"))
                {
                    cut = Some(i);
                    break;
                }
            }
            if let Some(cut) = cut {
                range.end = cut;
                continue;
            }
            if range.len() > 1 && self.is_punct(range.end - 1, "!") {
                range.end -= 1;
                continue;
            }
            if self.is_punct(range.start, "(") && self.matching_close(range.start)? == range.end - 1
            {
                range = Range::new(range.start + 1, range.end - 1);
                continue;
            }
            return Ok(range);
        }
    }

    /// If `range` is an object literal, return its properties.
    fn object_properties(&self, range: Range) -> Result<Option<Vec<Property>>, ParseError> {
        let range = self.strip(range)?;
        if range.is_empty() || !self.is_punct(range.start, "{") {
            return Ok(None);
        }
        let close = self.matching_close(range.start)?;
        if close != range.end - 1 {
            return Ok(None);
        }

        let mut properties = Vec::new();
        let mut i = range.start + 1;
        while i < close {
            let mut depth = 0usize;
            let mut end = i;
            while end < close {
                if self.tokens[end].kind == TokenKind::Punct {
                    match self.text(end) {
                        "(" | "[" | "{" => depth += 1,
                        ")" | "]" | "}" => depth = depth.saturating_sub(1),
                        "," if depth == 0 => break,
                        "<" if depth == 0 => {
                            if let Some(angle_close) = self.type_list_end(end, close) {
                                end = angle_close + 1;
                                continue;
                            }
                        }
                        _ => {}
                    }
                }
                end += 1;
            }
            if let Some(property) = self.property(Range::new(i, end))? {
                properties.push(property);
            }
            i = end + 1;
        }
        Ok(Some(properties))
    }

    fn property(&self, range: Range) -> Result<Option<Property>, ParseError> {
        if range.is_empty() || self.is_punct(range.start, "...") {
            return Ok(None);
        }
        let mut i = range.start;
        let mut is_async = false;
        let mut generator = false;
        while i + 1 < range.end
            && matches!(self.ident(i), Some("async" | "get" | "set"))
            && !matches!(self.text(i + 1), ":" | "(" | "," | "?")
        {
            is_async |= self.is_ident(i, "async");
            i += 1;
        }
        if self.is_punct(i, "*") {
            generator = true;
            i += 1;
        }

        let key = match self.tokens.get(i).map(|t| &t.kind) {
            Some(TokenKind::Ident) | Some(TokenKind::Number) => self.text(i).to_string(),
            Some(TokenKind::Str(value)) => value.clone(),
            // computed keys
            _ => return Ok(None),
        };
        let mut k = i + 1;
        if self.is_punct(k, "?") {
            k += 1;
        }

        let value = if k >= range.end {
            PropertyValue::Shorthand(key.clone())
        } else if self.is_punct(k, ":") {
            PropertyValue::Expression(Range::new(k + 1, range.end))
        } else if self.is_punct(k, "(") || self.is_punct(k, "<") {
            PropertyValue::Method {
                is_async,
                generator,
                range: Range::new(k, range.end),
            }
        } else {
            return Ok(None);
        };
        Ok(Some(Property { key, value }))
    }

    fn property_source(&self, value: &PropertyValue) -> String {
        match value {
            PropertyValue::Expression(range) => self.source_of(*range).to_string(),
            PropertyValue::Shorthand(name) => name.clone(),
            PropertyValue::Method {
                is_async,
                generator,
                range,
            } => format!(
                "{}function{} {}",
                if *is_async { "async " } else { "" },
                if *generator { "*" } else { "" },
                self.source_of(*range)
            ),
        }
    }

    /// Follow identifier references to the object literal they name.
    fn resolve_object(&self, range: Range, depth: usize) -> Result<Option<Vec<Property>>, ParseError> {
        if let Some(properties) = self.object_properties(range)? {
            return Ok(Some(properties));
        }
        let range = self.strip(range)?;
        if depth < MAX_RESOLVE_DEPTH && range.len() == 1 {
            if let Some(name) = self.ident(range.start) {
                if let Some(init) = self.locals.get(name) {
                    return self.resolve_object(*init, depth + 1);
                }
            }
        }
        Ok(None)
    }

    // ------------------------------------------------------------------
    // Model
    // ------------------------------------------------------------------

    fn finish(self, make_title: &dyn Fn(&str) -> String) -> Result<StoryModule, ParseError> {
        let meta_properties = match &self.default_export {
            None => return Err(ParseError::MissingDefaultExport),
            Some(DefaultExport::Declaration { line }) => {
                return Err(ParseError::InvalidDefaultExport { line: *line })
            }
            Some(DefaultExport::Expression(range)) => {
                self.resolve_object(*range, 0)?.ok_or_else(|| {
                    let stripped = self.strip(*range).unwrap_or(*range);
                    match self.ident(stripped.start).filter(|_| stripped.len() == 1) {
                        Some(name) if !self.locals.contains_key(name) => {
                            ParseError::UnresolvedDefaultExport {
                                name: name.to_string(),
                            }
                        }
                        _ => ParseError::InvalidDefaultExport {
                            line: self.line(range.start),
                        },
                    }
                })?
            }
            Some(DefaultExport::Local(name)) => match self.locals.get(name) {
                Some(init) => self.resolve_object(*init, 0)?.ok_or_else(|| {
                    ParseError::InvalidDefaultExport {
                        line: self.line(init.start),
                    }
                })?,
                None => {
                    return Err(ParseError::UnresolvedDefaultExport { name: name.clone() })
                }
            },
        };

        let meta = self.meta(&meta_properties, make_title)?;
        let order = self.named_exports_order();
        let include = compile_filters(&meta.include_stories)?;
        let exclude = compile_filters(&meta.exclude_stories)?;

        let mut stories = Vec::new();
        for export in &self.exports {
            let key = export.exported.as_str();
            if key == NAMED_EXPORTS_ORDER || !is_export_story(key, &include, &exclude) {
                continue;
            }
            let annotations = match &export.local {
                Some(local) => self.story_annotations(local)?,
                None => StoryAnnotations::default(),
            };
            stories.push(Story {
                export_name: key.to_string(),
                annotations,
            });
        }

        if let Some(order) = order {
            stories = order
                .iter()
                .filter_map(|name| stories.iter().find(|s| &s.export_name == name).cloned())
                .collect();
        }

        tracing::trace!(
            title = ?meta.title,
            stories = stories.len(),
            "read story module"
        );
        Ok(StoryModule { meta, stories })
    }

    fn meta(
        &self,
        properties: &[Property],
        make_title: &dyn Fn(&str) -> String,
    ) -> Result<Meta, ParseError> {
        let mut meta = Meta::default();
        for property in properties {
            match property.key.as_str() {
                "title" => {
                    let PropertyValue::Expression(range) = &property.value else {
                        return Err(ParseError::DynamicTitle {
                            line: self.line(0),
                        });
                    };
                    let range = self.strip(*range)?;
                    let title = match self.tokens.get(range.start).map(|t| &t.kind) {
                        Some(TokenKind::Str(value)) if range.len() == 1 => value.clone(),
                        Some(TokenKind::Template(Some(value))) if range.len() == 1 => value.clone(),
                        _ => {
                            return Err(ParseError::DynamicTitle {
                                line: self.line(range.start),
                            })
                        }
                    };
                    meta.title = Some(make_title(&title));
                }
                "component" => meta.component = Some(self.property_source(&property.value)),
                "includeStories" => meta.include_stories = self.story_filters(&property.value)?,
                "excludeStories" => meta.exclude_stories = self.story_filters(&property.value)?,
                _ => {}
            }
        }
        Ok(meta)
    }

    fn story_filters(&self, value: &PropertyValue) -> Result<Vec<StoryFilter>, ParseError> {
        let PropertyValue::Expression(range) = value else {
            return Ok(Vec::new());
        };
        let range = self.strip(*range)?;
        let elements = if self.is_punct(range.start, "[") {
            Range::new(range.start + 1, range.end.saturating_sub(1))
        } else {
            range
        };
        let mut filters = Vec::new();
        for i in elements.start..elements.end {
            match &self.tokens[i].kind {
                TokenKind::Str(value) => filters.push(StoryFilter::Name(value.clone())),
                TokenKind::Template(Some(value)) => filters.push(StoryFilter::Name(value.clone())),
                TokenKind::Regex => filters.push(StoryFilter::Pattern(self.text(i).to_string())),
                _ => {}
            }
        }
        Ok(filters)
    }

    fn named_exports_order(&self) -> Option<Vec<String>> {
        let exported = self
            .exports
            .iter()
            .any(|e| e.exported == NAMED_EXPORTS_ORDER);
        let init = self.locals.get(NAMED_EXPORTS_ORDER).filter(|_| exported)?;
        if !self.is_punct(init.start, "[") {
            return None;
        }
        Some(
            (init.start..init.end)
                .filter_map(|i| match &self.tokens[i].kind {
                    TokenKind::Str(value) => Some(value.clone()),
                    _ => None,
                })
                .collect(),
        )
    }

    fn story_annotations(&self, local: &str) -> Result<StoryAnnotations, ParseError> {
        let mut annotations = StoryAnnotations::default();
        if let Some(init) = self.locals.get(local) {
            if let Some(properties) = self.object_properties(*init)? {
                if let Some(play) = properties.iter().find(|p| p.key == "play") {
                    annotations.play = Some(self.property_source(&play.value));
                }
            }
        }
        if let Some(range) = self.assignments.get(local) {
            annotations.play = Some(self.source_of(*range).to_string());
        }
        Ok(annotations)
    }
}

/// A compiled `includeStories`/`excludeStories` entry.
enum Matcher {
    Name(String),
    Pattern(Regex),
}

impl Matcher {
    fn matches(&self, key: &str) -> bool {
        match self {
            Matcher::Name(name) => name == key,
            Matcher::Pattern(regex) => regex.is_match(key),
        }
    }
}

fn compile_filters(filters: &[StoryFilter]) -> Result<Option<Vec<Matcher>>, ParseError> {
    if filters.is_empty() {
        return Ok(None);
    }
    filters
        .iter()
        .map(|filter| match filter {
            StoryFilter::Name(name) => Ok(Matcher::Name(name.clone())),
            StoryFilter::Pattern(literal) => compile_regex_literal(literal).map(Matcher::Pattern),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Translate a `/pattern/flags` literal into a `Regex`.
fn compile_regex_literal(literal: &str) -> Result<Regex, ParseError> {
    let invalid = |reason: String| ParseError::InvalidStoryPattern {
        pattern: literal.to_string(),
        reason,
    };
    let body = literal
        .strip_prefix('/')
        .ok_or_else(|| invalid("missing leading slash".to_string()))?;
    let slash = body
        .rfind('/')
        .ok_or_else(|| invalid("missing closing slash".to_string()))?;
    let (pattern, flags) = (&body[..slash], &body[slash + 1..]);
    let inline: String = flags.chars().filter(|c| matches!(c, 'i' | 'm' | 's')).collect();
    let pattern = if inline.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{inline}){pattern}")
    };
    Regex::new(&pattern).map_err(|e| invalid(e.to_string()))
}

fn is_export_story(key: &str, include: &Option<Vec<Matcher>>, exclude: &Option<Vec<Matcher>>) -> bool {
    let included = match include {
        Some(matchers) => matchers.iter().any(|m| m.matches(key)),
        None => true,
    };
    key != "__esModule"
        && included
        && !exclude
            .as_ref()
            .is_some_and(|matchers| matchers.iter().any(|m| m.matches(key)))
}
