//! Token scanner for story modules.
//!
//! This is not a full JavaScript tokenizer. It produces just enough structure
//! for the module reader: identifiers, punctuators, cooked string and template
//! literals, numbers, regex literals, whole JSX elements, and a flag telling whether a line break
//! preceded each token (needed for automatic semicolon insertion).

use crate::ParseError;

/// Multi-character punctuators, longest first.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "%=", "&=", "|=",
    "^=", "**", "<<", ">>",
];

/// Keywords after which a `/` starts a regular expression.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

/// Kind of a scanned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Punct,
    Number,
    Regex,
    /// String literal with its cooked value.
    Str(String),
    /// Template literal; the cooked value is present only without `${}` substitutions.
    Template(Option<String>),
    /// JSX element or fragment, children included.
    Jsx,
}

/// A token with byte offsets into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    /// Whether a line terminator appeared between the previous token and this one.
    pub newline_before: bool,
}

impl Token {
    /// The raw source text of this token.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// One-based line number of a byte offset.
pub fn line_at(source: &str, offset: usize) -> usize {
    let offset = offset.min(source.len());
    source.as_bytes()[..offset]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

/// Scan a whole source file.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    regex_allowed: bool,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        let mut lexer = Self {
            src,
            pos: 0,
            regex_allowed: true,
        };
        if src.starts_with("#!") {
            lexer.pos = src.find('\n').unwrap_or(src.len());
        }
        lexer
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn line(&self, offset: usize) -> usize {
        line_at(self.src, offset)
    }

    /// Skip whitespace and comments, reporting whether a line break was seen.
    fn skip_trivia(&mut self) -> Result<bool, ParseError> {
        let mut newline = false;
        while let Some(ch) = self.peek() {
            match ch {
                '\n' | '\r' | '\u{2028}' | '\u{2029}' => {
                    newline = true;
                    self.bump();
                }
                c if c.is_whitespace() || c == '\u{feff}' => {
                    self.bump();
                }
                '/' if self.peek_second() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' || c == '\r' {
                            break;
                        }
                        self.bump();
                    }
                }
                '/' if self.peek_second() == Some('*') => {
                    let start = self.pos;
                    self.pos += 2;
                    match self.src[self.pos..].find("*/") {
                        Some(rel) => {
                            if self.src[self.pos..self.pos + rel].contains('\n') {
                                newline = true;
                            }
                            self.pos += rel + 2;
                        }
                        None => {
                            return Err(ParseError::UnterminatedComment {
                                line: self.line(start),
                            })
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(newline)
    }

    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        let newline_before = self.skip_trivia()?;
        let start = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        let kind = if is_ident_start(ch) {
            self.scan_identifier();
            TokenKind::Ident
        } else if ch.is_ascii_digit()
            || (ch == '.' && self.peek_second().is_some_and(|c| c.is_ascii_digit()))
        {
            self.scan_number();
            TokenKind::Number
        } else if ch == '"' || ch == '\'' {
            TokenKind::Str(self.scan_string(ch)?)
        } else if ch == '`' {
            TokenKind::Template(self.scan_template()?)
        } else if ch == '<' && self.regex_allowed && self.at_jsx_element() {
            self.scan_jsx_element()?;
            TokenKind::Jsx
        } else if ch == '/' && self.regex_allowed {
            self.scan_regex()?;
            TokenKind::Regex
        } else {
            self.scan_punctuator();
            TokenKind::Punct
        };

        let token = Token {
            kind,
            start,
            end: self.pos,
            newline_before,
        };
        self.regex_allowed = regex_may_follow(&token, self.src);
        Ok(Some(token))
    }

    fn scan_identifier(&mut self) {
        while let Some(ch) = self.peek() {
            if is_ident_part(ch) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn scan_punctuator(&mut self) {
        let rest = &self.src[self.pos..];
        if let Some(p) = PUNCTUATORS.iter().find(|p| rest.starts_with(**p)) {
            // `a?.5:b` is a conditional, not optional chaining
            let digit_after = rest[p.len()..].starts_with(|c: char| c.is_ascii_digit());
            if !(*p == "?." && digit_after) {
                self.pos += p.len();
                return;
            }
        }
        self.bump();
    }

    fn scan_string(&mut self, quote: char) -> Result<String, ParseError> {
        let start = self.pos;
        self.bump();
        let mut cooked = String::new();
        loop {
            match self.bump() {
                None | Some('\n') | Some('\r') => {
                    return Err(ParseError::UnterminatedString {
                        line: self.line(start),
                    })
                }
                Some(c) if c == quote => return Ok(cooked),
                Some('\\') => self.scan_escape(&mut cooked, start, false)?,
                Some(c) => cooked.push(c),
            }
        }
    }

    fn scan_template(&mut self) -> Result<Option<String>, ParseError> {
        let start = self.pos;
        self.bump();
        let mut cooked = String::new();
        let mut substituted = false;
        loop {
            match self.bump() {
                None => {
                    return Err(ParseError::UnterminatedTemplate {
                        line: self.line(start),
                    })
                }
                Some('`') => break,
                Some('\\') => self.scan_escape(&mut cooked, start, true)?,
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    substituted = true;
                    if !self.skip_braced()? {
                        return Err(ParseError::UnterminatedTemplate {
                            line: self.line(start),
                        });
                    }
                }
                Some(c) => cooked.push(c),
            }
        }
        Ok((!substituted).then_some(cooked))
    }

    /// Consume tokens up to the `}` closing an already consumed `{`.
    ///
    /// Returns `false` when the input ends first.
    fn skip_braced(&mut self) -> Result<bool, ParseError> {
        let saved = self.regex_allowed;
        self.regex_allowed = true;
        let mut depth = 0usize;
        while let Some(token) = self.next_token()? {
            if token.kind == TokenKind::Punct {
                match token.text(self.src) {
                    "{" => depth += 1,
                    "}" if depth == 0 => {
                        self.regex_allowed = saved;
                        return Ok(true);
                    }
                    "}" => depth -= 1,
                    _ => {}
                }
            }
        }
        Ok(false)
    }

    /// Whether the `<` at the cursor opens a JSX element rather than type parameters.
    fn at_jsx_element(&self) -> bool {
        let rest = &self.src[self.pos + 1..];
        if rest.starts_with('>') {
            return true;
        }
        if !rest.starts_with(is_ident_start) {
            return false;
        }
        let name_len = rest
            .find(|c: char| !(is_ident_part(c) || matches!(c, '.' | ':' | '-')))
            .unwrap_or(rest.len());
        let after = rest[name_len..].trim_start();
        // `<T,>` and `<T extends U>` start generic arrow functions
        let generic = after.starts_with(',')
            || after
                .strip_prefix("extends")
                .is_some_and(|r| r.starts_with(char::is_whitespace));
        !generic
    }

    /// Consume a JSX element with its children.
    ///
    /// Text children are taken verbatim, so apostrophes and slashes in them
    /// are not mistaken for literals. Expression containers are scanned as code.
    fn scan_jsx_element(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.bump();

        // opening tag and attributes
        loop {
            match self.peek() {
                None => return Err(ParseError::UnterminatedJsx { line: self.line(start) }),
                Some('/') if self.peek_second() == Some('>') => {
                    self.pos += 2;
                    return Ok(());
                }
                Some('>') => {
                    self.bump();
                    break;
                }
                Some('{') => self.scan_jsx_expression(start)?,
                Some(quote @ ('"' | '\'')) => {
                    self.bump();
                    // attribute strings have no escapes and may span lines
                    match self.src[self.pos..].find(quote) {
                        Some(rel) => self.pos += rel + 1,
                        None => {
                            return Err(ParseError::UnterminatedJsx { line: self.line(start) })
                        }
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }

        // children up to the closing tag
        loop {
            match self.peek() {
                None => return Err(ParseError::UnterminatedJsx { line: self.line(start) }),
                Some('<') if self.peek_second() == Some('/') => {
                    return match self.src[self.pos..].find('>') {
                        Some(rel) => {
                            self.pos += rel + 1;
                            Ok(())
                        }
                        None => Err(ParseError::UnterminatedJsx { line: self.line(start) }),
                    };
                }
                Some('<') => self.scan_jsx_element()?,
                Some('{') => self.scan_jsx_expression(start)?,
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn scan_jsx_expression(&mut self, element_start: usize) -> Result<(), ParseError> {
        self.bump();
        if self.skip_braced()? {
            Ok(())
        } else {
            Err(ParseError::UnterminatedJsx {
                line: self.line(element_start),
            })
        }
    }

    fn scan_escape(
        &mut self,
        cooked: &mut String,
        literal_start: usize,
        in_template: bool,
    ) -> Result<(), ParseError> {
        let unterminated = |line| {
            if in_template {
                ParseError::UnterminatedTemplate { line }
            } else {
                ParseError::UnterminatedString { line }
            }
        };
        let Some(ch) = self.bump() else {
            return Err(unterminated(self.line(literal_start)));
        };
        match ch {
            'n' => cooked.push('\n'),
            't' => cooked.push('\t'),
            'r' => cooked.push('\r'),
            'b' => cooked.push('\u{8}'),
            'f' => cooked.push('\u{c}'),
            'v' => cooked.push('\u{b}'),
            '0' if !self.peek().is_some_and(|c| c.is_ascii_digit()) => cooked.push('\0'),
            'x' => {
                let hex = self.take_hex(2);
                push_code_point(cooked, &hex, 'x');
            }
            'u' if self.peek() == Some('{') => {
                self.bump();
                let close = self.src[self.pos..]
                    .find('}')
                    .ok_or_else(|| unterminated(self.line(literal_start)))?;
                let hex = self.src[self.pos..self.pos + close].to_string();
                self.pos += close + 1;
                push_code_point(cooked, &hex, 'u');
            }
            'u' => {
                let hex = self.take_hex(4);
                push_code_point(cooked, &hex, 'u');
            }
            // line continuation
            '\r' => {
                if self.peek() == Some('\n') {
                    self.bump();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => cooked.push(other),
        }
        Ok(())
    }

    fn take_hex(&mut self, count: usize) -> String {
        let mut hex = String::new();
        while hex.len() < count {
            match self.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.bump();
                }
                _ => break,
            }
        }
        hex
    }

    fn scan_regex(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.bump();
        let mut in_class = false;
        loop {
            match self.bump() {
                None | Some('\n') | Some('\r') => {
                    return Err(ParseError::UnterminatedRegex {
                        line: self.line(start),
                    })
                }
                Some('\\') => {
                    self.bump();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some(_) => {}
            }
        }
        self.scan_identifier();
        Ok(())
    }
}

fn push_code_point(cooked: &mut String, hex: &str, escape: char) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(c) => cooked.push(c),
        None => {
            cooked.push('\\');
            cooked.push(escape);
            cooked.push_str(hex);
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphabetic()
}

fn is_ident_part(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphanumeric() || ch == '\u{200c}' || ch == '\u{200d}'
}

fn regex_may_follow(token: &Token, source: &str) -> bool {
    match &token.kind {
        TokenKind::Ident => REGEX_PREFIX_KEYWORDS.contains(&token.text(source)),
        TokenKind::Number
        | TokenKind::Regex
        | TokenKind::Str(_)
        | TokenKind::Template(_)
        | TokenKind::Jsx => false,
        // `<` is excluded so that JSX closing tags (`</div>`) stay punctuation
        TokenKind::Punct => !matches!(
            token.text(source),
            ")" | "]" | "}" | "<" | "++" | "--"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        tokenize(source)
            .unwrap()
            .iter()
            .map(|t| t.text(source).to_string())
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            texts("export const A = { a: 1 };"),
            vec!["export", "const", "A", "=", "{", "a", ":", "1", "}", ";"]
        );
    }

    #[test]
    fn test_multi_char_punctuators() {
        assert_eq!(texts("a => b ?? c?.d"), vec!["a", "=>", "b", "??", "c", "?.", "d"]);
        assert_eq!(texts("{...rest}"), vec!["{", "...", "rest", "}"]);
    }

    #[test]
    fn test_string_escapes_are_cooked() {
        let tokens = tokenize(r#"'it\'s' "a\nb" 'A\x42\u{43}'"#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str("it's".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::Str("a\nb".to_string()));
        assert_eq!(tokens[2].kind, TokenKind::Str("ABC".to_string()));
    }

    #[test]
    fn test_template_literals() {
        let tokens = tokenize("`plain` `a ${ {b: `c`}.b } d`").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Template(Some("plain".to_string())));
        assert_eq!(tokens[1].kind, TokenKind::Template(None));
    }

    #[test]
    fn test_comments_are_skipped_and_track_newlines() {
        let source = "a // trailing\n/* block\n */ b /* inline */ c";
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(tokens[1].newline_before);
        assert!(!tokens[2].newline_before);
    }

    #[test]
    fn test_regex_versus_division() {
        let source = "x = /ab+c/gi; y = a / b / c";
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Regex);
        assert_eq!(tokens[2].text(source), "/ab+c/gi");
        let divisions = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Punct && t.text(source) == "/")
            .count();
        assert_eq!(divisions, 2);
    }

    #[test]
    fn test_regex_with_slash_in_class() {
        let source = "[/a[/]b/]";
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Regex);
        assert_eq!(tokens[1].text(source), "/a[/]b/");
    }

    #[test]
    fn test_jsx_closing_tag_is_not_a_regex() {
        let source = "render: () => <Button>Hi</Button>";
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[5].kind, TokenKind::Jsx);
        assert_eq!(tokens[5].text(source), "<Button>Hi</Button>");
    }

    #[test]
    fn test_jsx_text_with_apostrophe() {
        let source = "{ render: () => <p>Don't click</p> }, next";
        assert_eq!(
            texts(source),
            vec!["{", "render", ":", "(", ")", "=>", "<p>Don't click</p>", "}", ",", "next"]
        );
    }

    #[test]
    fn test_jsx_nesting_and_expressions() {
        let source = r#"x = <>
  <Card title='a "b"' onClick={() => go("}")} />
  {items.map((i) => <li key={i}>{i}'s / item</li>)}
</>;
y"#;
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Jsx);
        assert!(tokens[2].text(source).ends_with("</>"));
        let rest: Vec<_> = tokens[3..].iter().map(|t| t.text(source)).collect();
        assert_eq!(rest, vec![";", "y"]);
    }

    #[test]
    fn test_generic_arrow_is_not_jsx() {
        let source = "f = <T,>(x: T) => x < y";
        let tokens = tokenize(source).unwrap();
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Jsx));
        assert_eq!(tokens[2].text(source), "<");
        let tokens = tokenize("f = <T extends object>(x: T) => x").unwrap();
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Jsx));
    }

    #[test]
    fn test_unterminated_jsx() {
        assert_eq!(
            tokenize("a\nb = <div>open").unwrap_err(),
            ParseError::UnterminatedJsx { line: 2 }
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("a\nb = 'oops\n").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedString { line: 2 });
    }

    #[test]
    fn test_unterminated_template_and_comment() {
        assert!(matches!(
            tokenize("`abc ${d"),
            Err(ParseError::UnterminatedTemplate { line: 1 })
        ));
        assert!(matches!(
            tokenize("a /* never"),
            Err(ParseError::UnterminatedComment { line: 1 })
        ));
    }

    #[test]
    fn test_hashbang_is_skipped() {
        assert_eq!(texts("#!/usr/bin/env node\nfoo"), vec!["foo"]);
    }

    #[test]
    fn test_line_at() {
        let source = "a\nb\nc";
        assert_eq!(line_at(source, 0), 1);
        assert_eq!(line_at(source, 2), 2);
        assert_eq!(line_at(source, 4), 3);
    }
}
