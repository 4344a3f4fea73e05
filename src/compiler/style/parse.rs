//! Lossless style sheet tree on top of the cssparser tokenizer.
//!
//! Rules, at-rules, declarations and trivia are cut out of the source by
//! token position, never re-serialized: walking the tree and concatenating
//! what the visitor receives reproduces the input byte for byte.
//!
//! ```text
//! @import "base.wxss";            -> Import
//! van-button .x > .y { ... }      -> Rule { prelude, Block }
//!   color: $primary;              ->   Declaration { property, colon, value, terminator }
//! @media (max-width: 600px) {...} -> AtRule { prelude, Block }
//! ```

use std::fmt;

use cssparser::{ParseError, ParseErrorKind, Parser, ParserInput, ParserState, SourceLocation, SourcePosition, Token};

/// Where and why parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleParseError {
    /// 1-based.
    pub line: u32,
    pub column: u32,
    pub message: &'static str,
}

impl StyleParseError {
    fn at(location: SourceLocation, message: &'static str) -> Self {
        Self {
            line: location.line + 1,
            column: location.column,
            message,
        }
    }
}

impl fmt::Display for StyleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.column)
    }
}

impl std::error::Error for StyleParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet<'s> {
    pub items: Vec<Item<'s>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item<'s> {
    /// Whitespace and comments between items.
    Trivia(&'s str),
    /// Text that is neither a declaration nor a rule.
    Raw(&'s str),
    Import(ImportRule<'s>),
    AtRule(AtRule<'s>),
    Rule(Rule<'s>),
    Declaration(Declaration<'s>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRule<'s> {
    /// The whole rule including the terminator.
    pub text: &'s str,
    /// The imported path, unquoted.
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule<'s> {
    /// `@name` and everything up to the block or terminator. Includes the
    /// opening brace when there is a block.
    pub prelude: &'s str,
    pub block: Option<Block<'s>>,
    /// `;` or `}`, empty when the rule runs into the end of its parent.
    pub terminator: &'s str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule<'s> {
    /// Selector list, including whitespace before `{`.
    pub prelude: &'s str,
    pub block: Block<'s>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'s> {
    pub items: Vec<Item<'s>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration<'s> {
    pub property: &'s str,
    pub colon: &'s str,
    /// Everything between the colon and the terminator, whitespace included.
    pub value: &'s str,
    pub terminator: &'s str,
}

/// Parse `source` into a lossless tree.
pub fn parse_stylesheet(source: &str) -> Result<StyleSheet<'_>, StyleParseError> {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let items = parse_items(&mut parser, false)?;
    Ok(StyleSheet { items })
}

/// Items until the end of input, which inside a block is its `}`.
fn parse_items<'i>(parser: &mut Parser<'i, '_>, in_block: bool) -> Result<Vec<Item<'i>>, StyleParseError> {
    let mut items = Vec::new();
    let mut trivia: Option<SourcePosition> = None;

    loop {
        let start = parser.state();
        let Ok(token) = parser.next_including_whitespace_and_comments().cloned() else {
            break;
        };

        if matches!(token, Token::WhiteSpace(_) | Token::Comment(_)) {
            check_comment(parser, &start, &token)?;
            trivia.get_or_insert(start.position());
            continue;
        }
        if let Some(from) = trivia.take() {
            items.push(Item::Trivia(parser.slice(from..start.position())));
        }

        let item = match token {
            Token::CloseCurlyBracket => {
                return Err(StyleParseError::at(start.source_location(), "unexpected `}`"));
            }
            Token::Semicolon => Item::Raw(parser.slice_from(start.position())),
            Token::AtKeyword(ref name) => {
                let is_import = name.eq_ignore_ascii_case("import");
                parse_at_rule(parser, &start, token.clone(), is_import)?
            }
            token => parse_rule_or_declaration(parser, &start, token, in_block)?,
        };
        items.push(item);
    }

    if let Some(from) = trivia {
        items.push(Item::Trivia(parser.slice_from(from)));
    }
    Ok(items)
}

fn parse_at_rule<'i>(
    parser: &mut Parser<'i, '_>,
    start: &ParserState,
    keyword: Token<'i>,
    is_import: bool,
) -> Result<Item<'i>, StyleParseError> {
    let after_name = parser.position();
    let scan = scan(parser, start, keyword)?;

    if scan.stop == Stop::Block {
        let prelude = parser.slice_from(start.position());
        let block = parse_block(parser)?;
        return Ok(Item::AtRule(AtRule {
            prelude,
            block: Some(block),
            terminator: "}",
        }));
    }

    if is_import {
        return Ok(Item::Import(ImportRule {
            text: parser.slice_from(start.position()),
            target: import_target(parser.slice(after_name..scan.end)),
        }));
    }
    Ok(Item::AtRule(AtRule {
        prelude: parser.slice(start.position()..scan.end),
        block: None,
        terminator: parser.slice_from(scan.end),
    }))
}

fn parse_rule_or_declaration<'i>(
    parser: &mut Parser<'i, '_>,
    start: &ParserState,
    first: Token<'i>,
    in_block: bool,
) -> Result<Item<'i>, StyleParseError> {
    let scan = scan(parser, start, first)?;

    if scan.stop == Stop::Block {
        let prelude = parser.slice(start.position()..scan.end);
        let block = parse_block(parser)?;
        return Ok(Item::Rule(Rule { prelude, block }));
    }
    if !in_block {
        return Err(StyleParseError::at(
            start.source_location(),
            "expected `{` after selector",
        ));
    }

    let terminator = parser.slice_from(scan.end);
    Ok(match scan.colon {
        Some((colon, value)) => Item::Declaration(Declaration {
            property: parser.slice(start.position()..colon),
            colon: parser.slice(colon..value),
            value: parser.slice(value..scan.end),
            terminator,
        }),
        None => Item::Raw(parser.slice_from(start.position())),
    })
}

/// Parse the items of the `{` block just returned by the tokenizer.
fn parse_block<'i>(parser: &mut Parser<'i, '_>) -> Result<Block<'i>, StyleParseError> {
    let (items, close) = parser
        .parse_nested_block(|nested| {
            let items = parse_items(nested, true)
                .map_err(|err| nested.new_custom_error::<_, StyleParseError>(err))?;
            Ok((items, nested.state()))
        })
        .map_err(into_style_error)?;

    // A block cut off by the end of input ends where its items do.
    if parser.position() == close.position() {
        return Err(StyleParseError::at(close.source_location(), "unclosed block"));
    }
    Ok(Block { items })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Semicolon,
    Block,
    End,
}

struct Scan {
    /// Start of the stop token, or the end of input.
    end: SourcePosition,
    stop: Stop,
    /// First top-level `:` and the position right after it.
    colon: Option<(SourcePosition, SourcePosition)>,
}

/// Consume tokens from `first` up to a top-level `;`, `{` or the end.
///
/// On [`Stop::Block`] the `{` is consumed and its contents are not.
fn scan<'i>(parser: &mut Parser<'i, '_>, first: &ParserState, mut token: Token<'i>) -> Result<Scan, StyleParseError> {
    let mut before = first.clone();
    let mut colon = None;

    loop {
        let stop = match token {
            Token::Semicolon => Some(Stop::Semicolon),
            Token::CurlyBracketBlock => Some(Stop::Block),
            Token::CloseCurlyBracket => {
                return Err(StyleParseError::at(before.source_location(), "unexpected `}`"));
            }
            Token::BadString(_) => {
                return Err(StyleParseError::at(before.source_location(), "unterminated string"));
            }
            Token::BadUrl(_) => {
                return Err(StyleParseError::at(before.source_location(), "malformed url"));
            }
            Token::Colon => {
                colon.get_or_insert((before.position(), parser.position()));
                None
            }
            Token::Comment(_) => {
                check_comment(parser, &before, &token)?;
                None
            }
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => {
                skip_nested(parser);
                None
            }
            _ => None,
        };
        if let Some(stop) = stop {
            return Ok(Scan {
                end: before.position(),
                stop,
                colon,
            });
        }

        before = parser.state();
        match parser.next_including_whitespace_and_comments().cloned() {
            Ok(next) => token = next,
            Err(_) => {
                return Ok(Scan {
                    end: before.position(),
                    stop: Stop::End,
                    colon,
                });
            }
        }
    }
}

/// Consume the rest of the block opened by the last token.
fn skip_nested<'i>(parser: &mut Parser<'i, '_>) {
    let _ = parser.parse_nested_block(|nested| {
        while nested.next_including_whitespace_and_comments().is_ok() {}
        Ok::<(), ParseError<'i, ()>>(())
    });
}

/// The tokenizer accepts a comment cut off by the end of input.
fn check_comment(parser: &Parser<'_, '_>, start: &ParserState, token: &Token<'_>) -> Result<(), StyleParseError> {
    if let Token::Comment(_) = token {
        let text = parser.slice_from(start.position());
        if text.len() < 4 || !text.ends_with("*/") {
            return Err(StyleParseError::at(start.source_location(), "unterminated comment"));
        }
    }
    Ok(())
}

fn into_style_error(err: ParseError<'_, StyleParseError>) -> StyleParseError {
    match err.kind {
        ParseErrorKind::Custom(err) => err,
        ParseErrorKind::Basic(_) => StyleParseError::at(err.location, "unexpected token"),
    }
}

/// The path of an import prelude: `"a.wxss"`, `'a.wxss'`, `url(a.wxss)` or
/// a bare `a.wxss`.
fn import_target(prelude: &str) -> String {
    let mut input = ParserInput::new(prelude);
    let mut parser = Parser::new(&mut input);
    match parser.expect_url_or_string() {
        Ok(target) => target.to_string(),
        Err(_) => prelude
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_owned(),
    }
}

// ============================================================================
// Walk
// ============================================================================

/// Callbacks for a style sheet walk.
///
/// Every byte of the sheet is passed to exactly one callback, in source
/// order.
pub trait StyleVisitor<'s> {
    /// One compound selector, such as `van-button.primary`.
    fn visit_selector(&mut self, text: &'s str);

    /// A declaration value with surrounding whitespace removed.
    fn visit_expr(&mut self, text: &'s str);

    /// Any other text: punctuation, whitespace, comments, property names.
    fn visit_terminal(&mut self, text: &'s str);

    fn visit_import(&mut self, import: &ImportRule<'s>);
}

pub fn walk<'s, V: StyleVisitor<'s> + ?Sized>(visitor: &mut V, items: &[Item<'s>]) {
    for item in items {
        walk_item(visitor, item);
    }
}

fn walk_item<'s, V: StyleVisitor<'s> + ?Sized>(visitor: &mut V, item: &Item<'s>) {
    match item {
        Item::Trivia(text) | Item::Raw(text) => visitor.visit_terminal(text),
        Item::Import(import) => visitor.visit_import(import),
        Item::AtRule(rule) => {
            visitor.visit_terminal(rule.prelude);
            if let Some(block) = &rule.block {
                walk(visitor, &block.items);
            }
            visitor.visit_terminal(rule.terminator);
        }
        Item::Rule(rule) => {
            walk_selectors(visitor, rule.prelude);
            visitor.visit_terminal("{");
            walk(visitor, &rule.block.items);
            visitor.visit_terminal("}");
        }
        Item::Declaration(decl) => {
            visitor.visit_terminal(decl.property);
            visitor.visit_terminal(decl.colon);
            walk_value(visitor, decl.value);
            visitor.visit_terminal(decl.terminator);
        }
    }
}

/// Compound selectors go to `visit_selector`; combinators, commas,
/// comments and whitespace go to `visit_terminal`.
fn walk_selectors<'s, V: StyleVisitor<'s> + ?Sized>(visitor: &mut V, prelude: &'s str) {
    let runs = token_runs(prelude, |token| {
        matches!(
            token,
            Token::WhiteSpace(_) | Token::Comment(_) | Token::Comma | Token::Delim('>' | '+' | '~')
        )
    });
    for (is_selector, piece) in runs {
        if is_selector {
            visitor.visit_selector(piece);
        } else {
            visitor.visit_terminal(piece);
        }
    }
}

fn walk_value<'s, V: StyleVisitor<'s> + ?Sized>(visitor: &mut V, value: &'s str) {
    let trimmed_start = value.trim_start();
    let lead = &value[..value.len() - trimmed_start.len()];
    let core = trimmed_start.trim_end();
    let trail = &trimmed_start[core.len()..];

    visitor.visit_terminal(lead);
    if !core.is_empty() {
        visitor.visit_expr(core);
    }
    visitor.visit_terminal(trail);
}

/// Split an expression into terms and the separators between them.
///
/// Separators are top-level whitespace, commas and comments; the flag is
/// `true` for terms.
pub fn expr_terms(expr: &str) -> Vec<(bool, &str)> {
    token_runs(expr, |token| {
        matches!(token, Token::WhiteSpace(_) | Token::Comment(_) | Token::Comma)
    })
}

/// Alternating runs of content and separator tokens. Function and bracket
/// blocks count as one content token.
fn token_runs<'s>(text: &'s str, is_sep: impl Fn(&Token<'_>) -> bool) -> Vec<(bool, &'s str)> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut runs = Vec::new();
    let mut run: Option<(bool, SourcePosition)> = None;

    loop {
        let before = parser.position();
        let Ok(token) = parser.next_including_whitespace_and_comments() else {
            break;
        };
        let content = !is_sep(token);
        let opens = matches!(
            token,
            Token::Function(_)
                | Token::ParenthesisBlock
                | Token::SquareBracketBlock
                | Token::CurlyBracketBlock
        );
        if opens {
            skip_nested(&mut parser);
        }

        match run {
            Some((kind, from)) if kind != content => {
                runs.push((kind, parser.slice(from..before)));
                run = Some((content, before));
            }
            Some(_) => {}
            None => run = Some((content, before)),
        }
    }

    if let Some((kind, from)) = run {
        runs.push((kind, parser.slice_from(from)));
    }
    runs
}
