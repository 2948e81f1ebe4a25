//! BibTeX parser implementation using winnow

pub mod entry;
pub mod lexer;
pub mod utils;
pub mod value;

use crate::model::{Entry, Value};
use crate::{Error, Result};
use winnow::ascii::multispace0;
use winnow::prelude::*;

pub use entry::parse_entry;

/// Internal parser result type
pub type PResult<O> = winnow::PResult<O, winnow::error::ContextError>;

/// Parse a complete BibTeX bibliography into its items
pub fn parse_bibtex(input: &str) -> Result<Vec<ParsedItem<'_>>> {
    let mut items = Vec::new();
    let mut remaining = input.trim_start();

    while !remaining.is_empty() {
        match parse_item(&mut remaining) {
            Ok(item) => items.push(item),
            Err(_) => {
                let (line, column) = utils::position(input, input.len() - remaining.len());

                return Err(Error::ParseError {
                    line,
                    column,
                    message: "invalid entry".to_string(),
                    snippet: Some(utils::snippet(remaining, 40)),
                });
            }
        }
        remaining = remaining.trim_start();
    }

    tracing::trace!(items = items.len(), "parsed bibtex items");
    Ok(items)
}

/// A parsed item from the BibTeX file
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedItem<'a> {
    /// A bibliography entry
    Entry(Entry<'a>),
    /// A string definition
    String(&'a str, Value<'a>),
    /// A preamble
    Preamble(Value<'a>),
    /// A comment
    Comment(&'a str),
}

/// Parse a single item (entry, string, preamble, or comment)
fn parse_item<'a>(input: &mut &'a str) -> PResult<ParsedItem<'a>> {
    winnow::combinator::alt((
        parse_string.map(|(k, v)| ParsedItem::String(k, v)),
        parse_preamble.map(ParsedItem::Preamble),
        parse_comment.map(ParsedItem::Comment),
        entry::parse_entry.map(ParsedItem::Entry),
        parse_free_text.map(ParsedItem::Comment),
    ))
    .parse_next(input)
}

/// Parse a @string definition
fn parse_string<'a>(input: &mut &'a str) -> PResult<(&'a str, Value<'a>)> {
    use winnow::combinator::{alt, delimited, preceded};

    preceded(
        (multispace0, '@', utils::tag_no_case("string"), multispace0),
        alt((
            delimited('{', parse_string_content, '}'),
            delimited('(', parse_string_content, ')'),
        )),
    )
    .parse_next(input)
}

/// Parse the content of a @string definition
fn parse_string_content<'a>(input: &mut &'a str) -> PResult<(&'a str, Value<'a>)> {
    use winnow::combinator::separated_pair;

    separated_pair(
        utils::ws(lexer::identifier),
        utils::ws('='),
        utils::ws(value::parse_value),
    )
    .parse_next(input)
}

/// Parse a @preamble
fn parse_preamble<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    use winnow::combinator::{alt, delimited, preceded};

    preceded(
        (multispace0, '@', utils::tag_no_case("preamble"), multispace0),
        alt((
            delimited('{', utils::ws(value::parse_value), '}'),
            delimited('(', utils::ws(value::parse_value), ')'),
        )),
    )
    .parse_next(input)
}

/// Parse a comment (different formats)
fn parse_comment<'a>(input: &mut &'a str) -> PResult<&'a str> {
    use winnow::ascii::till_line_ending;
    use winnow::combinator::{alt, delimited, preceded};
    use winnow::token::take_until;

    alt((
        // @comment{...}
        preceded(
            (multispace0, '@', utils::tag_no_case("comment"), multispace0),
            alt((
                delimited('{', lexer::balanced_braces, '}'),
                delimited('(', take_until(0.., ")"), ')'),
            )),
        ),
        // % line comment
        preceded('%', till_line_ending),
    ))
    .parse_next(input)
}

/// Text outside of entries
///
/// Runs up to the next `@`. A stray `@` that does not open an entry only
/// takes the rest of its line with it.
fn parse_free_text<'a>(input: &mut &'a str) -> PResult<&'a str> {
    let text = *input;
    let end = match text.strip_prefix('@') {
        Some(rest) if opens_entry(rest) => return Err(lexer::backtrack()),
        Some(rest) => 1 + rest.find(['@', '\n']).unwrap_or(rest.len()),
        None => text.find('@').unwrap_or(text.len()),
    };
    if text[..end].trim().is_empty() {
        return Err(lexer::backtrack());
    }

    *input = &text[end..];
    Ok(&text[..end])
}

/// Whether the text after an `@` starts like `type{` or `type(`
fn opens_entry(mut rest: &str) -> bool {
    if lexer::identifier(&mut rest).is_err() {
        return false;
    }
    lexer::skip_whitespace(&mut rest);
    rest.starts_with(['{', '('])
}
