//! Entry parsing for BibTeX

use super::lexer::{self, backtrack};
use super::{utils, value, PResult};
use crate::model::{Entry, Field};
use std::borrow::Cow;
use winnow::ascii::multispace0;
use winnow::combinator::opt;
use winnow::prelude::*;

/// Parse a bibliography entry, keeping its source text
pub fn parse_entry<'a>(input: &mut &'a str) -> PResult<Entry<'a>> {
    multispace0.parse_next(input)?;
    let start = *input;
    '@'.parse_next(input)?;

    let mut entry = parse_entry_content(input)?;
    entry.source = Cow::Borrowed(start[..start.len() - input.len()].trim_end());
    Ok(entry)
}

/// Parse the content of an entry after the @
fn parse_entry_content<'a>(input: &mut &'a str) -> PResult<Entry<'a>> {
    let ty = lexer::identifier.parse_next(input)?;
    lexer::skip_whitespace(input);

    let close = if let Some(rest) = input.strip_prefix('{') {
        *input = rest;
        '}'
    } else if let Some(rest) = input.strip_prefix('(') {
        *input = rest;
        ')'
    } else {
        return Err(backtrack());
    };

    let key = utils::ws(opt(lexer::identifier)).parse_next(input)?.unwrap_or_default();
    let fields = if input.starts_with(close) {
        Vec::new()
    } else {
        utils::ws(',').parse_next(input)?;
        parse_fields(input, close)?
    };
    utils::ws(close).parse_next(input)?;

    Ok(Entry {
        ty: Cow::Borrowed(ty),
        key: Cow::Borrowed(key),
        fields,
        source: Cow::Borrowed(""),
    })
}

/// Parse all fields in an entry up to the closing delimiter
fn parse_fields<'a>(input: &mut &'a str, close: char) -> PResult<Vec<Field<'a>>> {
    let mut fields = Vec::new();

    loop {
        lexer::skip_whitespace(input);
        if input.starts_with(close) || input.is_empty() {
            break;
        }

        fields.push(parse_field(input)?);

        lexer::skip_whitespace(input);
        if let Some(rest) = input.strip_prefix(',') {
            *input = rest;
        } else if !input.starts_with(close) {
            return Err(backtrack());
        }
    }

    Ok(fields)
}

/// Parse a single field (name = value)
fn parse_field<'a>(input: &mut &'a str) -> PResult<Field<'a>> {
    let name = utils::ws(lexer::field_name).parse_next(input)?;
    utils::ws('=').parse_next(input)?;
    let value = utils::ws(value::parse_value).parse_next(input)?;

    Ok(Field {
        name: Cow::Borrowed(name),
        value,
    })
}
