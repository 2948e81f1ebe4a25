//! Value parsing for BibTeX fields

use super::lexer::{self, backtrack};
use super::{utils, PResult};
use crate::model::Value;
use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;
use winnow::combinator::{alt, separated};
use winnow::prelude::*;

/// Parse a BibTeX value (string, number, variable, or concatenation)
pub fn parse_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    let mut parts: Vec<Value<'a>> =
        separated(1.., parse_single_value, utils::ws('#')).parse_next(input)?;

    if parts.len() == 1 {
        Ok(parts.remove(0))
    } else {
        Ok(Value::Concat(Box::new(parts)))
    }
}

/// Parse a single value component
fn parse_single_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    alt((
        parse_quoted_value,
        parse_braced_value,
        parse_number_value,
        parse_variable_value,
    ))
    .parse_next(input)
}

fn parse_quoted_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    let s = lexer::quoted_string(input)?;
    Ok(Value::Literal(Cow::Borrowed(s)))
}

fn parse_braced_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    let Some(rest) = input.strip_prefix('{') else {
        return Err(backtrack());
    };
    *input = rest;

    let content = lexer::balanced_braces(input)?;
    *input = input.strip_prefix('}').ok_or_else(backtrack)?;

    Ok(Value::Literal(Cow::Borrowed(content)))
}

fn parse_number_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    lexer::number.map(Value::Number).parse_next(input)
}

fn parse_variable_value<'a>(input: &mut &'a str) -> PResult<Value<'a>> {
    if input.chars().next().map_or(true, char::is_numeric) {
        return Err(backtrack());
    }

    let ident = lexer::identifier(input)?;
    Ok(Value::Variable(Cow::Borrowed(ident)))
}

/// Collapse whitespace runs (including line breaks) and normalise to NFC
#[must_use]
pub fn normalize_value(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .nfc()
        .collect()
}
