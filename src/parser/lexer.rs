//! Lexical analysis for BibTeX

use super::PResult;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::{
    ascii::digit1,
    combinator::{alt, opt},
    token::take_while,
};

/// Parse an identifier (entry types, citation keys, string names)
pub fn identifier<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '/' | '+' | '\'')
    })
    .parse_next(input)
}

/// Parse a field name
pub fn field_name<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(1.., |c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.'))
        .parse_next(input)
}

/// Parse the content of balanced braces, stopping before the closing `}`
pub fn balanced_braces<'a>(input: &mut &'a str) -> PResult<&'a str> {
    let original = *input;
    let bytes = original.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;

    while let Some(offset) = memchr::memchr3(b'{', b'}', b'\\', &bytes[pos..]) {
        pos += offset;
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' if depth == 0 => {
                *input = &original[pos..];
                return Ok(&original[..pos]);
            }
            b'}' => depth -= 1,
            // escaped character, skip it
            _ if pos + 1 < bytes.len() => {
                pos += 2;
                continue;
            }
            _ => {}
        }
        pos += 1;
    }

    Err(backtrack())
}

/// Parse a quoted string "...", returning the content without quotes
pub fn quoted_string<'a>(input: &mut &'a str) -> PResult<&'a str> {
    let start = *input;
    let bytes = start.as_bytes();

    if bytes.first() != Some(&b'"') {
        return Err(backtrack());
    }

    let mut pos = 1;
    let mut brace_depth = 0usize;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if pos + 1 < bytes.len() => pos += 2,
            b'"' if brace_depth == 0 => {
                *input = &start[pos + 1..];
                return Ok(&start[1..pos]);
            }
            b'{' => {
                brace_depth += 1;
                pos += 1;
            }
            b'}' if brace_depth > 0 => {
                brace_depth -= 1;
                pos += 1;
            }
            _ => pos += 1,
        }
    }

    Err(backtrack())
}

/// Parse a number (integer)
pub fn number(input: &mut &str) -> PResult<i64> {
    let sign = opt(alt(('+', '-'))).parse_next(input)?;
    let digits = digit1.parse_next(input)?;

    let num = digits.parse::<i64>().map_err(|_| backtrack())?;

    Ok(if sign == Some('-') { -num } else { num })
}

/// Skip ASCII whitespace
pub fn skip_whitespace(input: &mut &str) {
    *input = input.trim_start_matches([' ', '\t', '\n', '\r']);
}

/// The recoverable error used throughout the parser
pub(crate) fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::default())
}
