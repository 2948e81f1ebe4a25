//! Parser utilities

use super::lexer::backtrack;
use winnow::ascii::multispace0;
use winnow::error::ContextError;
use winnow::prelude::*;

/// Make a parser whitespace-insensitive
pub fn ws<'a, F, O>(mut parser: F) -> impl Parser<&'a str, O, ContextError>
where
    F: Parser<&'a str, O, ContextError>,
{
    move |input: &mut &'a str| {
        let _ = multispace0.parse_next(input)?;
        let output = parser.parse_next(input)?;
        let _ = multispace0.parse_next(input)?;
        Ok(output)
    }
}

/// Case-insensitive tag parser
#[must_use]
pub fn tag_no_case<'a>(tag: &'static str) -> impl Parser<&'a str, &'a str, ContextError> {
    move |input: &mut &'a str| {
        let head = input.get(..tag.len()).ok_or_else(backtrack)?;
        if head.eq_ignore_ascii_case(tag) {
            *input = &input[tag.len()..];
            Ok(head)
        } else {
            Err(backtrack())
        }
    }
}

/// Byte offset → 1-indexed (line, column)
#[must_use]
pub fn position(input: &str, offset: usize) -> (usize, usize) {
    let consumed = &input[..offset.min(input.len())];
    let line = consumed.matches('\n').count() + 1;
    let column = consumed
        .rfind('\n')
        .map_or(consumed, |nl| &consumed[nl + 1..])
        .chars()
        .count()
        + 1;
    (line, column)
}

/// Get a snippet of input for error messages
#[must_use]
pub fn snippet(input: &str, max_chars: usize) -> String {
    let mut chars = input.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws() {
        let mut input = "  hello  world  ";
        let mut parser = ws("hello");
        assert_eq!(parser.parse_next(&mut input).unwrap(), "hello");
        assert_eq!(input, "world  ");
    }

    #[test]
    fn test_tag_no_case() {
        let mut input = "STRING{...}";
        assert_eq!(tag_no_case("string").parse_next(&mut input).unwrap(), "STRING");
        assert_eq!(input, "{...}");

        let mut input = "str";
        assert!(tag_no_case("string").parse_next(&mut input).is_err());
    }

    #[test]
    fn test_position() {
        let input = "@article{a,\n  title = {x}\n}";
        assert_eq!(position(input, 0), (1, 1));
        assert_eq!(position(input, 14), (2, 3));
    }

    #[test]
    fn test_snippet_truncates() {
        assert_eq!(snippet("abcdef", 3), "abc...");
        assert_eq!(snippet("abc", 3), "abc");
    }
}
