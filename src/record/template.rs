//! Rendering records through templates
//!
//! A template is plain text in which every word naming a field of the
//! record is replaced by that field's value:
//!
//! ```text
//! author: title. journal volume:pages, year. doi
//! ```
//!
//! Words are runs of alphanumerics and underscores, so `title` is not
//! replaced inside `booktitle`. Anything that is not a field name is copied
//! as is. There are no conditionals.

use super::{FieldValue, Record};
use crate::person::Person;

/// Render `record` through `template`
///
/// Name lists are joined by `", "` and honour the record's `reverse` flag.
/// A non-empty DOI is written as `doi:VALUE`. For record types where
/// editors replace authors, a non-empty editor list takes the place of the
/// `author` placeholder, followed by `(Ed.)`. Empty fields render as
/// nothing and trailing whitespace is trimmed.
pub fn render<R: Record + ?Sized>(template: &str, record: &R) -> String {
    let fields = record.fields();
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;

    while let Some(start) = rest.find(is_word_char) {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let end = tail.find(|c| !is_word_char(c)).unwrap_or(tail.len());
        let word = &tail[..end];

        match fields.iter().find(|(name, _)| *name == word) {
            Some((name, value)) => out.push_str(&substitute(record, name, *value)),
            None => out.push_str(word),
        }
        rest = &tail[end..];
    }
    out.push_str(rest);

    out.truncate(out.trim_end().len());
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn substitute<R: Record + ?Sized>(record: &R, name: &str, value: FieldValue<'_>) -> String {
    match value {
        FieldValue::Names(_)
            if name == "author" && record.record_type().editor_replaces_author() =>
        {
            let editors = record.people("editor");
            if editors.is_empty() {
                join(&record.people(name))
            } else {
                format!("{} (Ed.)", join(&editors))
            }
        }
        FieldValue::Names(_) => join(&record.people(name)),
        FieldValue::Text(doi) if name == "doi" && !doi.is_empty() => format!("doi:{doi}"),
        FieldValue::Text(text) => text.to_string(),
    }
}

fn join(people: &[Person]) -> String {
    people
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
