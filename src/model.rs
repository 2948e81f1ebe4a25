//! Parsed BibTeX entries, before they become records

use crate::person;
use crate::record::RecordType;
use std::borrow::Cow;
use std::fmt;

/// A BibTeX entry as it appears in a bibliography
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<'a> {
    /// Entry type as written (`Article`, `book`, ...)
    pub ty: Cow<'a, str>,
    /// Citation key
    pub key: Cow<'a, str>,
    /// Fields (author, title, year, etc.)
    pub fields: Vec<Field<'a>>,
    /// The original entry text
    pub source: Cow<'a, str>,
}

impl<'a> Entry<'a> {
    /// Create a new entry
    #[must_use]
    pub const fn new(ty: &'a str, key: &'a str) -> Self {
        Self {
            ty: Cow::Borrowed(ty),
            key: Cow::Borrowed(key),
            fields: Vec::new(),
            source: Cow::Borrowed(""),
        }
    }

    /// Entry type, lower-cased
    #[must_use]
    pub fn kind(&self) -> String {
        self.ty.to_lowercase()
    }

    /// Record type matching this entry, if there is one
    #[must_use]
    pub fn entry_type(&self) -> Option<RecordType> {
        RecordType::parse(&self.ty)
    }

    /// Get the citation key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The text this entry was parsed from
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get a field by name (case-insensitive)
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field<'a>> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Get a field value by name (case-insensitive)
    /// Note: This only returns string literals, not numbers
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(|f| f.value.as_str())
    }

    /// Get a field value as a string, converting numbers if necessary
    #[must_use]
    pub fn get_as_string(&self, name: &str) -> Option<String> {
        self.field(name).map(|f| f.value.to_plain_string())
    }

    /// Names of a name-list field (author, editor) split on `and`
    #[must_use]
    pub fn names(&self, name: &str) -> Option<Vec<String>> {
        self.get_as_string(name).map(|v| person::split_names(&v))
    }

    /// Get all fields
    #[must_use]
    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }

    /// Add a field
    pub fn add_field(&mut self, field: Field<'a>) {
        self.fields.push(field);
    }

    /// Required fields of the entry's record type that are absent
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let Some(ty) = self.entry_type() else {
            return Vec::new();
        };
        ty.required_fields()
            .iter()
            .filter(|&&field| match ty.alternative_field(field) {
                Some(alt) => self.field(field).is_none() && self.field(alt).is_none(),
                None => self.field(field).is_none(),
            })
            .copied()
            .collect()
    }

    /// Convert to owned version
    #[must_use]
    pub fn into_owned(self) -> Entry<'static> {
        Entry {
            ty: Cow::Owned(self.ty.into_owned()),
            key: Cow::Owned(self.key.into_owned()),
            fields: self.fields.into_iter().map(Field::into_owned).collect(),
            source: Cow::Owned(self.source.into_owned()),
        }
    }
}

/// A field in a BibTeX entry
#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    /// Field name
    pub name: Cow<'a, str>,
    /// Field value
    pub value: Value<'a>,
}

impl<'a> Field<'a> {
    /// Create a new field
    #[must_use]
    pub const fn new(name: &'a str, value: Value<'a>) -> Self {
        Self {
            name: Cow::Borrowed(name),
            value,
        }
    }

    /// Convert to owned version
    #[must_use]
    pub fn into_owned(self) -> Field<'static> {
        Field {
            name: Cow::Owned(self.name.into_owned()),
            value: self.value.into_owned(),
        }
    }
}

/// A value in a BibTeX field
///
/// `Concat` is boxed so the enum stays the size of a `Cow<str>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String literal
    Literal(Cow<'a, str>),
    /// Number literal
    Number(i64),
    /// Concatenated values
    Concat(Box<Vec<Value<'a>>>),
    /// Variable reference
    Variable(Cow<'a, str>),
}

impl Default for Value<'_> {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl Value<'_> {
    /// Get the value as a string (if it's a simple literal)
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// Flatten to text; unresolved variables keep their name
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        match self {
            Self::Literal(s) | Self::Variable(s) => s.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Concat(parts) => parts.iter().map(Value::to_plain_string).collect(),
        }
    }

    /// Convert to owned version
    #[must_use]
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Self::Literal(s) => Value::Literal(Cow::Owned(s.into_owned())),
            Self::Number(n) => Value::Number(n),
            Self::Variable(s) => Value::Variable(Cow::Owned(s.into_owned())),
            Self::Concat(parts) => {
                Value::Concat(Box::new(parts.into_iter().map(Value::into_owned).collect()))
            }
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => write!(f, "{{{s}}}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Variable(name) => write!(f, "{name}"),
            Self::Concat(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " # ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Entry<'static> {
        let mut entry = Entry::new("Article", "doe-foo-1-1");
        entry.add_field(Field::new(
            "author",
            Value::Literal(Cow::Borrowed("John Doe and Jane Doe")),
        ));
        entry.add_field(Field::new("Title", Value::Literal(Cow::Borrowed("Lorem ipsum"))));
        entry.add_field(Field::new("year", Value::Number(2024)));
        entry
    }

    #[test]
    fn test_kind_is_lowercase() {
        assert_eq!(article().kind(), "article");
        assert_eq!(article().entry_type(), Some(RecordType::Article));
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let entry = article();
        assert_eq!(entry.get("title"), Some("Lorem ipsum"));
        assert_eq!(entry.get("year"), None);
        assert_eq!(entry.get_as_string("year").as_deref(), Some("2024"));
    }

    #[test]
    fn test_names_splits_author_list() {
        assert_eq!(
            article().names("author"),
            Some(vec!["John Doe".to_string(), "Jane Doe".to_string()])
        );
        assert_eq!(article().names("editor"), None);
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(article().missing_fields(), vec!["journal"]);
        assert!(Entry::new("unknown", "x").missing_fields().is_empty());
    }

    #[test]
    fn test_value_display() {
        let value = Value::Concat(Box::new(vec![
            Value::Variable(Cow::Borrowed("jan")),
            Value::Literal(Cow::Borrowed("~1")),
        ]));
        assert_eq!(value.to_string(), "jan # {~1}");
        assert_eq!(value.to_plain_string(), "jan~1");
    }
}
