//! Parsed BibTeX files

use crate::model::{Entry, Value};
use crate::parser::{self, ParsedItem};
use crate::{Error, Result};
use ahash::AHashMap;
use lazy_static::lazy_static;
use std::borrow::Cow;
use std::path::Path;

lazy_static! {
    /// Month macros every BibTeX style defines
    static ref MONTHS: AHashMap<&'static str, &'static str> = [
        ("jan", "January"),
        ("feb", "February"),
        ("mar", "March"),
        ("apr", "April"),
        ("may", "May"),
        ("jun", "June"),
        ("jul", "July"),
        ("aug", "August"),
        ("sep", "September"),
        ("oct", "October"),
        ("nov", "November"),
        ("dec", "December"),
    ]
    .into_iter()
    .collect();
}

/// The content of a BibTeX file
///
/// Entries keep the order they appear in. `@string` variables are expanded
/// while parsing, so entry fields hold literals and numbers only.
#[derive(Debug, Clone, Default)]
pub struct Bibliography<'a> {
    entries: Vec<Entry<'a>>,
    strings: AHashMap<Cow<'a, str>, Value<'a>>,
    preambles: Vec<Value<'a>>,
    comments: Vec<Cow<'a, str>>,
}

impl<'a> Bibliography<'a> {
    /// Create an empty bibliography
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a bibliography
    ///
    /// Fails with [`Error::EmptyInput`] if there is nothing but whitespace.
    pub fn parse(input: &'a str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let items = parser::parse_bibtex(input)?;
        let mut bib = Self::new();

        // Strings may be used before they are defined
        for item in &items {
            if let ParsedItem::String(name, value) = item {
                bib.strings.insert(macro_name(name), value.clone());
            }
        }

        let mut expansion = Expansion::default();
        for item in items {
            match item {
                ParsedItem::Entry(mut entry) => {
                    for field in &mut entry.fields {
                        let value = std::mem::take(&mut field.value);
                        field.value = bib.expand(value, &mut expansion)?;
                    }
                    bib.entries.push(entry);
                }
                ParsedItem::Preamble(value) => {
                    let expanded = bib.expand(value, &mut expansion)?;
                    bib.preambles.push(expanded);
                }
                ParsedItem::Comment(text) => bib.comments.push(Cow::Borrowed(text)),
                ParsedItem::String(..) => {}
            }
        }

        tracing::debug!(
            entries = bib.entries.len(),
            strings = bib.strings.len(),
            "parsed bibliography"
        );
        Ok(bib)
    }

    /// Merge another bibliography into this one
    pub fn merge(&mut self, other: Bibliography<'a>) {
        self.entries.extend(other.entries);
        self.strings.extend(other.strings);
        self.preambles.extend(other.preambles);
        self.comments.extend(other.comments);
    }

    /// Get all entries
    #[must_use]
    pub fn entries(&self) -> &[Entry<'a>] {
        &self.entries
    }

    /// Get all string definitions
    #[must_use]
    pub const fn strings(&self) -> &AHashMap<Cow<'a, str>, Value<'a>> {
        &self.strings
    }

    /// Get all preambles
    #[must_use]
    pub fn preambles(&self) -> &[Value<'a>] {
        &self.preambles
    }

    /// Get all comments
    #[must_use]
    pub fn comments(&self) -> &[Cow<'a, str>] {
        &self.comments
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry by key
    #[must_use]
    pub fn find_by_key(&self, key: &str) -> Option<&Entry<'a>> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Find entries by type (case-insensitive)
    #[must_use]
    pub fn find_by_type(&self, ty: &str) -> Vec<&Entry<'a>> {
        self.entries
            .iter()
            .filter(|e| e.ty.eq_ignore_ascii_case(ty))
            .collect()
    }

    /// Find entries whose field contains `value`
    #[must_use]
    pub fn find_by_field(&self, field: &str, value: &str) -> Vec<&Entry<'a>> {
        self.entries
            .iter()
            .filter(|e| e.get_as_string(field).is_some_and(|v| v.contains(value)))
            .collect()
    }

    /// Add an entry
    pub fn add_entry(&mut self, entry: Entry<'a>) {
        self.entries.push(entry);
    }

    /// Add a string definition
    ///
    /// Names are case-insensitive.
    pub fn add_string(&mut self, name: &'a str, value: Value<'a>) {
        self.strings.insert(macro_name(name), value);
    }

    /// Resolve all variables in `value`
    pub fn expand_value(&self, value: &Value<'a>) -> Result<Value<'a>> {
        self.expand(value.clone(), &mut Expansion::default())
    }

    fn expand(&self, value: Value<'a>, state: &mut Expansion<'a>) -> Result<Value<'a>> {
        match value {
            Value::Literal(_) | Value::Number(_) => Ok(value),
            Value::Variable(name) => {
                let key = name.to_lowercase();
                if let Some(done) = state.done.get(&key) {
                    return Ok(done.clone());
                }
                if state.stack.contains(&key) {
                    return Err(Error::CircularReference(name.into_owned()));
                }

                let resolved = self
                    .lookup(&key)
                    .map_err(|_| Error::UndefinedVariable(name.into_owned()))?;
                state.stack.push(key.clone());
                let expanded = self.expand(resolved, state);
                state.stack.pop();

                let expanded = expanded?;
                state.done.insert(key, expanded.clone());
                Ok(expanded)
            }
            Value::Concat(parts) => {
                let mut text = String::new();
                for part in *parts {
                    text.push_str(&self.expand(part, state)?.to_plain_string());
                }
                Ok(Value::Literal(Cow::Owned(text)))
            }
        }
    }

    /// Look up a lower-cased macro name
    fn lookup(&self, key: &str) -> Result<Value<'a>> {
        if let Some(value) = self.strings.get(key) {
            return Ok(value.clone());
        }
        MONTHS
            .get(key)
            .map(|month| Value::Literal(Cow::Borrowed(*month)))
            .ok_or_else(|| Error::UndefinedVariable(key.to_string()))
    }

    /// Get statistics about the bibliography
    #[must_use]
    pub fn stats(&self) -> BibliographyStats {
        let mut entries_by_type = AHashMap::new();
        for entry in &self.entries {
            *entries_by_type.entry(entry.kind()).or_insert(0) += 1;
        }

        BibliographyStats {
            total_entries: self.entries.len(),
            total_strings: self.strings.len(),
            total_preambles: self.preambles.len(),
            total_comments: self.comments.len(),
            entries_by_type,
        }
    }

    /// Convert to owned version (no borrowed data)
    #[must_use]
    pub fn into_owned(self) -> Bibliography<'static> {
        Bibliography {
            entries: self.entries.into_iter().map(Entry::into_owned).collect(),
            strings: self
                .strings
                .into_iter()
                .map(|(k, v)| (Cow::Owned(k.into_owned()), v.into_owned()))
                .collect(),
            preambles: self.preambles.into_iter().map(Value::into_owned).collect(),
            comments: self
                .comments
                .into_iter()
                .map(|c| Cow::Owned(c.into_owned()))
                .collect(),
        }
    }
}

impl Bibliography<'static> {
    /// Read and parse a bibliography file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::EmptyPath);
        }

        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "read bibliography");
        Bibliography::parse(&content).map(Bibliography::into_owned)
    }
}

/// Macro names compare case-insensitively, so they are stored lower-cased
fn macro_name(name: &str) -> Cow<'_, str> {
    if name.chars().any(char::is_uppercase) {
        Cow::Owned(name.to_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

/// Variable expansion state, shared by all values of one bibliography
#[derive(Debug, Default)]
struct Expansion<'a> {
    /// Names being expanded, innermost last
    stack: Vec<String>,
    /// Names already expanded
    done: AHashMap<String, Value<'a>>,
}

/// Statistics about a bibliography
#[derive(Debug, Clone)]
pub struct BibliographyStats {
    /// Total number of entries
    pub total_entries: usize,
    /// Total number of string definitions
    pub total_strings: usize,
    /// Total number of preambles
    pub total_preambles: usize,
    /// Total number of comments
    pub total_comments: usize,
    /// Entry counts by lower-cased type
    pub entries_by_type: AHashMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_expands_strings() {
        let input = r#"
            @string{me = "John Doe"}

            @article{test2023,
                author = me,
                title = "Test Article",
                year = 2023
            }
        "#;

        let bib = Bibliography::parse(input).unwrap();
        assert_eq!(bib.len(), 1);
        assert_eq!(bib.strings().len(), 1);
        assert_eq!(bib.entries()[0].get("author"), Some("John Doe"));
        assert_eq!(bib.entries()[0].field("year").map(|f| &f.value), Some(&Value::Number(2023)));
    }

    #[test]
    fn test_literals_stay_borrowed() {
        let bib = Bibliography::parse("@misc{test, title = \"This is borrowed\"}").unwrap();
        let value = &bib.entries()[0].field("title").unwrap().value;
        assert!(matches!(value, Value::Literal(Cow::Borrowed(_))));
    }

    #[test]
    fn test_concatenation_and_nested_strings() {
        let input = r#"
            @string{first = "Hello"}
            @string{greeting = first # ", "}
            @article{test, title = greeting # "World", note = "Vol. " # 3}
        "#;

        let bib = Bibliography::parse(input).unwrap();
        let entry = &bib.entries()[0];
        assert_eq!(entry.get("title"), Some("Hello, World"));
        assert_eq!(entry.get("note"), Some("Vol. 3"));
    }

    #[test]
    fn test_string_used_before_definition() {
        let input = "@misc{a, publisher = pub}\n@string{pub = {Foo}}";
        let bib = Bibliography::parse(input).unwrap();
        assert_eq!(bib.entries()[0].get("publisher"), Some("Foo"));
    }

    #[test]
    fn test_month_macros() {
        let bib = Bibliography::parse("@misc{a, month = jan # \"~1\", year = 2024}").unwrap();
        assert_eq!(bib.entries()[0].get("month"), Some("January~1"));

        let bib = Bibliography::parse("@string{jan = {Jänner}}\n@misc{a, month = jan}").unwrap();
        assert_eq!(bib.entries()[0].get("month"), Some("Jänner"));
    }

    #[test]
    fn test_string_names_ignore_case() {
        let input = "@string{AA = {Astronomy}}\n@article{a, journal = aa, note = Aa}";
        let bib = Bibliography::parse(input).unwrap();
        assert_eq!(bib.entries()[0].get("journal"), Some("Astronomy"));
        assert_eq!(bib.entries()[0].get("note"), Some("Astronomy"));
        assert!(bib.strings().contains_key("aa"));

        let bib = Bibliography::parse("@misc{a, month = JAN}").unwrap();
        assert_eq!(bib.entries()[0].get("month"), Some("January"));

        let mut bib = Bibliography::new();
        bib.add_string("OUP", Value::Literal(Cow::Borrowed("Oxford")));
        let value = bib.expand_value(&Value::Variable(Cow::Borrowed("oup"))).unwrap();
        assert_eq!(value, Value::Literal(Cow::Borrowed("Oxford")));
    }

    #[test]
    fn test_shared_strings_expand_once() {
        // Each level uses the one below twice; without reuse this never finishes
        let mut input = String::from("@string{s0 = {}}\n");
        for i in 1..=40 {
            input.push_str(&format!("@string{{s{i} = s{} # s{}}}\n", i - 1, i - 1));
        }
        input.push_str("@misc{m, note = s40 # {x} # s40, title = s39}\n");

        let bib = Bibliography::parse(&input).unwrap();
        assert_eq!(bib.entries()[0].get("note"), Some("x"));
        assert_eq!(bib.entries()[0].get("title"), Some(""));
    }

    #[test]
    fn test_undefined_variable() {
        let err = Bibliography::parse("@misc{a, journal = aa}").unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable(name) if name == "aa"));
    }

    #[test]
    fn test_circular_reference() {
        let input = "@string{a = b}\n@string{b = {x} # a}\n@misc{m, note = a}";
        let err = Bibliography::parse(input).unwrap_err();
        assert!(matches!(err, Error::CircularReference(_)));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(Bibliography::parse(""), Err(Error::EmptyInput)));
        assert!(matches!(Bibliography::parse(" \n\t"), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_find_and_stats() {
        let input = r#"
            @string{ieee = "IEEE"}
            @preamble{"Test preamble"}
            @comment{This is a formal comment}
            @article{a1, title = "Article 1", publisher = ieee}
            @Article{a2, title = "Article 2"}
            @book{b1, title = "Book 1", publisher = ieee}
        "#;

        let bib = Bibliography::parse(input).unwrap();
        assert_eq!(bib.find_by_key("a2").map(Entry::key), Some("a2"));
        assert!(bib.find_by_key("missing").is_none());
        assert_eq!(bib.find_by_type("ARTICLE").len(), 2);
        assert_eq!(bib.find_by_field("publisher", "EE").len(), 2);

        let stats = bib.stats();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.total_strings, 1);
        assert_eq!(stats.total_preambles, 1);
        assert_eq!(stats.total_comments, 1);
        assert_eq!(stats.entries_by_type.get("article"), Some(&2));
        assert_eq!(stats.entries_by_type.get("book"), Some(&1));
    }

    #[test]
    fn test_merge() {
        let mut bib = Bibliography::parse("@misc{a}").unwrap();
        bib.merge(Bibliography::parse("@misc{b}\n@string{x = {y}}").unwrap());
        assert_eq!(bib.len(), 2);
        assert_eq!(bib.strings().len(), 1);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "@book{{b1, title = {{Book}}}}").unwrap();

        let bib = Bibliography::from_file(file.path()).unwrap();
        assert_eq!(bib.entries()[0].key(), "b1");
    }

    #[test]
    fn test_from_file_errors() {
        assert!(matches!(Bibliography::from_file(""), Err(Error::EmptyPath)));
        assert!(matches!(
            Bibliography::from_file("/nonexistent/refs.bib"),
            Err(Error::IoError(_))
        ));
    }
}
