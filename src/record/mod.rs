//! Bibliographic records
//!
//! Each BibTeX entry type with a record type here has its own struct with
//! one public field per BibTeX field. Name lists (`author`, `editor`) are
//! `Vec<String>`, everything else is a `String`. All record types implement
//! [`Record`], so they can be rendered through a template, written as
//! BibTeX, read from BibTeX, and stored side by side in a
//! [`Database`](crate::Database).
//!
//! ```
//! use bibrecord::{Article, Record};
//!
//! let reference = Article {
//!     key: "timm-aaa-300-707".into(),
//!     author: vec!["J. Timmer".into(), "M. König".into()],
//!     title: "On generating power law noise".into(),
//!     journal: "Astronomy and Astrophysics".into(),
//!     volume: "300".into(),
//!     pages: "707--710".into(),
//!     year: "1995".into(),
//!     ..Article::default()
//! };
//!
//! assert_eq!(
//!     reference.formatted(),
//!     "J. Timmer, M. König: On generating power law noise. \
//!      Astronomy and Astrophysics 300:707--710, 1995."
//! );
//! ```

pub mod template;
mod types;

pub use types::{Article, Book, Dataset, InProceedings, Misc, PhdThesis, TechReport};

use crate::bibliography::Bibliography;
use crate::model::Entry;
use crate::parser::value::normalize_value;
use crate::person::{self, Person};
use crate::writer::{record_to_bib, WriterConfig};
use crate::{Error, Result};
use std::any::Any;
use std::fmt;
use std::str::FromStr;

/// Bibliographic record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordType {
    /// Article published in a journal
    Article,
    /// Book with a publisher
    Book,
    /// Published dataset, e.g. on a repository
    Dataset,
    /// Article in conference proceedings
    InProceedings,
    /// Anything that fits nowhere else
    Misc,
    /// `PhD` thesis
    PhdThesis,
    /// Technical report
    TechReport,
}

impl RecordType {
    /// All record types
    pub const ALL: [Self; 7] = [
        Self::Article,
        Self::Book,
        Self::Dataset,
        Self::InProceedings,
        Self::Misc,
        Self::PhdThesis,
        Self::TechReport,
    ];

    /// Parse from a BibTeX entry type (case-insensitive)
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "article" => Some(Self::Article),
            "book" => Some(Self::Book),
            "dataset" => Some(Self::Dataset),
            "inproceedings" | "conference" => Some(Self::InProceedings),
            "misc" => Some(Self::Misc),
            "phdthesis" => Some(Self::PhdThesis),
            "techreport" => Some(Self::TechReport),
            _ => None,
        }
    }

    /// Type name as written in BibTeX output
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Article => "Article",
            Self::Book => "Book",
            Self::Dataset => "Dataset",
            Self::InProceedings => "InProceedings",
            Self::Misc => "Misc",
            Self::PhdThesis => "PhdThesis",
            Self::TechReport => "TechReport",
        }
    }

    /// Fields a complete record of this type has
    #[must_use]
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Article => &["author", "title", "journal", "year"],
            Self::Book | Self::Dataset => &["author", "title", "publisher", "year"],
            Self::InProceedings => &["author", "title", "booktitle", "year"],
            Self::PhdThesis => &["author", "title", "school", "year"],
            Self::TechReport => &["author", "title", "institution", "year"],
            Self::Misc => &[],
        }
    }

    /// Field that may stand in for a required one
    #[must_use]
    pub fn alternative_field(self, field: &str) -> Option<&'static str> {
        (self.editor_replaces_author() && field == "author").then_some("editor")
    }

    /// Whether editors take the place of authors when there are any
    #[must_use]
    pub const fn editor_replaces_author(self) -> bool {
        matches!(self, Self::Book | Self::Dataset)
    }

    /// Create an empty record of this type
    #[must_use]
    pub fn create(self) -> Box<dyn Record> {
        match self {
            Self::Article => Box::new(Article::default()),
            Self::Book => Box::new(Book::default()),
            Self::Dataset => Box::new(Dataset::default()),
            Self::InProceedings => Box::new(InProceedings::default()),
            Self::Misc => Box::new(Misc::default()),
            Self::PhdThesis => Box::new(PhdThesis::default()),
            Self::TechReport => Box::new(TechReport::default()),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::UnknownRecordType(s.to_string()))
    }
}

/// Borrowed view of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'r> {
    /// Plain text
    Text(&'r str),
    /// List of names as written in BibTeX
    Names(&'r [String]),
}

impl<'r> FieldValue<'r> {
    /// Whether the field has no content
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Names(names) => names.is_empty(),
        }
    }

    /// Text content, if this is a text field
    #[must_use]
    pub const fn as_text(&self) -> Option<&'r str> {
        match self {
            Self::Text(s) => Some(*s),
            Self::Names(_) => None,
        }
    }

    /// Names, if this is a name-list field
    #[must_use]
    pub const fn as_names(&self) -> Option<&'r [String]> {
        match self {
            Self::Names(names) => Some(*names),
            Self::Text(_) => None,
        }
    }
}

/// Storage of a single record field
pub(crate) trait FieldSlot {
    fn view(&self) -> FieldValue<'_>;
    fn assign(&mut self, raw: &str);
}

impl FieldSlot for String {
    fn view(&self) -> FieldValue<'_> {
        FieldValue::Text(self)
    }

    fn assign(&mut self, raw: &str) {
        *self = normalize_value(raw);
    }
}

impl FieldSlot for Vec<String> {
    fn view(&self) -> FieldValue<'_> {
        FieldValue::Names(self)
    }

    fn assign(&mut self, raw: &str) {
        *self = person::split_names(&normalize_value(raw));
    }
}

/// A bibliographic record
///
/// Implemented by every record type. The required methods expose the
/// record's data; everything else is provided on top of them.
pub trait Record: fmt::Debug + Any {
    /// Type of this record
    fn record_type(&self) -> RecordType;

    /// Citation key
    fn key(&self) -> &str;

    /// Set the citation key
    fn set_key(&mut self, key: &str);

    /// Template used by [`formatted`](Record::formatted)
    fn format(&self) -> &str;

    /// Replace the template
    fn set_format(&mut self, format: &str);

    /// Whether names are rendered family name first
    fn reverse(&self) -> bool;

    /// Set whether names are rendered family name first
    fn set_reverse(&mut self, reverse: bool);

    /// All fields in BibTeX output order
    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)>;

    /// Assign a field from its BibTeX text; false if the type has no such field
    fn set_field(&mut self, name: &str, value: &str) -> bool;

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Get a field by name
    fn get(&self, name: &str) -> Option<FieldValue<'_>> {
        self.fields()
            .into_iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Names of a name-list field parsed into people
    fn people(&self, field: &str) -> Vec<Person> {
        self.get(field)
            .and_then(|value| value.as_names())
            .unwrap_or_default()
            .iter()
            .map(|name| Person::from_bib(name).with_reverse(self.reverse()))
            .collect()
    }

    /// Render the record through its own template
    fn formatted(&self) -> String {
        template::render(self.format(), self)
    }

    /// Render the record through `template`
    fn format_with(&self, template: &str) -> String {
        template::render(template, self)
    }

    /// BibTeX representation with the default writer configuration
    fn to_bib(&self) -> String {
        record_to_bib(self, &WriterConfig::default())
    }

    /// Read the first entry of a BibTeX snippet into this record
    fn read_bib(&mut self, input: &str) -> Result<()> {
        let bibliography = Bibliography::parse(input)?;
        let entry = bibliography.entries().first().ok_or(Error::NoEntry)?;
        self.apply_entry(entry)
    }

    /// Take key and fields from a parsed entry of the same type
    ///
    /// Fields the record type does not know are skipped.
    fn apply_entry(&mut self, entry: &Entry<'_>) -> Result<()> {
        if entry.entry_type() != Some(self.record_type()) {
            return Err(Error::EntryTypeMismatch {
                expected: self.record_type().to_string(),
                found: entry.kind(),
            });
        }

        self.set_key(entry.key());
        for field in entry.fields() {
            let name = field.name.to_ascii_lowercase();
            if !self.set_field(&name, &field.value.to_plain_string()) {
                tracing::debug!(
                    key = entry.key(),
                    field = %name,
                    "ignoring field unknown to {}",
                    self.record_type()
                );
            }
        }
        Ok(())
    }

    /// Required fields that are empty
    fn missing_fields(&self) -> Vec<&'static str> {
        let ty = self.record_type();
        let is_empty = |name: &str| self.get(name).map_or(true, |v| v.is_empty());
        ty.required_fields()
            .iter()
            .filter(|&&field| match ty.alternative_field(field) {
                Some(alt) => is_empty(field) && is_empty(alt),
                None => is_empty(field),
            })
            .copied()
            .collect()
    }

    /// Fail on the first missing required field
    fn validate(&self) -> Result<()> {
        match self.missing_fields().first() {
            Some(field) => Err(Error::MissingRequiredField {
                entry_type: self.record_type().to_string(),
                field: (*field).to_string(),
            }),
            None => Ok(()),
        }
    }
}
