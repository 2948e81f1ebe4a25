//! Concrete record types

use super::{FieldSlot, FieldValue, Record, RecordType};
use crate::model::Entry;
use crate::Result;
use std::any::Any;
use std::fmt;

/// Declare record structs, their defaults and their [`Record`] impls
macro_rules! records {
    ($(
        $(#[$meta:meta])*
        $name:ident ($format:literal) {
            $( $(#[$fmeta:meta])* $field:ident : $fty:ty ),+ $(,)?
        }
    )+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(default))]
        pub struct $name {
            /// Citation key
            pub key: String,
            $( $(#[$fmeta])* pub $field: $fty, )+
            /// Template used to render the record
            pub format: String,
            /// Render names family name first
            pub reverse: bool,
        }

        impl $name {
            /// Template new records start with
            pub const DEFAULT_FORMAT: &'static str = $format;

            /// Create an empty record
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Create an empty record with a citation key
            pub fn with_key(key: impl Into<String>) -> Self {
                Self {
                    key: key.into(),
                    ..Self::default()
                }
            }

            /// Read a record from a BibTeX entry
            pub fn from_bib(input: &str) -> Result<Self> {
                let mut record = Self::default();
                record.read_bib(input)?;
                Ok(record)
            }

            /// Build a record from a parsed entry
            pub fn from_entry(entry: &Entry<'_>) -> Result<Self> {
                let mut record = Self::default();
                record.apply_entry(entry)?;
                Ok(record)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    key: String::new(),
                    $( $field: <$fty>::default(), )+
                    format: Self::DEFAULT_FORMAT.to_string(),
                    reverse: false,
                }
            }
        }

        impl Record for $name {
            fn record_type(&self) -> RecordType {
                RecordType::$name
            }

            fn key(&self) -> &str {
                &self.key
            }

            fn set_key(&mut self, key: &str) {
                self.key = key.to_string();
            }

            fn format(&self) -> &str {
                &self.format
            }

            fn set_format(&mut self, format: &str) {
                self.format = format.to_string();
            }

            fn reverse(&self) -> bool {
                self.reverse
            }

            fn set_reverse(&mut self, reverse: bool) {
                self.reverse = reverse;
            }

            fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
                vec![$( (stringify!($field), self.$field.view()) ),+]
            }

            fn set_field(&mut self, name: &str, value: &str) -> bool {
                match name {
                    $( stringify!($field) => self.$field.assign(value), )+
                    _ => return false,
                }
                true
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.formatted())
            }
        }
    )+};
}

records! {
    /// Article published in a journal
    ///
    /// BibTeX requires author, title, journal and year. Volume and pages
    /// are needed to find the article; the DOI is optional.
    Article("author: title. journal volume:pages, year. doi") {
        /// Author names as written in BibTeX
        author: Vec<String>,
        /// Title of the article
        title: String,
        /// Journal the article appeared in
        journal: String,
        /// Year of publication
        year: String,
        /// Journal volume
        volume: String,
        /// Range of pages or article id
        pages: String,
        /// Digital object identifier
        doi: String,
    }

    /// Book
    ///
    /// Give either authors or editors. With editors, the rendered record
    /// lists them in place of authors, followed by "(Ed.)".
    Book("author: title. publisher, address year.") {
        /// Author names as written in BibTeX
        author: Vec<String>,
        /// Editor names as written in BibTeX
        editor: Vec<String>,
        /// Title of the book
        title: String,
        /// Publisher
        publisher: String,
        /// Year of publication
        year: String,
        /// Address of the publisher, usually the city
        address: String,
        /// Edition, if not the first
        edition: String,
    }

    /// Dataset published on a repository such as Zenodo
    Dataset("author: title (version). publisher, doi, year.") {
        /// Author names as written in BibTeX
        author: Vec<String>,
        /// Editor names as written in BibTeX
        editor: Vec<String>,
        /// Title of the dataset
        title: String,
        /// Publisher or repository
        publisher: String,
        /// Year of publication
        year: String,
        /// Version of the dataset
        version: String,
        /// Digital object identifier
        doi: String,
        /// Where to get the data
        url: String,
    }

    /// Article in conference proceedings
    InProceedings("author: title. In: booktitle, pages. publisher, address year. doi") {
        /// Author names as written in BibTeX
        author: Vec<String>,
        /// Title of the article
        title: String,
        /// Title of the proceedings
        booktitle: String,
        /// Year of publication
        year: String,
        /// Range of pages
        pages: String,
        /// Publisher
        publisher: String,
        /// Address of the publisher or venue
        address: String,
        /// Digital object identifier
        doi: String,
    }

    /// `PhD` thesis
    PhdThesis("author: title. PhD thesis, school, address year. doi") {
        /// Author name as written in BibTeX
        author: Vec<String>,
        /// Title of the thesis
        title: String,
        /// University
        school: String,
        /// Year of submission
        year: String,
        /// Address of the university
        address: String,
        /// Digital object identifier
        doi: String,
    }

    /// Technical report issued by an institution
    TechReport("author: title. Technical report number, institution, address year. doi") {
        /// Author names as written in BibTeX
        author: Vec<String>,
        /// Title of the report
        title: String,
        /// Issuing institution
        institution: String,
        /// Year of publication
        year: String,
        /// Report number
        number: String,
        /// Address of the institution
        address: String,
        /// Digital object identifier
        doi: String,
    }

    /// Anything without a better type
    Misc("author: title. howpublished, year. note doi") {
        /// Author names as written in BibTeX
        author: Vec<String>,
        /// Title
        title: String,
        /// How it was published
        howpublished: String,
        /// Year
        year: String,
        /// Free-form note
        note: String,
        /// Digital object identifier
        doi: String,
        /// Where to find it
        url: String,
    }
}
