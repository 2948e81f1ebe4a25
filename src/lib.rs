//! # bibrecord
//!
//! Bibliographic records in code, with BibTeX in and out.
//!
//! ## Features
//!
//! - One struct per record type (article, book, dataset, ...) with plain
//!   public fields
//! - String rendering through simple templates with named placeholders
//! - BibTeX output per record and per database
//! - BibTeX parsing with string variables, comments and source locations
//!   in errors
//! - A database of records keyed by citation key, loaded from `.bib` files
//!
//! ## Example
//!
//! ```
//! use bibrecord::{Article, Database, Record};
//!
//! let input = r#"
//!     @string{aa = "Astronomy and Astrophysics"}
//!
//!     @Article{timm-aaa-300-707,
//!         author = {J. Timmer and M. K{\"o}nig},
//!         title = {On generating power law noise},
//!         journal = aa,
//!         volume = 300,
//!         pages = {707--710},
//!         year = 1995
//!     }
//! "#;
//!
//! let db = Database::parse(input)?;
//! assert_eq!(db.len(), 1);
//!
//! let record = db.get_as::<Article>("timm-aaa-300-707").unwrap();
//! assert_eq!(record.journal, "Astronomy and Astrophysics");
//! assert_eq!(record.format_with("author (year)"), r#"J. Timmer, M. K{\"o}nig (1995)"#);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod bibliography;
pub mod error;
pub mod model;
pub mod parser;
pub mod person;
pub mod record;

mod database;
mod writer;

pub use bibliography::{Bibliography, BibliographyStats};
pub use database::{Database, RecordMut};
pub use error::{Error, Location, Result};
pub use model::{Entry, Field, Value};
pub use person::Person;
pub use record::{
    Article, Book, Dataset, FieldValue, InProceedings, Misc, PhdThesis, Record, RecordType,
    TechReport,
};
pub use writer::{record_to_bib, to_file, to_string, Writer, WriterConfig};

/// Re-export of the commonly used types
pub mod prelude {
    pub use crate::{
        Article, Bibliography, Book, Database, Dataset, Error, InProceedings, Misc, Person,
        PhdThesis, Record, RecordType, Result, TechReport,
    };
}

/// Parse a BibTeX bibliography from a string
pub fn parse(input: &str) -> Result<Bibliography<'_>> {
    Bibliography::parse(input)
}

/// Parse a BibTeX bibliography from a file
pub fn parse_file(path: impl AsRef<std::path::Path>) -> Result<Bibliography<'static>> {
    Bibliography::from_file(path)
}

/// Load the records of a BibTeX file into a database
pub fn load_file(path: impl AsRef<std::path::Path>) -> Result<Database> {
    Database::from_file(path)
}
