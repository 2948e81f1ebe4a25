//! BibTeX writer for records, databases and bibliographies

use crate::bibliography::Bibliography;
use crate::database::Database;
use crate::model::{Entry, Value};
use crate::record::{FieldValue, Record};
use crate::Result;
use std::io::{self, Write};

/// Configuration for writing BibTeX
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Indentation string (default: a tab)
    pub indent: String,
    /// Separator between names in author and editor fields (default: " AND ")
    pub name_separator: String,
    /// Whether to align field values (default: false)
    pub align_values: bool,
    /// Whether to sort entries by key (default: false)
    pub sort_entries: bool,
    /// Whether to sort fields within entries (default: false)
    pub sort_fields: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            name_separator: " AND ".to_string(),
            align_values: false,
            sort_entries: false,
            sort_fields: false,
        }
    }
}

/// BibTeX representation of a record
///
/// Only non-empty fields are written, each value in braces. An empty
/// record still has its (possibly empty) key and a blank body:
///
/// ```text
/// @Article{,
///
/// }
/// ```
pub fn record_to_bib<R: Record + ?Sized>(record: &R, config: &WriterConfig) -> String {
    let mut fields: Vec<(&str, String)> = record
        .fields()
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| {
            let text = match value {
                FieldValue::Text(text) => text.to_string(),
                FieldValue::Names(_) => record
                    .people(name)
                    .iter()
                    .map(crate::person::Person::to_bib)
                    .collect::<Vec<_>>()
                    .join(&config.name_separator),
            };
            (name, text)
        })
        .collect();

    if config.sort_fields {
        fields.sort_by_key(|(name, _)| *name);
    }

    let width = if config.align_values {
        fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0)
    } else {
        0
    };

    let body = fields
        .iter()
        .map(|(name, value)| format!("{}{name:<width$} = {{{value}}}", config.indent))
        .collect::<Vec<_>>()
        .join(",\n");

    format!("@{}{{{},\n{body}\n}}", record.record_type().label(), record.key())
}

/// BibTeX writer
#[derive(Debug)]
pub struct Writer<W: Write> {
    writer: W,
    config: WriterConfig,
}

impl<W: Write> Writer<W> {
    /// Create a new writer with default configuration
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            config: WriterConfig::default(),
        }
    }

    /// Create a new writer with custom configuration
    pub const fn with_config(writer: W, config: WriterConfig) -> Self {
        Self { writer, config }
    }

    /// Get the inner writer back
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write a single record
    pub fn write_record(&mut self, record: &dyn Record) -> io::Result<()> {
        writeln!(self.writer, "{}", record_to_bib(record, &self.config))
    }

    /// Write all records of a database, separated by blank lines
    pub fn write_database(&mut self, db: &Database) -> io::Result<()> {
        let mut records: Vec<&dyn Record> = db.iter().map(|r| &**r).collect();
        if self.config.sort_entries {
            records.sort_by(|a, b| a.key().cmp(b.key()));
        }

        for (i, record) in records.into_iter().enumerate() {
            if i > 0 {
                writeln!(self.writer)?;
            }
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Write a complete bibliography: preambles, strings, then entries
    pub fn write_bibliography(&mut self, bib: &Bibliography<'_>) -> io::Result<()> {
        for preamble in bib.preambles() {
            write!(self.writer, "@preamble{{")?;
            self.write_value(preamble)?;
            writeln!(self.writer, "}}")?;
            writeln!(self.writer)?;
        }

        let mut strings: Vec<_> = bib.strings().iter().collect();
        strings.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (name, value) in strings {
            write!(self.writer, "@string{{{name} = ")?;
            self.write_value(value)?;
            writeln!(self.writer, "}}")?;
            writeln!(self.writer)?;
        }

        let mut entries: Vec<_> = bib.entries().iter().collect();
        if self.config.sort_entries {
            entries.sort_by(|a, b| a.key.cmp(&b.key));
        }

        for (i, entry) in entries.into_iter().enumerate() {
            if i > 0 {
                writeln!(self.writer)?;
            }
            self.write_entry(entry)?;
        }
        Ok(())
    }

    /// Write a single parsed entry
    pub fn write_entry(&mut self, entry: &Entry<'_>) -> io::Result<()> {
        writeln!(self.writer, "@{}{{{},", entry.ty, entry.key)?;

        let mut fields: Vec<_> = entry.fields().iter().collect();
        if self.config.sort_fields {
            fields.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let width = if self.config.align_values {
            fields.iter().map(|f| f.name.len()).max().unwrap_or(0)
        } else {
            0
        };

        for (i, field) in fields.iter().enumerate() {
            write!(self.writer, "{}{:<width$} = ", self.config.indent, field.name)?;
            self.write_value(&field.value)?;

            if i + 1 < fields.len() {
                writeln!(self.writer, ",")?;
            } else {
                writeln!(self.writer)?;
            }
        }

        writeln!(self.writer, "}}")
    }

    fn write_value(&mut self, value: &Value<'_>) -> io::Result<()> {
        write!(self.writer, "{value}")
    }
}

/// Convenience function to write a database to a string
pub fn to_string(db: &Database) -> Result<String> {
    let mut buf = Vec::new();
    Writer::new(&mut buf).write_database(db)?;
    Ok(String::from_utf8(buf)?)
}

/// Convenience function to write a database to a file
pub fn to_file(db: &Database, path: impl AsRef<std::path::Path>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = Writer::new(io::BufWriter::new(file));
    writer.write_database(db)?;
    writer.into_inner().flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Article, Book, Misc};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_record() {
        assert_eq!(Misc::new().to_bib(), "@Misc{,\n\n}");
        assert_eq!(Misc::with_key("foo").to_bib(), "@Misc{foo,\n\n}");
    }

    #[test]
    fn test_record_fields_in_order() {
        let record = Article {
            title: "Lorem ipsum".into(),
            author: vec!["John Doe".into()],
            ..Article::default()
        };
        assert_eq!(
            record.to_bib(),
            "@Article{,\n\tauthor = {John Doe},\n\ttitle = {Lorem ipsum}\n}"
        );
    }

    #[test]
    fn test_record_names() {
        let mut record = Article {
            author: vec!["John Doe".into(), "Max Mustermann".into()],
            ..Article::default()
        };
        assert_eq!(
            record.to_bib(),
            "@Article{,\n\tauthor = {John Doe AND Max Mustermann}\n}"
        );

        record.author = vec!["John Doe".into()];
        record.reverse = true;
        assert_eq!(record.to_bib(), "@Article{,\n\tauthor = {Doe, John}\n}");

        record.author = vec!["Ludwig van Beethoven".into()];
        record.reverse = false;
        assert_eq!(record.to_bib(), "@Article{,\n\tauthor = {van Beethoven, Ludwig}\n}");
    }

    #[test]
    fn test_record_with_config() {
        let book = Book {
            key: "b".into(),
            title: "T".into(),
            year: "2024".into(),
            editor: vec!["Jane Roe".into(), "John Doe".into()],
            ..Book::default()
        };
        let config = WriterConfig {
            indent: "  ".into(),
            name_separator: " and ".into(),
            align_values: true,
            sort_fields: true,
            ..WriterConfig::default()
        };
        assert_eq!(
            record_to_bib(&book, &config),
            "@Book{b,\n  editor = {Jane Roe and John Doe},\n  title  = {T},\n  year   = {2024}\n}"
        );
    }

    #[test]
    fn test_write_database_sorted() {
        let mut db = Database::new();
        db.insert_record(Misc::with_key("b")).unwrap();
        db.insert_record(Misc::with_key("a")).unwrap();

        let mut buf = Vec::new();
        let config = WriterConfig {
            sort_entries: true,
            ..WriterConfig::default()
        };
        Writer::with_config(&mut buf, config).write_database(&db).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "@Misc{a,\n\n}\n\n@Misc{b,\n\n}\n"
        );
        assert_eq!(to_string(&db).unwrap(), "@Misc{b,\n\n}\n\n@Misc{a,\n\n}\n");
    }

    #[test]
    fn test_write_bibliography() {
        let input = r#"@string{foo = "Foo"}
@preamble{"pre"}
@article{test2023, author = "John Doe", journal = foo, year = 2023}"#;
        let bib = Bibliography::parse(input).unwrap();

        let mut buf = Vec::new();
        Writer::new(&mut buf).write_bibliography(&bib).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "@preamble{{pre}}\n\n@string{foo = {Foo}}\n\n\
             @article{test2023,\n\tauthor = {John Doe},\n\tjournal = {Foo},\n\tyear = 2023\n}\n"
        );
    }

    #[test]
    fn test_to_file() {
        let mut db = Database::new();
        db.insert_record(Misc::with_key("m")).unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        to_file(&db, file.path()).unwrap();
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "@Misc{m,\n\n}\n");
    }
}
