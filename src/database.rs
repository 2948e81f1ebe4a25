//! Records keyed by citation key

use crate::bibliography::Bibliography;
use crate::record::{Record, RecordType};
use crate::{Error, Result};
use ahash::AHashMap;
use std::ops::{Deref, DerefMut};
use std::path::Path;

/// A collection of bibliographic records
///
/// Records keep their insertion order and are looked up by citation key.
/// Keys are unique.
///
/// ```
/// use bibrecord::{Article, Database};
///
/// let db = Database::parse(r#"
///     @Article{doe-foo-1-1,
///         author = {John Doe},
///         title = {Lorem ipsum},
///         journal = {Foo},
///         volume = {1},
///         pages = {1--2},
///         year = {2024}
///     }
/// "#)?;
///
/// let article = db.get_as::<Article>("doe-foo-1-1").unwrap();
/// assert_eq!(article.to_string(), "John Doe: Lorem ipsum. Foo 1:1--2, 2024.");
/// # Ok::<(), bibrecord::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Database {
    records: Vec<Box<dyn Record>>,
    index: AHashMap<String, usize>,
}

impl Database {
    /// Create an empty database
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse BibTeX and load its entries
    pub fn parse(input: &str) -> Result<Self> {
        let bibliography = Bibliography::parse(input)?;
        Ok(Self::from_bibliography(&bibliography))
    }

    /// Read a BibTeX file and load its entries
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bibliography = Bibliography::from_file(path)?;
        Ok(Self::from_bibliography(&bibliography))
    }

    /// Build a database from all loadable entries of a bibliography
    #[must_use]
    pub fn from_bibliography(bibliography: &Bibliography<'_>) -> Self {
        let mut db = Self::new();
        db.load_bibliography(bibliography);
        db
    }

    /// Add the entries of a bibliography, returning how many were added
    ///
    /// Entries of unknown type and entries whose key is already present
    /// are skipped with a warning.
    pub fn load_bibliography(&mut self, bibliography: &Bibliography<'_>) -> usize {
        let mut added = 0;

        for entry in bibliography.entries() {
            let Some(ty) = entry.entry_type() else {
                tracing::warn!(key = entry.key(), "Unknown record type '{}', skipping", entry.ty);
                continue;
            };
            if self.contains_key(entry.key()) {
                tracing::warn!("Duplicate key '{}', keeping the existing record", entry.key());
                continue;
            }

            let mut record = ty.create();
            if let Err(err) = record.apply_entry(entry) {
                tracing::warn!(key = entry.key(), error = %err, "skipping entry");
                continue;
            }
            self.push(record);
            added += 1;
        }

        tracing::debug!(added, total = self.len(), "loaded bibliography");
        added
    }

    /// Add a record
    ///
    /// Fails with [`Error::DuplicateKey`] if a record with the same key is
    /// present. The database is unchanged in that case.
    pub fn insert(&mut self, record: Box<dyn Record>) -> Result<()> {
        if self.contains_key(record.key()) {
            return Err(Error::DuplicateKey(record.key().to_string()));
        }
        self.push(record);
        Ok(())
    }

    /// Add a record of a concrete type
    pub fn insert_record<R: Record>(&mut self, record: R) -> Result<()> {
        self.insert(Box::new(record))
    }

    fn push(&mut self, record: Box<dyn Record>) {
        self.index.insert(record.key().to_string(), self.records.len());
        self.records.push(record);
    }

    /// Get a record by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&dyn Record> {
        self.index.get(key).map(|&i| &*self.records[i])
    }

    /// Get a record by key for modification
    ///
    /// A key changed through the returned guard is re-indexed when the guard
    /// is dropped. A change to a key that is already taken is reverted.
    pub fn get_mut(&mut self, key: &str) -> Option<RecordMut<'_>> {
        let position = *self.index.get(key)?;
        Some(RecordMut {
            db: self,
            position,
            key: key.to_string(),
        })
    }

    /// Change the key of a record
    ///
    /// Fails with [`Error::KeyNotFound`] if there is no record under `old`
    /// and with [`Error::DuplicateKey`] if `new` is taken by another record.
    pub fn rekey(&mut self, old: &str, new: &str) -> Result<()> {
        let position = *self
            .index
            .get(old)
            .ok_or_else(|| Error::KeyNotFound(old.to_string()))?;
        if old == new {
            return Ok(());
        }
        if self.contains_key(new) {
            return Err(Error::DuplicateKey(new.to_string()));
        }

        self.records[position].set_key(new);
        self.index.remove(old);
        self.index.insert(new.to_string(), position);
        Ok(())
    }

    /// Get a record by key as its concrete type
    #[must_use]
    pub fn get_as<R: Record>(&self, key: &str) -> Option<&R> {
        self.get(key)?.as_any().downcast_ref::<R>()
    }

    /// Whether a record with this key exists
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Remove a record by key
    pub fn remove(&mut self, key: &str) -> Option<Box<dyn Record>> {
        let i = self.index.remove(key)?;
        let record = self.records.remove(i);
        for idx in self.index.values_mut() {
            if *idx > i {
                *idx -= 1;
            }
        }
        Some(record)
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the database holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.key())
    }

    /// Records in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Box<dyn Record>> {
        self.records.iter()
    }

    /// Records of the given type
    #[must_use]
    pub fn find_by_type(&self, ty: RecordType) -> Vec<&dyn Record> {
        self.records
            .iter()
            .filter(|r| r.record_type() == ty)
            .map(|r| &**r)
            .collect()
    }

    /// Set whether all records render names family name first
    pub fn set_reverse(&mut self, reverse: bool) {
        for record in &mut self.records {
            record.set_reverse(reverse);
        }
    }

    /// BibTeX representation of all records, separated by blank lines
    #[must_use]
    pub fn to_bib(&self) -> String {
        self.records
            .iter()
            .map(|r| r.to_bib())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// JSON representation of all records
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Mutable access to a record of a [`Database`]
///
/// Dereferences to the record. Keeps the key index in sync on drop.
#[derive(Debug)]
pub struct RecordMut<'d> {
    db: &'d mut Database,
    position: usize,
    key: String,
}

impl Deref for RecordMut<'_> {
    type Target = dyn Record;

    fn deref(&self) -> &Self::Target {
        &*self.db.records[self.position]
    }
}

impl DerefMut for RecordMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.db.records[self.position]
    }
}

impl Drop for RecordMut<'_> {
    fn drop(&mut self) {
        let record = &mut self.db.records[self.position];
        if record.key() == self.key {
            return;
        }

        let new = record.key().to_string();
        if self.db.index.contains_key(&new) {
            tracing::warn!("Duplicate key '{new}', keeping '{}'", self.key);
            record.set_key(&self.key);
        } else {
            self.db.index.remove(&self.key);
            self.db.index.insert(new, self.position);
        }
    }
}

impl<'d> IntoIterator for &'d Database {
    type Item = &'d Box<dyn Record>;
    type IntoIter = std::slice::Iter<'d, Box<dyn Record>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Database;
    use crate::record::{FieldValue, Record};
    use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

    struct RecordRef<'r>(&'r dyn Record);

    impl Serialize for RecordRef<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let fields: Vec<_> = self
                .0
                .fields()
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .collect();

            let mut map = serializer.serialize_map(Some(fields.len() + 2))?;
            map.serialize_entry("type", self.0.record_type().label())?;
            map.serialize_entry("key", self.0.key())?;
            for (name, value) in fields {
                match value {
                    FieldValue::Text(text) => map.serialize_entry(name, text)?,
                    FieldValue::Names(names) => map.serialize_entry(name, names)?,
                }
            }
            map.end()
        }
    }

    impl Serialize for Database {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for record in self {
                seq.serialize_element(&RecordRef(&**record))?;
            }
            seq.end()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Article, Book, Dataset, Misc};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    const BIB: &str = r"
@Article{doe-foo-1-1,
    author = {John Doe},
    title = {Lorem ipsum},
    journal = {Foo},
    volume = {1},
    pages = {1},
    year = {2024}
}

@Book{doe-j-2024,
    author = {John Doe},
    title = {Lorem ipsum},
    publisher = {Foo},
    address = {Bar},
    year = {2024}
}

@Dataset{doe-zenodo-2024,
    author = {John Doe},
    title = {Lorem ipsum},
    year = {2024},
    publisher = {Zenodo},
    version = {2024-01-29},
    doi = {10.5281/zenodo.00000000},
    url = {https://doi.org/10.5281/zenodo.00000000}
}
";

    #[test]
    fn test_parse_loads_all_records() {
        let db = Database::parse(BIB).unwrap();
        assert_eq!(db.len(), 3);
        assert_eq!(
            db.keys().collect::<Vec<_>>(),
            ["doe-foo-1-1", "doe-j-2024", "doe-zenodo-2024"]
        );
        assert_eq!(db.get("doe-j-2024").map(Record::record_type), Some(RecordType::Book));
        assert_eq!(db.get_as::<Dataset>("doe-zenodo-2024").unwrap().version, "2024-01-29");
        assert!(db.get_as::<Article>("doe-j-2024").is_none());
        assert!(db.get("missing").is_none());
    }

    #[test]
    #[traced_test]
    fn test_duplicate_key_keeps_first() {
        let input = "@Misc{a, title = {First}}\n@Misc{a, title = {Second}}";
        let db = Database::parse(input).unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(db.get("a").and_then(|r| r.get("title")).and_then(|v| v.as_text()), Some("First"));
        assert!(logs_contain("Duplicate key 'a'"));
    }

    #[test]
    #[traced_test]
    fn test_unknown_type_is_skipped() {
        let input = "@Patent{p, title = {Foo}}\n@Misc{m}";
        let mut db = Database::new();
        let bib = Bibliography::parse(input).unwrap();
        assert_eq!(db.load_bibliography(&bib), 1);
        assert!(!db.contains_key("p"));
        assert!(logs_contain("Unknown record type 'Patent'"));
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let mut db = Database::new();
        db.insert_record(Book::with_key("b")).unwrap();
        let err = db.insert_record(Article::with_key("b")).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(key) if key == "b"));
        assert_eq!(db.len(), 1);
        assert!(db.get_as::<Book>("b").is_some());
    }

    #[test]
    fn test_remove_reindexes() {
        let mut db = Database::parse(BIB).unwrap();
        let removed = db.remove("doe-foo-1-1").unwrap();
        assert_eq!(removed.key(), "doe-foo-1-1");
        assert!(db.remove("doe-foo-1-1").is_none());
        assert_eq!(db.len(), 2);
        assert_eq!(db.get("doe-zenodo-2024").map(Record::key), Some("doe-zenodo-2024"));
        assert_eq!(db.get("doe-j-2024").map(Record::key), Some("doe-j-2024"));
    }

    #[test]
    fn test_get_mut_and_set_reverse() {
        let mut db = Database::parse(BIB).unwrap();
        db.get_mut("doe-j-2024").unwrap().set_format("author: title");
        assert_eq!(db.get("doe-j-2024").unwrap().formatted(), "John Doe: Lorem ipsum");

        db.set_reverse(true);
        assert_eq!(db.get("doe-j-2024").unwrap().formatted(), "Doe, John: Lorem ipsum");
        assert!(db.iter().all(|r| r.reverse()));
    }

    #[test]
    fn test_get_mut_reindexes_changed_key() {
        let mut db = Database::new();
        db.insert_record(Misc::with_key("a")).unwrap();
        db.insert_record(Misc::with_key("b")).unwrap();

        db.get_mut("a").unwrap().set_key("c");
        assert_eq!(db.keys().collect::<Vec<_>>(), ["c", "b"]);
        assert!(!db.contains_key("a"));
        assert_eq!(db.get("c").map(Record::key), Some("c"));

        db.insert_record(Misc::with_key("a")).unwrap();
        assert_eq!(db.len(), 3);
    }

    #[test]
    #[traced_test]
    fn test_get_mut_cannot_duplicate_key() {
        let mut db = Database::new();
        db.insert_record(Misc::with_key("a")).unwrap();
        db.insert_record(Misc::with_key("b")).unwrap();

        db.get_mut("a").unwrap().set_key("b");
        assert_eq!(db.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert!(db.contains_key("a"));
        assert!(logs_contain("Duplicate key 'b'"));

        let err = db.insert_record(Misc::with_key("a")).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(key) if key == "a"));
    }

    #[test]
    fn test_rekey() {
        let mut db = Database::new();
        db.insert_record(Misc::with_key("a")).unwrap();
        db.insert_record(Book::with_key("b")).unwrap();

        db.rekey("b", "c").unwrap();
        assert_eq!(db.keys().collect::<Vec<_>>(), ["a", "c"]);
        assert!(db.get_as::<Book>("c").is_some());
        assert!(!db.contains_key("b"));

        assert!(matches!(db.rekey("a", "c"), Err(Error::DuplicateKey(key)) if key == "c"));
        assert!(matches!(db.rekey("x", "y"), Err(Error::KeyNotFound(key)) if key == "x"));
        db.rekey("a", "a").unwrap();
        assert_eq!(db.keys().collect::<Vec<_>>(), ["a", "c"]);
    }

    #[test]
    fn test_find_by_type() {
        let db = Database::parse(BIB).unwrap();
        let books = db.find_by_type(RecordType::Book);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].key(), "doe-j-2024");
        assert!(db.find_by_type(RecordType::Misc).is_empty());
    }

    #[test]
    fn test_to_bib() {
        let mut db = Database::new();
        db.insert_record(Book::with_key("b")).unwrap();
        db.insert_record(Article::with_key("a")).unwrap();
        assert_eq!(db.to_bib(), "@Book{b,\n\n}\n\n@Article{a,\n\n}");
    }

    #[test]
    fn test_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), BIB).unwrap();
        let db = Database::from_file(file.path()).unwrap();
        assert_eq!(db.len(), 3);
        assert!(matches!(Database::from_file(""), Err(Error::EmptyPath)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_to_json() {
        let mut db = Database::new();
        db.insert_record(Book {
            key: "b".into(),
            author: vec!["John Doe".into()],
            year: "2024".into(),
            ..Book::default()
        })
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&db.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "type": "Book",
                "key": "b",
                "author": ["John Doe"],
                "year": "2024"
            }])
        );
    }
}
