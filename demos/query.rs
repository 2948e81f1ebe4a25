//! Query records and write them back as BibTeX

use bibrecord::{Article, Book, Database, Record, RecordType, Result};

fn main() -> Result<()> {
    let bibtex = r#"
        @article{einstein1905,
            author = "Albert Einstein",
            title = "Zur Elektrodynamik bewegter K{\"o}rper",
            journal = "Annalen der Physik",
            volume = 322,
            pages = "891--921",
            year = 1905
        }

        @article{einstein1915,
            author = "Albert Einstein",
            title = "Die Feldgleichungen der Gravitation",
            journal = "Sitzungsberichte der Preussischen Akademie der Wissenschaften",
            pages = "844--847",
            year = 1915
        }

        @book{hawking1988,
            author = "Stephen Hawking",
            title = "A Brief History of Time",
            publisher = "Bantam Books",
            address = "New York",
            year = 1988
        }

        @inproceedings{turing1950,
            author = "Alan Turing",
            title = "Computing Machinery and Intelligence",
            booktitle = "Mind",
            year = 1950
        }
    "#;

    let mut db = Database::parse(bibtex)?;

    println!("Articles:");
    for record in db.find_by_type(RecordType::Article) {
        println!("  - {}", record.formatted());
    }

    println!("\nEinstein's papers, short form:");
    for record in &db {
        if let Some(article) = record.as_any().downcast_ref::<Article>() {
            if article.author.iter().any(|a| a.contains("Einstein")) {
                println!("  - {}", article.format_with("author (year): title"));
            }
        }
    }

    db.insert_record(Book {
        key: "abragam-1961".into(),
        author: vec!["A. Abragam".into()],
        title: "Principles of Nuclear Magnetism".into(),
        publisher: "Oxford University Press".into(),
        address: "Oxford".into(),
        year: "1961".into(),
        ..Book::default()
    })?;

    db.set_reverse(true);
    if let Some(book) = db.get_as::<Book>("hawking1988") {
        println!("\nReversed: {book}");
    }

    println!("\nAs BibTeX:\n{}", bibrecord::to_string(&db)?);

    Ok(())
}
