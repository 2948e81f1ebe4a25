//! Load a BibTeX file and print its records

use bibrecord::{Bibliography, Database, Record, Result};
use std::env;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <bibtex-file>", args[0]);
        std::process::exit(1);
    }

    let filename = &args[1];
    println!("Parsing {filename}...");

    let bib = Bibliography::from_file(filename)?;
    let stats = bib.stats();

    println!("\nStatistics:");
    println!("  Entries: {}", stats.total_entries);
    println!("  Strings: {}", stats.total_strings);
    println!("  Preambles: {}", stats.total_preambles);
    println!("  Comments: {}", stats.total_comments);

    println!("\nEntry types:");
    let mut types: Vec<_> = stats.entries_by_type.iter().collect();
    types.sort();
    for (ty, count) in types {
        println!("  {ty}: {count}");
    }

    let db = Database::from_bibliography(&bib);
    println!("\nRecords ({} of {} entries):", db.len(), bib.len());
    for record in &db {
        println!("\n[{}] {}", record.key(), record.formatted());

        let missing = record.missing_fields();
        if !missing.is_empty() {
            println!("    missing: {}", missing.join(", "));
        }
    }

    Ok(())
}
