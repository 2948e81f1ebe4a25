//! Names of people
//!
//! BibTeX splits a name into four parts: first (given names), last (family
//! name), particle (*von*, *van der*) and suffix (*Jr.*, *III*). The parts
//! are recognised from one of these layouts:
//!
//! - `FIRST LAST` and `FIRST PARTICLE LAST`
//! - `LAST, FIRST` and `PARTICLE LAST, FIRST`
//! - `LAST, SUFFIX, FIRST` and `PARTICLE LAST, SUFFIX, FIRST`
//!
//! Braced groups such as `{Barnes and Noble}` are kept intact.

use std::fmt;

/// A person's name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Person {
    /// First or given names
    pub first: String,
    /// Last or family name
    pub last: String,
    /// Particle such as "von", prefixing the last name
    pub particle: String,
    /// Suffix such as "Jr." or "III"
    pub suffix: String,
    /// Render family name first
    pub reverse: bool,
}

impl Person {
    /// Create a person from first and last name
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
            ..Self::default()
        }
    }

    /// Parse a single name as written in a BibTeX name list
    #[must_use]
    pub fn from_bib(name: &str) -> Self {
        let parts: Vec<&str> = split_top_level(name, |c| c == ',')
            .into_iter()
            .map(str::trim)
            .collect();

        let mut person = Self::default();
        match parts.as_slice() {
            [] => {}
            [whole] => person.read_first_last(whole),
            [family, first] => {
                person.read_particle_last(family);
                person.first = collapse(first);
            }
            [family, suffix, first @ ..] => {
                person.read_particle_last(family);
                person.suffix = collapse(suffix);
                person.first = collapse(&first.join(", "));
            }
        }
        person
    }

    /// Set whether to render family name first
    #[must_use]
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// BibTeX representation
    ///
    /// Same as [`Display`](fmt::Display), except that a name with particle
    /// or suffix is always written family name first, as BibTeX requires.
    #[must_use]
    pub fn to_bib(&self) -> String {
        if self.particle.is_empty() && self.suffix.is_empty() {
            self.to_string()
        } else {
            self.render(true)
        }
    }

    fn render(&self, reverse: bool) -> String {
        let mut family = self.last.clone();
        if !self.particle.is_empty() {
            family = format!("{} {family}", self.particle);
        }
        if !self.suffix.is_empty() {
            family = format!("{family}, {}", self.suffix);
        }

        match (self.first.is_empty(), reverse) {
            (true, _) => family,
            (false, true) => format!("{family}, {}", self.first),
            (false, false) => format!("{} {family}", self.first),
        }
    }

    // FIRST [particle] LAST
    fn read_first_last(&mut self, name: &str) {
        let words = split_words(name);
        let Some((last, rest)) = words.split_last() else {
            return;
        };
        self.last = (*last).to_string();

        let lower: Vec<usize> = rest
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, w)| starts_lowercase(w))
            .map(|(i, _)| i)
            .collect();
        match (lower.first(), lower.last()) {
            (Some(&from), Some(&to)) => {
                self.first = rest[..from].join(" ");
                self.particle = rest[from..=to].join(" ");
                if to + 1 < rest.len() {
                    self.last = format!("{} {}", rest[to + 1..].join(" "), self.last);
                }
            }
            _ => self.first = rest.join(" "),
        }
    }

    // [particle] LAST
    fn read_particle_last(&mut self, family: &str) {
        let words = split_words(family);
        let particle_len = words
            .iter()
            .take(words.len().saturating_sub(1))
            .take_while(|w| starts_lowercase(w))
            .count();
        self.particle = words[..particle_len].join(" ");
        self.last = words[particle_len..].join(" ");
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(self.reverse))
    }
}

/// Split a BibTeX name list on the word `and`
///
/// Matching is case-insensitive and ignores `and` inside braces. Whitespace
/// within each name is collapsed.
#[must_use]
pub fn split_names(list: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in split_words(list) {
        if word.eq_ignore_ascii_case("and") {
            if !current.is_empty() {
                names.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(word);
        }
    }
    if !current.is_empty() {
        names.push(current.join(" "));
    }
    names
}

/// Split on `sep` outside of braces
fn split_top_level(s: &str, sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && sep(c) => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn split_words(s: &str) -> Vec<&str> {
    split_top_level(s, char::is_whitespace)
        .into_iter()
        .filter(|w| !w.is_empty())
        .collect()
}

fn collapse(s: &str) -> String {
    split_words(s).join(" ")
}

fn starts_lowercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FIRST: &str = "John";
    const LAST: &str = "Doe";
    const PARTICLE: &str = "van der";
    const SUFFIX: &str = "Jr.";

    #[test]
    fn test_from_bib_sets_first_and_last() {
        for name in ["John Doe", "John   Doe", "  John Doe", "John Doe  ", "Doe, John"] {
            let person = Person::from_bib(name);
            assert_eq!(person.first, FIRST, "{name:?}");
            assert_eq!(person.last, LAST, "{name:?}");
        }
    }

    #[test]
    fn test_from_bib_with_two_first_names() {
        let person = Person::from_bib("John R. Doe");
        assert_eq!(person.first, "John R.");
        assert_eq!(person.last, LAST);
    }

    #[test]
    fn test_from_bib_with_particle() {
        let person = Person::from_bib(&format!("{PARTICLE} {LAST}, {FIRST}"));
        assert_eq!(person.first, FIRST);
        assert_eq!(person.last, LAST);
        assert_eq!(person.particle, PARTICLE);
    }

    #[test]
    fn test_from_bib_with_particle_and_suffix() {
        let person = Person::from_bib(&format!("{PARTICLE} {LAST}, {SUFFIX}, {FIRST}"));
        assert_eq!(person.first, FIRST);
        assert_eq!(person.last, LAST);
        assert_eq!(person.particle, PARTICLE);
        assert_eq!(person.suffix, SUFFIX);
    }

    #[test]
    fn test_from_bib_with_particle_in_natural_order() {
        let person = Person::from_bib("Ludwig van Beethoven");
        assert_eq!(person.first, "Ludwig");
        assert_eq!(person.particle, "van");
        assert_eq!(person.last, "Beethoven");
    }

    #[test]
    fn test_from_bib_single_word_and_braces() {
        let person = Person::from_bib("Plato");
        assert_eq!(person.last, "Plato");
        assert!(person.first.is_empty());
        assert_eq!(person.to_string(), "Plato");

        let person = Person::from_bib("{Barnes, Noble and Co.}");
        assert_eq!(person.last, "{Barnes, Noble and Co.}");
    }

    #[test]
    fn test_to_string() {
        let mut person = Person::new(FIRST, LAST);
        assert_eq!(person.to_string(), "John Doe");

        person.particle = PARTICLE.to_string();
        assert_eq!(person.to_string(), "John van der Doe");

        person.suffix = SUFFIX.to_string();
        assert_eq!(person.to_string(), "John van der Doe, Jr.");

        person.particle.clear();
        assert_eq!(person.to_string(), "John Doe, Jr.");
    }

    #[test]
    fn test_to_string_reversed() {
        for name in [
            "Doe, John",
            "van der Doe, John",
            "Doe, Jr., John",
            "van der Doe, Jr., John",
        ] {
            let person = Person::from_bib(name).with_reverse(true);
            assert_eq!(person.to_string(), name);
        }
    }

    #[test]
    fn test_to_bib_reverses_only_when_needed() {
        assert_eq!(Person::from_bib("Doe, John").to_bib(), "John Doe");
        for name in ["van der Doe, John", "Doe, Jr., John"] {
            let person = Person::from_bib(name);
            assert_eq!(person.to_bib(), name);
            assert!(!person.reverse);
        }
    }

    #[test]
    fn test_split_names() {
        assert_eq!(split_names("John Doe and Jane Doe"), vec!["John Doe", "Jane Doe"]);
        assert_eq!(split_names("John Doe AND\n  Jane Doe"), vec!["John Doe", "Jane Doe"]);
        assert_eq!(split_names("Alexander Andersson"), vec!["Alexander Andersson"]);
        assert_eq!(
            split_names("{Barnes and Noble} and Doe, John"),
            vec!["{Barnes and Noble}", "Doe, John"]
        );
        assert!(split_names("   ").is_empty());
    }

    proptest! {
        #[test]
        fn prop_bib_round_trip(
            first in "[A-Z][a-z]{1,8}( [A-Z]\\.)?",
            last in "[A-Z][a-z]{1,10}",
            particle in prop::option::of("(von|van der|de la)"),
            suffix in prop::option::of("(Jr\\.|III)"),
        ) {
            let person = Person {
                first,
                last,
                particle: particle.unwrap_or_default(),
                suffix: suffix.unwrap_or_default(),
                reverse: false,
            };
            prop_assert_eq!(Person::from_bib(&person.to_bib()), person);
        }
    }
}
