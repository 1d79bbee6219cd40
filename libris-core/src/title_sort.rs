//! Title normalization for sorting and alphabetical grouping

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Leading articles dropped from sort keys (English, French, German)
const ARTICLES: &[&str] = &[
    "the ", "a ", "an ", "un ", "une ", "le ", "la ", "les ", "du ", "de ", "des ", "l ", "d ",
    "das ", "dem ", "die ", "der ", "den ", "ein ", "eine ", "einer ", "einem ", "einen ",
    "eines ",
];

/// Reduce a title to its sort key
///
/// The title is NFKD-decomposed first, so accents fall away as combining
/// marks and ligatures expand. Letters and digits are kept lower-cased, runs
/// of whitespace (and apostrophes, so "l'homme" splits like "l homme")
/// collapse into one space, everything else is dropped. A single leading
/// article is then removed.
pub fn trim(title: &str) -> String {
    let mut buffer = String::with_capacity(title.len());
    let mut after_space = false;

    for ch in title.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        let ch = if ch == '\'' || ch.is_whitespace() {
            ' '
        } else {
            ch
        };

        if ch.is_alphanumeric() {
            buffer.extend(ch.to_lowercase());
            after_space = false;
        } else if ch == ' ' {
            if !after_space && !buffer.is_empty() {
                buffer.push(' ');
            }
            after_space = true;
        }
    }

    for article in ARTICLES {
        if let Some(rest) = buffer.strip_prefix(article) {
            return rest.to_string();
        }
    }
    buffer
}

/// The letter a title is grouped under, upper-cased; empty for empty keys
pub fn first_letter(title: &str) -> String {
    trim(title)
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

/// Order two titles by their sort keys
pub fn compare(a: &str, b: &str) -> Ordering {
    trim(a).cmp(&trim(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_articles_are_dropped() {
        assert_eq!(trim("The Lord of the Rings"), "lord of the rings");
        assert_eq!(trim("Les Misérables"), "miserables");
        assert_eq!(trim("L'Étranger"), "etranger");
        assert_eq!(trim("Der Prozess"), "prozess");
    }

    #[test]
    fn test_punctuation_and_spacing() {
        assert_eq!(trim("  Hello,   World!  "), "hello world ");
        assert_eq!(trim("1984"), "1984");
        assert_eq!(trim("..."), "");
    }

    #[test]
    fn test_only_one_article_removed() {
        assert_eq!(trim("A The Book"), "the book");
    }

    #[test]
    fn test_first_letter() {
        assert_eq!(first_letter("the hobbit"), "H");
        assert_eq!(first_letter("«Война и мир»"), "В");
        assert_eq!(first_letter("?!"), "");
        assert_eq!(first_letter("Émile"), "E");
    }

    #[test]
    fn test_compatibility_decomposition() {
        assert_eq!(trim("Émile"), "emile");
        assert_eq!(trim("\u{FB01}nal"), "final");
        assert_eq!(trim("Ångström"), "angstrom");
        assert_eq!(compare("Émile", "Eve"), Ordering::Less);
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare("The Zoo", "An Apple"), Ordering::Greater);
    }
}
