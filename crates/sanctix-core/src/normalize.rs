//! Text normalization for name, location, and identifier matching
//!
//! Name normalization is the single definition of equality for exact
//! matching: two names match exactly iff their normalized forms are equal.
//!
//! - Lowercase, then Unicode NFD with combining marks dropped (diacritics)
//! - Apostrophes removed, other punctuation replaced with a space
//! - Hyphens kept only between two alphanumeric characters
//! - Whitespace collapsed and trimmed
//! - Optionally, standalone honorifics (`mr`, `dr`, ...) removed
//!
//! Every function here is idempotent.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Honorific tokens dropped from names before comparison
const HONORIFICS: &[&str] = &["mr", "mrs", "ms", "dr", "prof", "sr", "jr"];

/// Normalize a person or organization name, stripping honorifics.
///
/// ```
/// use sanctix_core::normalize::normalize_name;
///
/// assert_eq!(normalize_name("  Salman Raouf SALMAN "), "salman raouf salman");
/// assert_eq!(normalize_name("Dr. José  Pérez-Ñúñez"), "jose perez-nunez");
/// ```
pub fn normalize_name(s: &str) -> String {
    normalize_name_with(s, true)
}

/// Normalize a name, choosing whether honorifics are stripped.
///
/// A name made only of honorifics keeps them, so it never normalizes to
/// nothing.
pub fn normalize_name_with(s: &str, strip_honorifics: bool) -> String {
    let folded = fold(s);
    let tokens: Vec<&str> = folded.split_whitespace().collect();

    if strip_honorifics {
        let kept: Vec<&str> = tokens
            .iter()
            .copied()
            .filter(|t| !HONORIFICS.contains(t))
            .collect();
        if !kept.is_empty() {
            return kept.join(" ");
        }
    }

    tokens.join(" ")
}

/// Normalize a city or country for the location index.
pub fn normalize_location(s: &str) -> String {
    normalize_name_with(s, false)
}

/// Normalize an identifier value (passport, national ID, registration number).
///
/// Keeps only alphanumeric characters and uppercases them, so
/// `"ad 059-541"` and `"AD059541"` are the same identifier.
pub fn normalize_identifier(s: &str) -> String {
    s.chars()
        .flat_map(char::to_uppercase)
        .collect::<String>()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Split an already-normalized string into tokens.
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split(' ').filter(|t| !t.is_empty())
}

/// Case-fold, strip diacritics and punctuation, and collapse whitespace.
fn fold(s: &str) -> String {
    let decomposed: Vec<char> = s
        .chars()
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !is_apostrophe(*c))
        .collect();

    let mut out = String::with_capacity(decomposed.len());
    for (i, &c) in decomposed.iter().enumerate() {
        if c.is_alphanumeric() {
            out.push(c);
        } else if c == '-' && is_internal(&decomposed, i) {
            out.push('-');
        } else {
            out.push(' ');
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_internal(chars: &[char], i: usize) -> bool {
    i > 0
        && i + 1 < chars.len()
        && chars[i - 1].is_alphanumeric()
        && chars[i + 1].is_alphanumeric()
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '\u{2018}' | '`')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(normalize_name("Andree   MARQUEZ"), "andree marquez");
        assert_eq!(normalize_name("\tSamer Akil RADA\n"), "samer akil rada");
    }

    #[test]
    fn test_diacritics_stripped() {
        assert_eq!(normalize_name("Andrée Márquez"), "andree marquez");
        assert_eq!(normalize_name("ÇELİK"), "celik");
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(normalize_name("RADA, Amer"), "rada amer");
        assert_eq!(normalize_name("O'Brien"), "obrien");
        assert_eq!(normalize_name("Al-Qard Al-Hassan"), "al-qard al-hassan");
        assert_eq!(normalize_name("Hizb - Allah"), "hizb allah");
        assert_eq!(normalize_name("-leading trailing-"), "leading trailing");
        assert_eq!(normalize_name("a--b"), "a b");
    }

    #[test]
    fn test_honorifics() {
        assert_eq!(normalize_name("Mr. Salman SALMAN Jr."), "salman salman");
        assert_eq!(normalize_name_with("Mr. Salman", false), "mr salman");
        // only honorifics: nothing is stripped
        assert_eq!(normalize_name("Dr."), "dr");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "Dr. José  Pérez-Ñúñez",
            "Mr",
            "ÇELİK , Ahmet",
            "a--b - c-",
            "Ｆｕｌｌ Width",
            "",
        ];
        for input in inputs {
            let once = normalize_name(input);
            assert_eq!(normalize_name(&once), once, "input {input:?}");
            let loc = normalize_location(input);
            assert_eq!(normalize_location(&loc), loc, "input {input:?}");
            let id = normalize_identifier(input);
            assert_eq!(normalize_identifier(&id), id, "input {input:?}");
        }
    }

    #[test]
    fn test_identifier() {
        assert_eq!(normalize_identifier("ad 059-541"), "AD059541");
        assert_eq!(normalize_identifier(" AD059541 "), "AD059541");
        assert_eq!(normalize_identifier("--"), "");
    }

    #[test]
    fn test_location_keeps_honorific_like_tokens() {
        assert_eq!(normalize_location("Ciudad del Este"), "ciudad del este");
        assert_eq!(normalize_location("SR Town"), "sr town");
    }

    #[test]
    fn test_tokens() {
        let tokens: Vec<&str> = tokens("salman raouf salman").collect();
        assert_eq!(tokens, vec!["salman", "raouf", "salman"]);
        assert_eq!(super::tokens("").count(), 0);
    }
}
