//! Name similarity scoring on a 0-100 scale
//!
//! The score of two normalized names is the best of:
//!
//! 1. `ratio`: normalized Levenshtein similarity of the whole strings
//! 2. `token_set_ratio`: compares the shared tokens against each side's
//!    shared-plus-remaining tokens, so word order and repeated words do not
//!    matter ("salman salman" vs "salman raouf salman" scores 100)
//!
//! Both measures are symmetric and identical strings score 100.

use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

use crate::normalize::tokens;

/// Similarity score, 0 (unrelated) to 100 (identical)
pub type Score = u8;

/// Highest attainable score
pub const MAX_SCORE: Score = 100;

/// Whole-string edit-distance similarity.
#[inline]
pub fn ratio(a: &str, b: &str) -> Score {
    to_score(normalized_levenshtein(a, b))
}

/// Token-set similarity, insensitive to token order and duplication.
pub fn token_set_ratio(a: &str, b: &str) -> Score {
    let tokens_a: BTreeSet<&str> = tokens(a).collect();
    let tokens_b: BTreeSet<&str> = tokens(b).collect();

    let shared = join(tokens_a.intersection(&tokens_b).copied());
    let only_a = join(tokens_a.difference(&tokens_b).copied());
    let only_b = join(tokens_b.difference(&tokens_a).copied());

    let combined_a = concat(&shared, &only_a);
    let combined_b = concat(&shared, &only_b);

    let mut best = ratio(&combined_a, &combined_b);
    if !shared.is_empty() {
        best = best
            .max(ratio(&shared, &combined_a))
            .max(ratio(&shared, &combined_b));
    }
    best
}

/// Score two normalized names.
pub fn score(a: &str, b: &str) -> Score {
    if a == b {
        return MAX_SCORE;
    }
    ratio(a, b).max(token_set_ratio(a, b))
}

fn to_score(similarity: f64) -> Score {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as Score
}

fn join<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}

fn concat(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        assert_eq!(score("amer mohamed akil rada", "amer mohamed akil rada"), 100);
        assert_eq!(ratio("rada", "rada"), 100);
    }

    #[test]
    fn test_reordering() {
        assert_eq!(token_set_ratio("rada amer", "amer rada"), 100);
        assert_eq!(score("akil rada samer", "samer akil rada"), 100);
    }

    #[test]
    fn test_token_count_difference() {
        assert!(score("salman salman", "salman raouf salman") >= 80);
    }

    #[test]
    fn test_minor_spelling() {
        let s = score("samer akil reda", "samer akil rada");
        assert!(s >= 90, "got {s}");
    }

    #[test]
    fn test_unrelated() {
        assert!(score("john smith", "andree marquez") < 50);
        assert_eq!(token_set_ratio("", "rada"), 0);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            ("salman salman", "salman raouf salman"),
            ("amer rada", "amer mohamed akil rada"),
            ("samer reda", "samer akil rada"),
        ];
        for (a, b) in pairs {
            assert_eq!(score(a, b), score(b, a));
        }
    }
}
