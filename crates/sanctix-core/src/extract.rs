//! Candidate name extraction from unstructured text

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Two to four consecutive capitalized words
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\p{Lu}\p{Ll}+(?:\s+\p{Lu}\p{Ll}+){1,3})\b").expect("name pattern compiles")
});

/// Pull potential person or organization names out of free text.
///
/// Returns each distinct candidate once, in order of first appearance. The
/// results are meant to be fed to [`Matcher::batch_search_names`].
///
/// [`Matcher::batch_search_names`]: crate::Matcher::batch_search_names
pub fn extract_names_from_text(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    NAME_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
