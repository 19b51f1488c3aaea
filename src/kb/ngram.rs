//! Text normalisation and character n-gram extraction.
//!
//! The same normalisation is applied at index time and at query time; any
//! divergence between the two silently loses matches, so every caller goes
//! through [`normalize`].

use std::collections::HashMap;

use unicode_general_category::{get_general_category, GeneralCategory};

/// Occurrence counts for the n-grams of a single field of a single document.
pub type GramCounts = HashMap<String, usize>;

/// True for every code point in the Unicode punctuation category (P*),
/// regardless of script. Symbols (S*) such as `+` or `$` are kept.
fn is_punctuation(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}

/// Lowercase the input and drop every whitespace or punctuation code point.
pub fn normalize(s: &str) -> Vec<char> {
    s.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !c.is_whitespace() && !is_punctuation(*c))
        .collect()
}

/// Overlapping n-grams of the normalised input. Returns an empty vector when
/// fewer than `n` code points survive normalisation.
pub fn ngrams(s: &str, n: usize) -> Vec<String> {
    let n = n.max(2);
    let norm = normalize(s);
    if norm.len() < n {
        return Vec::new();
    }
    norm.windows(n).map(|w| w.iter().collect()).collect()
}

/// N-gram occurrence counts for one field. Frequency, not set membership: a
/// gram appearing three times counts three.
pub fn count_ngrams(s: &str, n: usize) -> GramCounts {
    let mut counts = GramCounts::new();
    for gram in ngrams(s, n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}
