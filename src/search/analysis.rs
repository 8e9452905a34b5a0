//! Text analysis shared by index building and querying

use once_cell::sync::Lazy;
use regex::Regex;

/// Shortest token, in chars, that is indexed or searched
pub const MIN_TOKEN_CHARS: usize = 3;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid pattern"));

/// Lower-case, replace every char that is not a word char, whitespace or `-`
/// with a space, and split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Tokens long enough to be indexed, in order of appearance (duplicates kept)
pub fn index_terms(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .collect()
}

/// Query terms, deduplicated with first-occurrence order kept
pub fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in index_terms(query) {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Rough similarity of `query` against `target` in `[0, 1]`.
///
/// 1.0 for an exact match, 0.8 when the target contains the query
/// (case-insensitive), otherwise the fraction of query chars found in order
/// in the target.
pub fn fuzzy_score(query: &str, target: &str) -> f64 {
    if query == target {
        return 1.0;
    }
    if query.is_empty() || target.is_empty() {
        return 0.0;
    }

    let query_lower = query.to_lowercase();
    let target_lower = target.to_lowercase();
    if target_lower.contains(&query_lower) {
        return 0.8;
    }

    let query_chars: Vec<char> = query_lower.chars().collect();
    let mut matched = 0usize;
    for c in target_lower.chars() {
        if matched == query_chars.len() {
            break;
        }
        if c == query_chars[matched] {
            matched += 1;
        }
    }

    matched as f64 / query_chars.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation_keeps_hyphens() {
        assert_eq!(
            tokenize("Bayesian (MCMC) Phylo-genetics, part 2!"),
            vec!["bayesian", "mcmc", "phylo-genetics", "part", "2"]
        );
        assert!(tokenize("  ...  ").is_empty());
    }

    #[test]
    fn test_short_tokens_dropped() {
        assert_eq!(index_terms("An intro to DNA"), vec!["intro", "dna"]);
        assert!(query_terms("a of to").is_empty());
    }

    #[test]
    fn test_unicode_word_chars() {
        assert_eq!(index_terms("Évolution génomique"), vec!["évolution", "génomique"]);
    }

    #[test]
    fn test_query_terms_dedup() {
        assert_eq!(query_terms("tree Tree TREE bootstrap"), vec!["tree", "bootstrap"]);
    }

    #[test]
    fn test_fuzzy_score() {
        assert_eq!(fuzzy_score("tree", "tree"), 1.0);
        assert_eq!(fuzzy_score("Tree", "phylogenetic tree"), 0.8);
        assert_eq!(fuzzy_score("", "tree"), 0.0);
        assert_eq!(fuzzy_score("tre", ""), 0.0);
        // "pyl" in order inside "phylogeny": p, y, l
        assert_eq!(fuzzy_score("pyl", "phylogeny"), 1.0);
        assert_eq!(fuzzy_score("zzzz", "phylogeny"), 0.0);
        assert_eq!(fuzzy_score("phx", "phylogeny"), 2.0 / 3.0);
    }
}
