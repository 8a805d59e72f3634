//! Approximate string matching
//!
//! Levenshtein edit distance, a normalized similarity score, and best-match
//! selection over a candidate list. Works on Unicode scalar values, not bytes.

use serde::Serialize;

/// Default minimum similarity for [`find_best_match`]
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Best candidate found by [`find_best_match`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyMatch {
    pub candidate: String,
    /// 1.0 means identical
    pub similarity: f64,
}

/// Minimum number of single-character insertions, deletions and
/// substitutions turning `a` into `b`
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Full (len(a)+1) x (len(b)+1) table
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in table.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        table[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            table[i][j] = (table[i - 1][j] + 1)
                .min(table[i][j - 1] + 1)
                .min(table[i - 1][j - 1] + cost);
        }
    }

    table[a.len()][b.len()]
}

/// `1 - distance / max(len(a), len(b))`, or 1.0 when both are empty
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / max_len as f64
}

/// Most similar candidate, if it reaches `threshold`
///
/// Ties keep the earliest candidate.
pub fn find_best_match<S: AsRef<str>>(
    input: &str,
    candidates: &[S],
    threshold: f64,
) -> Option<FuzzyMatch> {
    let mut best: Option<(&str, f64)> = None;

    for candidate in candidates {
        let candidate = candidate.as_ref();
        let similarity = string_similarity(input, candidate);
        match best {
            Some((_, top)) if similarity <= top => {}
            _ => best = Some((candidate, similarity)),
        }
    }

    best.filter(|(_, similarity)| *similarity >= threshold)
        .map(|(candidate, similarity)| FuzzyMatch {
            candidate: candidate.to_string(),
            similarity,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_known_values() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("bakso", "bkso"), 1);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("flaw", "lawn"), 2);
    }

    #[test]
    fn test_levenshtein_identity() {
        for s in ["", "a", "bakso", "nasi goreng", "kafé"] {
            assert_eq!(levenshtein_distance(s, s), 0);
        }
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein_distance("kafe", "kafé"), 1);
    }

    #[test]
    fn test_similarity_identity() {
        for s in ["", "x", "bakso", "transportasi"] {
            assert_eq!(string_similarity(s, s), 1.0);
        }
    }

    #[test]
    fn test_similarity_values() {
        assert!((string_similarity("bakso", "bkso") - 0.8).abs() < 1e-9);
        assert_eq!(string_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_find_best_match() {
        let candidates = ["bakso", "mie", "nasi"];
        let found = find_best_match("bkso", &candidates, 0.7).unwrap();
        assert_eq!(found.candidate, "bakso");
        assert!((found.similarity - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_find_best_match_threshold() {
        let candidates = ["bakso", "mie", "nasi"];
        assert!(find_best_match("bkso", &candidates, 0.95).is_none());
    }

    #[test]
    fn test_find_best_match_ties_keep_first() {
        let candidates = vec!["bat".to_string(), "cat".to_string()];
        let found = find_best_match("hat", &candidates, 0.5).unwrap();
        assert_eq!(found.candidate, "bat");
    }

    #[test]
    fn test_find_best_match_empty_candidates() {
        let candidates: [&str; 0] = [];
        assert!(find_best_match("bakso", &candidates, DEFAULT_THRESHOLD).is_none());
    }
}
