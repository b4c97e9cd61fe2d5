//! Text normalization and edit-distance matching.

use unicode_normalization::UnicodeNormalization;

/// Normalize text for comparison.
///
/// Applies, in order: Unicode compatibility composition (NFKC),
/// lowercasing, removal of everything that is not a letter, digit, or
/// whitespace, and whitespace collapsing. Pure and total.
pub fn normalize(text: &str) -> String {
    text.nfkc()
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Levenshtein distance over characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Two rows instead of the full matrix keep memory bounded.
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Similarity in [0, 1] between two already-normalized strings.
/// Both empty counts as identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (edit_distance(a, b) as f64 / max_len as f64)
}

/// Whether `input` matches `target` after normalization, either exactly
/// or within the similarity threshold.
pub fn fuzzy_match(target: &str, input: &str, threshold: f64) -> bool {
    let target_norm = normalize(target);
    let input_norm = normalize(input);
    if target_norm == input_norm {
        return true;
    }
    similarity(&target_norm, &input_norm) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_lowercases_and_collapses() {
        assert_eq!(normalize("  Hello   WORLD  "), "hello world");
    }

    #[test]
    fn normalize_strips_punctuation() {
        assert_eq!(normalize("TCP/IP, v4!"), "tcpip v4");
    }

    #[test]
    fn normalize_applies_compatibility_composition() {
        // Fullwidth forms fold to their ASCII compatibility equivalents.
        assert_eq!(normalize("ＴＣＰ"), "tcp");
        assert_eq!(normalize("ﬁle"), "file");
    }

    #[test]
    fn normalize_keeps_hangul() {
        assert_eq!(normalize("연결지향 프로토콜"), "연결지향 프로토콜");
    }

    #[test]
    fn normalize_is_total_on_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn edit_distance_classic_cases() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("abc", "abc"), 0);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("saturday", "sunday"), 3);
    }

    #[test]
    fn similarity_of_empties_is_one() {
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn similarity_counts_characters_not_bytes() {
        // One substitution across three Hangul syllables.
        let a = "프로세스";
        let b = "프로세수";
        assert_eq!(edit_distance(a, b), 1);
        assert!(similarity(a, b) > 0.7);
    }

    #[test]
    fn fuzzy_match_is_true_on_self_for_any_threshold() {
        for s in ["a", "hello world", "연결지향"] {
            assert!(fuzzy_match(s, s, 1.0));
            assert!(fuzzy_match(s, s, 0.0));
        }
    }

    #[test]
    fn fuzzy_match_single_edit() {
        // 1 - 1/9 = 0.888...
        assert!(fuzzy_match("Atomicity", "atomicty", 0.85));
        assert!(!fuzzy_match("Atomicity", "atom", 0.85));
    }

    #[test]
    fn fuzzy_match_exact_after_normalization() {
        assert!(fuzzy_match("Hello, World", "hello world!", 1.0));
    }
}
