use std::collections::HashSet;

use super::normalize::normalize_label;

pub const JACCARD_WEIGHT: f32 = 0.55;
pub const LCS_WEIGHT: f32 = 0.45;

/// Longest-common-subsequence length, O(n·m) time, O(m) space.
pub fn lcs_length(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn char_set(s: &str) -> HashSet<char> {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Similarity of two already-normalized labels in [0, 1].
///
/// `0.55 · Jaccard(charsets) + 0.45 · LCS / max(len)`. Identical strings
/// score 1.0, an empty side scores 0.0.
pub fn normalized_similarity(a: &str, b: &str) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let set_a = char_set(a);
    let set_b = char_set(b);
    let union = set_a.union(&set_b).count();
    let jaccard = if union == 0 {
        0.0
    } else {
        set_a.intersection(&set_b).count() as f32 / union as f32
    };

    let chars_a: Vec<char> = a.chars().collect();
    let chars_b: Vec<char> = b.chars().collect();
    let longest = chars_a.len().max(chars_b.len());
    let lcs_ratio = lcs_length(&chars_a, &chars_b) as f32 / longest as f32;

    (JACCARD_WEIGHT * jaccard + LCS_WEIGHT * lcs_ratio).clamp(0.0, 1.0)
}

/// Normalizes both labels, then scores them.
pub fn label_similarity(a: &str, b: &str) -> f32 {
    normalized_similarity(&normalize_label(a), &normalize_label(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcs_length() {
        let a: Vec<char> = "ABCBDAB".chars().collect();
        let b: Vec<char> = "BDCABA".chars().collect();
        assert_eq!(lcs_length(&a, &b), 4);
        assert_eq!(lcs_length(&a, &[]), 0);
    }

    #[test]
    fn test_identical_after_normalization() {
        assert_eq!(label_similarity("Cancer", " cancer"), 1.0);
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(normalized_similarity("", "abc"), 0.0);
        assert_eq!(normalized_similarity("", ""), 0.0);
        assert_eq!(label_similarity("---", "---"), 0.0);
    }

    #[test]
    fn test_tp53_p53_is_below_default_threshold() {
        let sim = label_similarity("TP53", "p53");
        assert!((sim - 0.75).abs() < 1e-6);
        assert!(sim < 0.8);
        assert!(sim >= 0.3);
    }

    #[test]
    fn test_symmetric_and_bounded() {
        let pairs = [("BRCA1", "BRCA2"), ("apoptosis", "autophagy"), ("α-synuclein", "alpha synuclein")];
        for (a, b) in pairs {
            let ab = label_similarity(a, b);
            assert_eq!(ab, label_similarity(b, a));
            assert!((0.0..=1.0).contains(&ab));
        }
        assert_eq!(label_similarity("α-synuclein", "alpha synuclein"), 1.0);
    }
}
