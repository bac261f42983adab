use super::intent::QueryIntent;
use crate::types::RelationCandidate;

/// Keeps relations the intent allows, best match first, at most `top_n`.
pub fn filter_relations(
    candidates: Vec<RelationCandidate>,
    intent: &QueryIntent,
    top_n: usize,
) -> Vec<RelationCandidate> {
    let mut kept: Vec<RelationCandidate> = candidates
        .into_iter()
        .filter(|r| {
            if !r.score.is_finite() || r.from.is_empty() || r.to.is_empty() {
                tracing::warn!(from = %r.from, to = %r.to, metaedge = %r.metaedge, "Skipping malformed relation candidate");
                return false;
            }
            intent.allows(&r.metaedge)
        })
        .collect();
    kept.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    kept.truncate(top_n);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::IntentRouter;

    fn pool() -> Vec<RelationCandidate> {
        vec![
            RelationCandidate::new("TP53", "BRCA1", "GcG", 0.5),
            RelationCandidate::new("TP53", "MDM2", "GiG", 0.9),
            RelationCandidate::new("breast cancer", "lung cancer", "DrD", 0.95),
            RelationCandidate::new("TP53", "ATM", "GcG", 0.7),
            RelationCandidate::new("TP53", "", "GcG", 0.99),
        ]
    }

    #[test]
    fn test_allow_list_restricts() {
        let intent = IntentRouter::default().route("genes that covary with TP53");
        let kept = filter_relations(pool(), &intent, 6);
        let codes: Vec<(&str, &str)> = kept.iter().map(|r| (r.to.as_str(), r.metaedge.as_str())).collect();
        assert_eq!(codes, vec![("ATM", "GcG"), ("BRCA1", "GcG")]);
    }

    #[test]
    fn test_mixed_intent_only_denies_resemblance() {
        let intent = IntentRouter::default().route("tell me about TP53");
        let kept = filter_relations(pool(), &intent, 2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].to, "MDM2");
        assert!(kept.iter().all(|r| r.metaedge != "DrD"));
    }
}
