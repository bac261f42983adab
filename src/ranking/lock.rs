use std::collections::BTreeMap;

use crate::retrieval::semantic::tokens;
use crate::types::EntityCandidate;

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("p53", "TP53"),
    ("tp53", "TP53"),
    ("trp53", "TP53"),
    ("brca1", "BRCA1"),
    ("brca2", "BRCA2"),
    ("her2", "ERBB2"),
    ("erbb2", "ERBB2"),
    ("egfr", "EGFR"),
    ("kras", "KRAS"),
];

pub const DISEASE_KEYWORDS: &[&str] = &[
    "cancer",
    "tumor",
    "tumour",
    "carcinoma",
    "leukemia",
    "lymphoma",
    "melanoma",
    "glioma",
    "disease",
    "syndrome",
    "disorder",
    "diabetes",
];

/// Core-entity lock: a disease keyword plus a known gene alias in the same
/// query pins the alias's canonical gene into the ranked result.
#[derive(Debug, Clone)]
pub struct CoreEntityLock {
    aliases: BTreeMap<String, String>,
}

impl Default for CoreEntityLock {
    fn default() -> Self {
        Self::new(DEFAULT_ALIASES.iter().map(|(a, c)| (a.to_string(), c.to_string())))
    }
}

impl CoreEntityLock {
    pub fn new<I: IntoIterator<Item = (String, String)>>(aliases: I) -> Self {
        Self {
            aliases: aliases
                .into_iter()
                .map(|(alias, canonical)| (alias.to_lowercase(), canonical))
                .collect(),
        }
    }

    pub fn canonical(&self, token: &str) -> Option<&str> {
        self.aliases.get(&token.to_lowercase()).map(String::as_str)
    }

    /// Canonical id of the first alias token in a disease-keyword query.
    pub fn detect(&self, query: &str) -> Option<String> {
        if !mentions_disease(query) {
            return None;
        }
        let lowered = query.to_lowercase();
        let mut ordered: Vec<(usize, &str)> = tokens(query)
            .into_iter()
            .filter_map(|t| {
                let canonical = self.aliases.get(&t)?;
                lowered.find(t.as_str()).map(|pos| (pos, canonical.as_str()))
            })
            .collect();
        ordered.sort();
        ordered.first().map(|(_, canonical)| canonical.to_string())
    }

    /// Known alias or canonical id, or an uppercase gene-symbol-shaped token.
    pub fn is_gene_like(&self, name: &str) -> bool {
        let trimmed = name.trim();
        if self.aliases.contains_key(&trimmed.to_lowercase())
            || self.aliases.values().any(|c| c == trimmed)
        {
            return true;
        }
        let mut chars = trimmed.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        (2..=10).contains(&trimmed.len())
            && first.is_ascii_uppercase()
            && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
            && trimmed.chars().any(|c| c.is_ascii_digit())
    }

    /// Boosts the core entity to full similarity and the pool's top PageRank,
    /// injecting a synthetic candidate when it is missing.
    pub fn apply(&self, core: &str, candidates: &mut Vec<EntityCandidate>) {
        let top_pagerank = candidates
            .iter()
            .map(|c| c.pagerank)
            .filter(|p| p.is_finite())
            .fold(0.0_f32, f32::max);

        match candidates.iter_mut().find(|c| c.name.eq_ignore_ascii_case(core)) {
            Some(existing) => {
                existing.similarity = 1.0;
                existing.pagerank = top_pagerank.max(existing.pagerank);
                tracing::debug!(core, "Core entity boosted");
            }
            None => {
                candidates.push(EntityCandidate {
                    synthetic: true,
                    ..EntityCandidate::new(core, 1.0)
                        .with_type("Gene")
                        .with_pagerank(top_pagerank)
                });
                tracing::debug!(core, "Core entity injected");
            }
        }
    }
}

pub fn mentions_disease(query: &str) -> bool {
    let lowered = query.to_lowercase();
    DISEASE_KEYWORDS.iter().any(|k| lowered.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_requires_disease_keyword() {
        let lock = CoreEntityLock::default();
        assert_eq!(lock.detect("role of p53 in breast cancer"), Some("TP53".to_string()));
        assert_eq!(lock.detect("HER2 positive tumour"), Some("ERBB2".to_string()));
        assert_eq!(lock.detect("what does p53 bind"), None);
        assert_eq!(lock.detect("breast cancer risk factors"), None);
    }

    #[test]
    fn test_first_alias_in_query_wins() {
        let lock = CoreEntityLock::default();
        assert_eq!(lock.detect("KRAS and TP53 in lung cancer"), Some("KRAS".to_string()));
    }

    #[test]
    fn test_gene_like() {
        let lock = CoreEntityLock::default();
        assert!(lock.is_gene_like("TP53"));
        assert!(lock.is_gene_like("egfr"));
        assert!(lock.is_gene_like("CDKN2A"));
        assert!(!lock.is_gene_like("Breast Cancer"));
        assert!(!lock.is_gene_like("DNA"));
    }

    #[test]
    fn test_apply_boosts_existing() {
        let lock = CoreEntityLock::default();
        let mut candidates = vec![
            EntityCandidate::new("MDM2", 0.8).with_pagerank(0.4),
            EntityCandidate::new("tp53", 0.3).with_pagerank(0.1),
        ];
        lock.apply("TP53", &mut candidates);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].similarity, 1.0);
        assert_eq!(candidates[1].pagerank, 0.4);
        assert!(!candidates[1].synthetic);
    }

    #[test]
    fn test_apply_injects_missing() {
        let lock = CoreEntityLock::default();
        let mut candidates = vec![EntityCandidate::new("MDM2", 0.8).with_pagerank(0.4)];
        lock.apply("TP53", &mut candidates);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[1].synthetic);
        assert_eq!(candidates[1].name, "TP53");
        assert_eq!(candidates[1].pagerank, 0.4);
    }
}
