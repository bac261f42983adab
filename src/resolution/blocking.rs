use std::collections::HashSet;

use super::normalize::normalize_label;
use crate::types::Node;

/// Look-alike labels that must never merge.
const DEFAULT_BLOCKED: &[(&str, &str)] = &[
    ("TP53", "TP63"),
    ("TP53", "TP73"),
    ("TP63", "TP73"),
    ("BRCA1", "BRCA2"),
    ("ERBB2", "ERBB3"),
    ("ERBB3", "ERBB4"),
    ("AKT1", "AKT2"),
    ("JAK1", "JAK2"),
    ("CDK4", "CDK6"),
    ("MAPK1", "MAPK3"),
    ("IL6", "IL6R"),
    ("type 1 diabetes mellitus", "type 2 diabetes mellitus"),
    ("type 1 diabetes", "type 2 diabetes"),
    ("hepatitis B", "hepatitis C"),
    ("influenza A", "influenza B"),
];

/// Unordered pairs of normalized labels.
#[derive(Debug, Clone)]
pub struct BlockedPairs {
    pairs: HashSet<(String, String)>,
}

fn ordered(a: String, b: String) -> (String, String) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl BlockedPairs {
    pub fn empty() -> Self {
        Self {
            pairs: HashSet::new(),
        }
    }

    pub fn with_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut blocked = Self::empty();
        for (a, b) in pairs {
            blocked.insert(a.as_ref(), b.as_ref());
        }
        blocked
    }

    pub fn insert(&mut self, a: &str, b: &str) {
        self.pairs
            .insert(ordered(normalize_label(a), normalize_label(b)));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Both labels must already be normalized.
    pub fn is_blocked_normalized(&self, a: &str, b: &str) -> bool {
        if self.pairs.is_empty() {
            return false;
        }
        let key = ordered(a.to_string(), b.to_string());
        self.pairs.contains(&key)
    }

    pub fn is_blocked(&self, a: &str, b: &str) -> bool {
        self.is_blocked_normalized(&normalize_label(a), &normalize_label(b))
    }
}

impl Default for BlockedPairs {
    fn default() -> Self {
        Self::with_pairs(DEFAULT_BLOCKED.iter().copied())
    }
}

/// Blocking key: only nodes sharing (type, namespace) are ever compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub kind: String,
    pub namespace: String,
}

impl BucketKey {
    pub fn of(node: &Node) -> Self {
        Self {
            kind: node.kind().to_lowercase(),
            namespace: node.namespace_key(),
        }
    }
}
