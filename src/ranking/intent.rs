use serde::{Deserialize, Serialize};

/// Relation codes for "resembles" edges; denied for every intent.
pub const RESEMBLANCE_CODES: [&str; 2] = ["DrD", "CrC"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Covariance,
    Interaction,
    Regulation,
    Treatment,
    DiseaseAssociation,
    SideEffects,
    Pathway,
    Mixed,
}

#[derive(Debug, Clone)]
pub struct IntentRule {
    pub kind: IntentKind,
    pub phrases: Vec<String>,
    pub allow: Vec<String>,
    pub expected_type: Option<String>,
    pub hop_limit: usize,
}

impl IntentRule {
    pub fn new(kind: IntentKind, phrases: &[&str], allow: &[&str], expected_type: Option<&str>, hop_limit: usize) -> Self {
        Self {
            kind,
            phrases: phrases.iter().map(|p| p.to_lowercase()).collect(),
            allow: allow.iter().map(|c| c.to_string()).collect(),
            expected_type: expected_type.map(str::to_string),
            hop_limit,
        }
    }

    fn matches(&self, query: &str) -> bool {
        self.phrases.iter().any(|p| query.contains(p.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub intent: IntentKind,
    pub matched: Vec<IntentKind>,
    pub allow_list: Vec<String>,
    pub deny_list: Vec<String>,
    pub expected_type: Option<String>,
    pub hop_limit: usize,
}

impl QueryIntent {
    pub fn allows(&self, metaedge: &str) -> bool {
        (self.allow_list.is_empty() || self.allow_list.iter().any(|c| c == metaedge))
            && !self.deny_list.iter().any(|c| c == metaedge)
    }
}

/// Keyword router from query text to relation allow/deny lists and a hop budget.
#[derive(Debug, Clone)]
pub struct IntentRouter {
    rules: Vec<IntentRule>,
    deny: Vec<String>,
    mixed_hop_limit: usize,
}

impl Default for IntentRouter {
    fn default() -> Self {
        let rules = vec![
            IntentRule::new(
                IntentKind::Covariance,
                &["covary", "covaries", "covariation", "co-vary", "correlated", "correlation"],
                &["GcG"],
                Some("Gene"),
                1,
            ),
            IntentRule::new(
                IntentKind::Interaction,
                &["interact", "binds", "binding"],
                &["GiG"],
                Some("Gene"),
                1,
            ),
            IntentRule::new(
                IntentKind::Regulation,
                &["regulat", "controls"],
                &["Gr>G"],
                Some("Gene"),
                1,
            ),
            IntentRule::new(
                IntentKind::Treatment,
                &["treat", "therapy", "therapeutic"],
                &["CtD", "CpD"],
                Some("Compound"),
                1,
            ),
            IntentRule::new(
                IntentKind::DiseaseAssociation,
                &["associated", "association", "associates", "linked to", "implicated"],
                &["DaG", "DuG", "DdG"],
                Some("Gene"),
                2,
            ),
            IntentRule::new(
                IntentKind::SideEffects,
                &["side effect", "adverse", "toxicity"],
                &["CcSE"],
                Some("Side Effect"),
                1,
            ),
            IntentRule::new(
                IntentKind::Pathway,
                &["pathway", "signaling", "signalling", "biological process", "cascade", "metabolic"],
                &["GpPW", "GpBP", "GpMF", "GpCC"],
                Some("Pathway"),
                2,
            ),
        ];
        Self::new(rules, RESEMBLANCE_CODES.iter().map(|c| c.to_string()).collect())
    }
}

impl IntentRouter {
    pub fn new(rules: Vec<IntentRule>, deny: Vec<String>) -> Self {
        Self {
            rules,
            deny,
            mixed_hop_limit: 3,
        }
    }

    /// The first matching rule is the primary intent. Later matches add
    /// their codes to the allow-list and may raise the hop limit.
    pub fn route(&self, query: &str) -> QueryIntent {
        let query = query.to_lowercase();
        let matched: Vec<&IntentRule> = self.rules.iter().filter(|r| r.matches(&query)).collect();

        let Some(primary) = matched.first() else {
            return QueryIntent {
                intent: IntentKind::Mixed,
                matched: Vec::new(),
                allow_list: Vec::new(),
                deny_list: self.deny.clone(),
                expected_type: None,
                hop_limit: self.mixed_hop_limit,
            };
        };

        let mut allow_list: Vec<String> = Vec::new();
        for rule in &matched {
            for code in &rule.allow {
                if !allow_list.contains(code) && !self.deny.contains(code) {
                    allow_list.push(code.clone());
                }
            }
        }

        QueryIntent {
            intent: primary.kind,
            matched: matched.iter().map(|r| r.kind).collect(),
            allow_list,
            deny_list: self.deny.clone(),
            expected_type: primary.expected_type.clone(),
            hop_limit: matched.iter().map(|r| r.hop_limit).max().unwrap_or(self.mixed_hop_limit),
        }
    }
}
