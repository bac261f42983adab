use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Open attribute map carried by nodes and edges.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Separator between a namespace prefix and the local part of a node id (`Gene::TP53`).
pub const SCOPE_SEPARATOR: &str = "::";

pub const UNKNOWN_TYPE: &str = "unknown";

fn default_weight() -> f32 {
    1.0
}

fn default_node_type() -> String {
    UNKNOWN_TYPE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: default_node_type(),
            namespace: None,
            attributes: Attributes::new(),
        }
    }

    /// Node created from a bare identifier, e.g. a triple endpoint.
    pub fn untyped(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut node = Self::new(id.clone(), id);
        node.attributes
            .insert("kind".to_string(), serde_json::Value::from("entity"));
        node
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Display label; falls back to the id for nameless nodes.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Declared type, or the `kind` attribute when the type is missing.
    pub fn kind(&self) -> String {
        let declared = self.node_type.trim();
        if !declared.is_empty() && declared != UNKNOWN_TYPE {
            return declared.to_string();
        }
        match self.attributes.get("kind").and_then(|v| v.as_str()) {
            Some(kind) if !kind.trim().is_empty() => kind.trim().to_string(),
            _ => UNKNOWN_TYPE.to_string(),
        }
    }

    fn explicit_namespace(&self) -> Option<&str> {
        self.namespace
            .as_deref()
            .or_else(|| self.attributes.get("namespace").and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
    }

    /// Namespace used for blocking: explicit namespace, else the id's scope prefix, else empty.
    pub fn namespace_key(&self) -> String {
        if let Some(ns) = self.explicit_namespace() {
            return ns.to_string();
        }
        match self.id.split_once(SCOPE_SEPARATOR) {
            Some((prefix, _)) if !prefix.is_empty() => prefix.to_string(),
            _ => String::new(),
        }
    }

    /// True when the node carries an explicit `id` attribute or namespace.
    pub fn has_explicit_identity(&self) -> bool {
        self.attributes.contains_key("id") || self.explicit_namespace().is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub source: String,

    pub target: String,

    /// Relation-type code, e.g. `GiG`.
    pub metaedge: String,

    #[serde(default)]
    pub relation: String,

    #[serde(default = "default_weight")]
    pub weight: f32,

    /// Distinguishes parallel edges in multi-edge stores; always 0 in simple stores.
    #[serde(default)]
    pub key: u32,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        metaedge: impl Into<String>,
    ) -> Self {
        let metaedge = metaedge.into();
        Self {
            source: source.into(),
            target: target.into(),
            relation: metaedge.clone(),
            metaedge,
            weight: default_weight(),
            key: 0,
            attributes: Attributes::new(),
        }
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = relation.into();
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_key(mut self, key: u32) -> Self {
        self.key = key;
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Entity as produced by the extraction collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EntityRecord {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", alias = "entity_type", default)]
    pub entity_type: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub attributes: Attributes,
}

/// Relationship as produced by the extraction collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RelationRecord {
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub target: Option<String>,

    #[serde(default)]
    pub metaedge: Option<String>,

    #[serde(default)]
    pub relation: Option<String>,

    #[serde(default)]
    pub weight: Option<f32>,

    #[serde(default)]
    pub key: Option<u32>,

    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphInput {
    #[serde(default)]
    pub entities: Vec<EntityRecord>,

    #[serde(default)]
    pub relations: Vec<RelationRecord>,
}
