//! Network-access rules carried by Behaviour claims

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named network-access policy entry
///
/// Rules are compared in two ways during inheritance: by `name` to detect
/// conflicts, and by full structural equality to drop duplicates. Fields the
/// model does not know about are kept in `extra` and take part in equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule name, unique within a resolved behaviour
    pub name: String,

    /// Whether matching traffic is allowed (defaults to allowed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<bool>,

    /// Traffic this rule matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<RuleMatches>,

    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rule {
    /// Create a rule with no matches
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allowed: None,
            matches: None,
            extra: Map::new(),
        }
    }

    /// Copy of this rule under a different name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Whether the rule allows traffic
    pub fn is_allowed(&self) -> bool {
        self.allowed.unwrap_or(true)
    }
}

/// Match criteria of a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMatches {
    /// IPv4 destination criteria
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip4: Option<Ip4Match>,

    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// IPv4 destinations, by address and by domain name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ip4Match {
    /// Destination address tree
    #[serde(rename = "destinationIp4", default, skip_serializing_if = "Option::is_none")]
    pub destination_ip4: Option<Destination>,

    /// Destination domain-name tree
    #[serde(rename = "destinationDnsname", default, skip_serializing_if = "Option::is_none")]
    pub destination_dnsname: Option<Destination>,

    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A node of a destination tree: an address or domain plus nested exceptions
///
/// An explicit empty `children` list is kept apart from an absent one so the
/// node serializes back as it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Address or domain name
    pub addr: String,

    /// Whether the destination is allowed (defaults to allowed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<bool>,

    /// Nested destinations refining this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Destination>>,

    /// Unmodelled fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Destination {
    /// Whether the destination is allowed
    pub fn is_allowed(&self) -> bool {
        self.allowed.unwrap_or(true)
    }

    /// Nested destinations, empty when there are none
    pub fn children(&self) -> &[Destination] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Flatten the tree depth-first into `(depth, node)` pairs
    pub fn walk(&self) -> Vec<(usize, &Destination)> {
        let mut nodes = Vec::new();
        let mut stack = vec![(0, self)];
        while let Some((depth, node)) = stack.pop() {
            nodes.push((depth, node));
            for child in node.children().iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        nodes
    }
}
