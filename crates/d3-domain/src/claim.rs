//! Claim module - the declarative documents a D3 build resolves

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Globally unique identifier of a claim
///
/// The canonical form is a lowercase, hyphenated UUID (8-4-4-4-12 hex groups).
/// Identifiers are kept verbatim as written in the source document so that a
/// malformed one can still be reported against the file that declared it;
/// use [`ClaimId::is_canonical`] to check the grammar.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(String);

impl ClaimId {
    /// Generate a fresh random identifier in canonical form
    ///
    /// # Examples
    ///
    /// ```
    /// use d3_domain::ClaimId;
    ///
    /// let id = ClaimId::new();
    /// assert!(id.is_canonical());
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().hyphenated().to_string())
    }

    /// Whether the identifier is a lowercase hyphenated UUID
    pub fn is_canonical(&self) -> bool {
        // Uuid accepts braced, urn and simple forms too; only the exact
        // hyphenated lowercase rendering round-trips.
        uuid::Uuid::try_parse(&self.0)
            .map(|u| u.hyphenated().to_string() == self.0)
            .unwrap_or(false)
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClaimId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClaimId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ClaimId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind of claim; decides which resolver applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClaimKind {
    /// Device category with inheritable properties
    Type,

    /// Named set of network-access rules
    Behaviour,

    /// Firmware release tied to a Type
    Firmware,
}

impl ClaimKind {
    /// Every kind, in resolution order
    pub const ALL: [ClaimKind; 3] = [ClaimKind::Type, ClaimKind::Behaviour, ClaimKind::Firmware];

    /// Document `type` code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ClaimKind::Type => "d3-device-type-assertion",
            ClaimKind::Behaviour => "d3-device-type-behaviour",
            ClaimKind::Firmware => "d3-firmware-manufacturer-assertion",
        }
    }

    /// Look a kind up by its document `type` code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Short name as used in file names (`*.behaviour.d3.yaml`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimKind::Type => "type",
            ClaimKind::Behaviour => "behaviour",
            ClaimKind::Firmware => "firmware",
        }
    }

    /// Parse a kind from its short name; names are case sensitive
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parent reference declared in `credentialSubject.parents`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    /// Identifier of the parent claim
    pub id: ClaimId,

    /// Properties inherited from this parent; `None` inherits all of them
    pub properties: Option<Vec<String>>,
}

impl ParentRef {
    /// Parent reference that inherits every property
    pub fn new(id: impl Into<ClaimId>) -> Self {
        Self {
            id: id.into(),
            properties: None,
        }
    }

    /// Parse either a bare id string or an `{ id, properties }` mapping
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(id) => Ok(Self::new(id.as_str())),
            Value::Object(map) => {
                let id = map
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| "parent entry is missing a string 'id'".to_string())?;
                let properties = match map.get("properties") {
                    None | Some(Value::Null) => None,
                    Some(Value::Array(items)) => Some(
                        items
                            .iter()
                            .map(|item| {
                                item.as_str().map(str::to_string).ok_or_else(|| {
                                    format!("inherited property names of parent {} must be strings", id)
                                })
                            })
                            .collect::<Result<Vec<_>, _>>()?,
                    ),
                    Some(_) => {
                        return Err(format!("'properties' of parent {} must be a list", id));
                    }
                };
                Ok(Self {
                    id: ClaimId::from(id),
                    properties,
                })
            }
            other => Err(format!("parent entry must be an id or mapping, found {}", other)),
        }
    }
}

/// A parsed D3 claim document
///
/// Claims are immutable once loaded; resolvers build a new claim with
/// [`Claim::with_subject`] rather than editing the shared copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    /// Unique identifier (`credentialSubject.id`)
    pub id: ClaimId,

    /// Kind of claim (top-level `type`)
    pub kind: ClaimKind,

    /// Declared parents, empty for roots
    pub parents: Vec<ParentRef>,

    /// The `credentialSubject` mapping holding the kind-specific fields
    pub subject: Map<String, Value>,

    /// Any other top-level fields, carried through to the artifact untouched
    pub envelope: Map<String, Value>,
}

impl Claim {
    /// Build a claim from a parsed `{ type, credentialSubject }` document
    ///
    /// # Examples
    ///
    /// ```
    /// use d3_domain::{Claim, ClaimKind};
    /// use serde_json::json;
    ///
    /// let claim = Claim::from_document(json!({
    ///     "type": "d3-device-type-behaviour",
    ///     "credentialSubject": { "id": "0b5d1a6e-5f39-4c43-a1b2-3c4d5e6f7a8b", "rules": [] }
    /// })).unwrap();
    /// assert_eq!(claim.kind, ClaimKind::Behaviour);
    /// ```
    pub fn from_document(document: Value) -> Result<Self, String> {
        let Value::Object(mut envelope) = document else {
            return Err("claim document must be a mapping".to_string());
        };

        let code = envelope
            .remove("type")
            .ok_or_else(|| "claim document has no 'type'".to_string())?;
        let kind = code
            .as_str()
            .and_then(ClaimKind::from_code)
            .ok_or_else(|| format!("unknown claim type code {}", code))?;

        let subject = match envelope.remove("credentialSubject") {
            Some(Value::Object(subject)) => subject,
            Some(_) => return Err("'credentialSubject' must be a mapping".to_string()),
            None => return Err("claim document has no 'credentialSubject'".to_string()),
        };

        let id = subject
            .get("id")
            .and_then(Value::as_str)
            .map(ClaimId::from)
            .ok_or_else(|| "'credentialSubject' has no string 'id'".to_string())?;

        let parents = match subject.get("parents") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(ParentRef::from_value)
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(format!("'parents' of {} must be a list", id)),
        };

        Ok(Self {
            id,
            kind,
            parents,
            subject,
            envelope,
        })
    }

    /// Render the claim back to its JSON document form
    pub fn to_document(&self) -> Value {
        let mut document = self.envelope.clone();
        document.insert("type".to_string(), Value::String(self.kind.code().to_string()));
        document.insert("credentialSubject".to_string(), Value::Object(self.subject.clone()));
        Value::Object(document)
    }

    /// A copy of this claim with its `credentialSubject` replaced
    pub fn with_subject(&self, subject: Map<String, Value>) -> Self {
        Self {
            subject,
            ..self.clone()
        }
    }

    /// Whether the claim declares any parents
    pub fn has_parents(&self) -> bool {
        !self.parents.is_empty()
    }

    /// Identifiers of the declared parents, in declaration order
    pub fn parent_ids(&self) -> impl Iterator<Item = &ClaimId> {
        self.parents.iter().map(|parent| &parent.id)
    }

    /// Field of the `credentialSubject`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.subject.get(key)
    }

    /// Human readable `name`, when declared
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Behaviour referenced by a Type or Firmware claim
    pub fn behaviour_ref(&self) -> Option<ClaimId> {
        self.get("behaviour").and_then(reference_id)
    }

    /// Type a Firmware claim belongs to
    pub fn type_ref(&self) -> Option<ClaimId> {
        self.get("type").and_then(reference_id)
    }
}

/// Read a reference written either as an id string or as `{ id }`
fn reference_id(value: &Value) -> Option<ClaimId> {
    match value {
        Value::String(id) => Some(ClaimId::from(id.as_str())),
        Value::Object(map) => map.get("id").and_then(Value::as_str).map(ClaimId::from),
        _ => None,
    }
}
