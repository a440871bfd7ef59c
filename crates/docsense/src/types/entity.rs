//! Entity kinds and the per-document entity bag

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fixed set of entity kinds the extractor reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityKind {
    Person,
    Org,
    Date,
    Gpe,
    Email,
    Phone,
    Money,
    Tech,
}

impl EntityKind {
    /// All kinds in reporting order
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Person,
        EntityKind::Org,
        EntityKind::Date,
        EntityKind::Gpe,
        EntityKind::Email,
        EntityKind::Phone,
        EntityKind::Money,
        EntityKind::Tech,
    ];

    /// Canonical upper-case label
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Person => "PERSON",
            EntityKind::Org => "ORG",
            EntityKind::Date => "DATE",
            EntityKind::Gpe => "GPE",
            EntityKind::Email => "EMAIL",
            EntityKind::Phone => "PHONE",
            EntityKind::Money => "MONEY",
            EntityKind::Tech => "TECH",
        }
    }

    /// Map a recognizer label onto a kind (exact, case-sensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == label)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distinct surface strings per entity kind, in first-seen order
///
/// Every kind is always present as a key, possibly with an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityBag {
    entities: BTreeMap<EntityKind, Vec<String>>,
}

impl Default for EntityBag {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityBag {
    /// Create a bag with all eight kinds present and empty
    pub fn new() -> Self {
        Self {
            entities: EntityKind::ALL.into_iter().map(|kind| (kind, Vec::new())).collect(),
        }
    }

    /// Values recorded for a kind
    pub fn get(&self, kind: EntityKind) -> &[String] {
        self.entities.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append `value` unless it is already recorded for `kind`
    ///
    /// Returns true when the value was added.
    pub fn insert(&mut self, kind: EntityKind, value: impl Into<String>) -> bool {
        let value = value.into();
        let values = self.entities.entry(kind).or_default();
        if values.contains(&value) {
            return false;
        }
        values.push(value);
        true
    }

    /// Drop everything recorded for `kind` and record `values` instead
    pub fn replace<I, S>(&mut self, kind: EntityKind, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities.insert(kind, Vec::new());
        for value in values {
            self.insert(kind, value);
        }
    }

    /// Owned copy of one kind's values
    pub fn values(&self, kind: EntityKind) -> Vec<String> {
        self.get(kind).to_vec()
    }

    /// Kinds with at least one value
    pub fn non_empty(&self) -> BTreeMap<EntityKind, Vec<String>> {
        self.entities
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(kind, values)| (*kind, values.clone()))
            .collect()
    }

    /// Iterate over all kinds in reporting order
    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &[String])> {
        self.entities.iter().map(|(kind, values)| (*kind, values.as_slice()))
    }

    /// Total number of values across kinds
    pub fn total(&self) -> usize {
        self.entities.values().map(Vec::len).sum()
    }
}
