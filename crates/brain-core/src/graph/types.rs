//! Node, relationship and edge types for the concept graph

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Check that `value` can be spliced into Cypher as a label or relationship type
fn validate_identifier(kind: &'static str, value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

/// A node label such as `Person` or `Concept`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
    pub fn new(value: impl AsRef<str>) -> Result<Self> {
        let value = value.as_ref().trim();
        validate_identifier("label", value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Label {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A relationship type, always upper case (`knows` becomes `KNOWS`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelType(String);

impl RelType {
    pub fn new(value: impl AsRef<str>) -> Result<Self> {
        let value = value.as_ref().trim().to_ascii_uppercase();
        validate_identifier("relationship type", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RelType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<RelType> for String {
    fn from(rel: RelType) -> Self {
        rel.0
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node addressed by its label and `name` property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub label: Label,
    pub name: String,
}

impl NodeRef {
    pub fn new(label: Label, name: impl Into<String>) -> Self {
        Self {
            label,
            name: name.into(),
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.label, self.name)
    }
}

/// A relationship read back from the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub rel: String,
    pub to: String,
    /// Missing when the relationship was created outside brain
    pub confidence: Option<f64>,
}

/// An unlabeled `(from)-[rel]->(to)` statement, e.g. from ConceptNet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub from: String,
    pub rel: RelType,
    pub to: String,
}

impl Triple {
    pub fn new(from: impl Into<String>, rel: RelType, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            rel,
            to: to.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from, self.rel, self.to)
    }
}

/// What an assert did to the graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpsertOutcome {
    Created { confidence: f64 },
    Strengthened { previous: f64, confidence: f64 },
}

impl UpsertOutcome {
    pub fn confidence(&self) -> f64 {
        match self {
            Self::Created { confidence } | Self::Strengthened { confidence, .. } => *confidence,
        }
    }
}

/// Tally of a bulk ingest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub created: usize,
    pub strengthened: usize,
    pub failed: usize,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.created + self.strengthened + self.failed
    }

    pub fn record(&mut self, outcome: &UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created { .. } => self.created += 1,
            UpsertOutcome::Strengthened { .. } => self.strengthened += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_accepts_identifiers() {
        assert_eq!(Label::new("Person").unwrap().as_str(), "Person");
        assert_eq!(Label::new(" _tmp1 ").unwrap().as_str(), "_tmp1");
    }

    #[test]
    fn test_label_rejects_injection() {
        assert!(Label::new("").is_err());
        assert!(Label::new("1Person").is_err());
        assert!(Label::new("Person {name: 'x'}) DETACH DELETE (n").is_err());
        assert!(Label::new("Per-son").is_err());
    }

    #[test]
    fn test_rel_type_is_upper_cased() {
        assert_eq!(RelType::new("knows").unwrap().as_str(), "KNOWS");
        assert_eq!(RelType::new("is_a").unwrap().as_str(), "IS_A");
    }

    #[test]
    fn test_rel_type_rejects_spaces() {
        let err = RelType::new("is a").unwrap_err();
        assert_eq!(err.code(), "E003");
    }

    #[test]
    fn test_label_deserialize_validates() {
        let ok: Label = serde_json::from_str("\"Person\"").unwrap();
        assert_eq!(ok.as_str(), "Person");
        assert!(serde_json::from_str::<Label>("\"bad label\"").is_err());
    }

    #[test]
    fn test_ingest_report_record() {
        let mut report = IngestReport::default();
        report.record(&UpsertOutcome::Created { confidence: 0.5 });
        report.record(&UpsertOutcome::Strengthened {
            previous: 0.5,
            confidence: 0.55,
        });
        report.failed += 1;

        assert_eq!(report.created, 1);
        assert_eq!(report.strengthened, 1);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_triple_display() {
        let triple = Triple::new("leaf", RelType::new("part_of").unwrap(), "tree");
        assert_eq!(triple.to_string(), "leaf PART_OF tree");
    }
}
