//! ConceptNet 5 JSON-LD response types (only the fields brain reads)

use serde::{Deserialize, Serialize};

/// A concept node as it appears at either end of an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptNode {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
}

/// A relation such as `/r/IsA`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub label: String,
}

/// An assertion `start -[rel]-> end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptEdge {
    #[serde(rename = "@id", default)]
    pub id: String,
    pub rel: Relation,
    pub start: ConceptNode,
    pub end: ConceptNode,
    #[serde(default)]
    pub weight: f64,
    #[serde(rename = "surfaceText", default)]
    pub surface_text: Option<String>,
}

/// Pagination block of a paged response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    #[serde(rename = "nextPage", default)]
    pub next_page: Option<String>,
    #[serde(rename = "previousPage", default)]
    pub previous_page: Option<String>,
}

/// Response of `/c/{lang}/{term}` and `/query`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptPage {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(default)]
    pub edges: Vec<ConceptEdge>,
    #[serde(default)]
    pub view: Option<PageView>,
}

impl ConceptPage {
    pub fn next_page(&self) -> Option<&str> {
        self.view.as_ref().and_then(|v| v.next_page.as_deref())
    }
}

/// One entry of `/related/c/{lang}/{term}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedTerm {
    #[serde(rename = "@id")]
    pub id: String,
    pub weight: f64,
}

impl RelatedTerm {
    /// The readable term: `/c/en/fallen_leaf` becomes `fallen leaf`
    pub fn term(&self) -> String {
        self.id
            .rsplit('/')
            .next()
            .unwrap_or(&self.id)
            .replace('_', " ")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RelatedResponse {
    #[serde(default)]
    pub related: Vec<RelatedTerm>,
}
