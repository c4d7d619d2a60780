//! Parsing of the interactive prompts

use std::fmt;

use crate::error::{Error, Result};
use crate::graph::{Label, NodeRef, RelType, Triple};

pub const ASSERTION_FORMAT: &str =
    "<node1 name> <node1 type> <relationship> <node2 name> <node2 type>";

pub const NODE_QUERY_FORMAT: &str = "<node name> [node type]";

/// `Yang Person KNOWS Fangfang Person`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub from: NodeRef,
    pub rel: RelType,
    pub to: NodeRef,
}

impl Assertion {
    pub fn new(from: NodeRef, rel: RelType, to: NodeRef) -> Self {
        Self { from, rel, to }
    }

    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [from_name, from_label, rel, to_name, to_label] = fields.as_slice() else {
            return Err(Error::InvalidInput(format!(
                "Expected 5 fields, got {}. Use: {}",
                fields.len(),
                ASSERTION_FORMAT
            )));
        };

        Ok(Self {
            from: NodeRef::new(Label::new(from_label)?, *from_name),
            rel: RelType::new(rel)?,
            to: NodeRef::new(Label::new(to_label)?, *to_name),
        })
    }

    /// Node names on both ends, deduplicated
    pub fn names(&self) -> Vec<String> {
        if self.from.name == self.to.name {
            vec![self.from.name.clone()]
        } else {
            vec![self.from.name.clone(), self.to.name.clone()]
        }
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) -[{}]-> ({})", self.from, self.rel, self.to)
    }
}

/// `<name> [type]` from the explore prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeQuery {
    pub name: String,
    pub label: Option<Label>,
}

impl NodeQuery {
    pub fn parse(line: &str) -> Result<Self> {
        match line.split_whitespace().collect::<Vec<_>>().as_slice() {
            [name] => Ok(Self {
                name: name.to_string(),
                label: None,
            }),
            [name, label] => Ok(Self {
                name: name.to_string(),
                label: Some(Label::new(label)?),
            }),
            fields => Err(Error::InvalidInput(format!(
                "Expected 1 or 2 fields, got {}. Use: {}",
                fields.len(),
                NODE_QUERY_FORMAT
            ))),
        }
    }
}

/// Answer to the "include these concepts?" prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestChoice {
    All,
    Select,
    Manual,
    Skip,
    Exit,
}

impl IngestChoice {
    pub const PROMPT: &'static str =
        "Include any of these? All (y), Select (s), Manual input (m), Skip (n), exit to quit";

    pub fn parse(line: &str) -> Result<Self> {
        match line.trim().to_lowercase().as_str() {
            "all" | "y" | "yes" => Ok(Self::All),
            "s" | "select" => Ok(Self::Select),
            "m" | "manual" => Ok(Self::Manual),
            "" | "n" | "no" => Ok(Self::Skip),
            "exit" | "quit" => Ok(Self::Exit),
            other => Err(Error::InvalidInput(format!(
                "Unknown choice '{}'. {}",
                other,
                Self::PROMPT
            ))),
        }
    }
}

/// Whether a prompt line asks to leave the current loop
pub fn is_exit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit")
}

/// Menu indices from input such as `0 2, 5-7`
///
/// Duplicates are dropped keeping first occurrence order.
pub fn parse_selection(line: &str, len: usize) -> Result<Vec<usize>> {
    let mut picked = Vec::new();

    for token in line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let (start, end) = match token.split_once('-') {
            Some((a, b)) => (parse_index(a, token)?, parse_index(b, token)?),
            None => {
                let i = parse_index(token, token)?;
                (i, i)
            }
        };

        if start > end {
            return Err(Error::InvalidInput(format!(
                "Range '{}' runs backwards",
                token
            )));
        }
        if end >= len {
            return Err(Error::InvalidInput(format!(
                "Choice {} is out of range; pick 0 to {}",
                end,
                len.saturating_sub(1)
            )));
        }

        for i in start..=end {
            if !picked.contains(&i) {
                picked.push(i);
            }
        }
    }

    Ok(picked)
}

fn parse_index(value: &str, token: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("'{}' is not a number or range", token)))
}

/// `(i): from REL to` lines for the suggestion menu
pub fn numbered_triples(triples: &[Triple]) -> String {
    triples
        .iter()
        .enumerate()
        .map(|(i, t)| format!("({}): {} {} {}", i, t.from, t.rel, t.to))
        .collect::<Vec<_>>()
        .join("\n")
}
