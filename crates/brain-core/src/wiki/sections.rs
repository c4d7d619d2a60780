//! Article sections and the section exclude list

use parse_wiki_text::{Configuration, Node};

use crate::config::WikiConfig;

use super::markup::{collapse_blank_lines, write_nodes};

/// One section of an article
///
/// `text` is the raw wikitext between this heading and the next one. The lead
/// section has an empty title and level 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub level: u8,
    pub text: String,
}

impl Section {
    pub fn is_lead(&self) -> bool {
        self.level == 0
    }
}

/// Split an article at its headings
///
/// A lead consisting only of whitespace is omitted.
pub fn split_sections(wikitext: &str) -> Vec<Section> {
    let output = Configuration::default().parse(wikitext);

    let headings: Vec<(usize, usize, u8, String)> = output
        .nodes
        .iter()
        .filter_map(|node| match node {
            Node::Heading {
                start,
                end,
                level,
                nodes,
            } => {
                let mut title = String::new();
                write_nodes(&mut title, nodes);
                let title = collapse_blank_lines(&title).replace('\n', " ");
                Some((*start, *end, *level, title))
            }
            _ => None,
        })
        .collect();

    let mut sections = Vec::with_capacity(headings.len() + 1);

    let lead_end = headings.first().map_or(wikitext.len(), |h| h.0);
    let lead = &wikitext[..lead_end];
    if !lead.trim().is_empty() {
        sections.push(Section {
            title: String::new(),
            level: 0,
            text: lead.trim().to_string(),
        });
    }

    for (i, (_, end, level, title)) in headings.iter().enumerate() {
        let body_end = headings.get(i + 1).map_or(wikitext.len(), |next| next.0);
        let body = wikitext.get(*end..body_end).unwrap_or_default();
        sections.push(Section {
            title: title.clone(),
            level: *level,
            text: body.trim().to_string(),
        });
    }

    sections
}

/// Drops sections by title, together with their subsections
#[derive(Debug, Clone, Default)]
pub struct SectionFilter {
    excluded: Vec<String>,
}

impl SectionFilter {
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded: titles.into_iter().map(|t| normalize_title(t.as_ref())).collect(),
        }
    }

    pub fn from_config(config: &WikiConfig) -> Self {
        Self::new(&config.excluded_sections)
    }

    /// Keeps every section
    pub fn keep_all() -> Self {
        Self::default()
    }

    pub fn is_excluded(&self, title: &str) -> bool {
        let title = normalize_title(title);
        !title.is_empty() && self.excluded.contains(&title)
    }

    pub fn apply(&self, sections: Vec<Section>) -> Vec<Section> {
        let mut kept = Vec::with_capacity(sections.len());
        let mut skip_below: Option<u8> = None;

        for section in sections {
            if let Some(level) = skip_below {
                if section.level > level {
                    continue;
                }
                skip_below = None;
            }

            if self.is_excluded(&section.title) {
                skip_below = Some(section.level);
                continue;
            }
            kept.push(section);
        }

        kept
    }
}

fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
