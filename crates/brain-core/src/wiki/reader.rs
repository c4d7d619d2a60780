//! Fetch, filter and strip articles

use tracing::debug;

use crate::error::{Error, Result};

use super::markup::strip_markup;
use super::sections::{Section, SectionFilter, split_sections};
use super::source::WikiSource;

/// Plain-text articles from a [`WikiSource`]
#[derive(Debug, Clone)]
pub struct WikiReader {
    source: WikiSource,
    filter: SectionFilter,
}

impl WikiReader {
    pub fn new(source: WikiSource, filter: SectionFilter) -> Self {
        Self { source, filter }
    }

    pub fn source(&self) -> &WikiSource {
        &self.source
    }

    /// Plain text of the article called `title`
    pub async fn article(&self, title: &str) -> Result<String> {
        let wikitext = self
            .source
            .text_by_title(title)
            .await?
            .ok_or_else(|| Error::ArticleNotFound(title.to_string()))?;
        Ok(self.render(&wikitext))
    }

    /// Plain text stored under text id `old_id`
    pub async fn article_by_id(&self, old_id: u64) -> Result<String> {
        let wikitext = self
            .source
            .text_by_id(old_id)
            .await?
            .ok_or_else(|| Error::ArticleNotFound(format!("text id {}", old_id)))?;
        Ok(self.render(&wikitext))
    }

    pub fn render(&self, wikitext: &str) -> String {
        render_article(wikitext, &self.filter)
    }
}

/// Split, filter and strip `wikitext`; sections are joined with blank lines
pub fn render_article(wikitext: &str, filter: &SectionFilter) -> String {
    let sections = filter.apply(split_sections(wikitext));
    debug!(sections = sections.len(), "Rendering article");

    sections
        .iter()
        .filter_map(render_section)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_section(section: &Section) -> Option<String> {
    let body = strip_markup(&section.text);
    match (section.title.is_empty(), body.is_empty()) {
        (true, true) => None,
        (true, false) => Some(body),
        (false, true) => Some(section.title.clone()),
        (false, false) => Some(format!("{}\n\n{}", section.title, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = "'''Leaf''' is an organ of a [[plant]].<ref>Esau 1977</ref>

== Anatomy ==
{{Main|Leaf anatomy}}
Leaves have a [[Blade (botany)|blade]].

== See also ==
* [[Stem]]

== References ==
{{reflist}}
";

    #[test]
    fn test_render_article_filters_and_strips() {
        let filter = SectionFilter::new(["See also", "References"]);
        assert_eq!(
            render_article(ARTICLE, &filter),
            "Leaf is an organ of a plant.\n\nAnatomy\n\nLeaves have a blade."
        );
    }

    #[test]
    fn test_render_article_keep_all() {
        let rendered = render_article(ARTICLE, &SectionFilter::keep_all());
        assert!(rendered.contains("See also\n\nStem"));
        assert!(rendered.ends_with("References"));
    }
}
