//! Wikitext to plain text

use parse_wiki_text::{Configuration, Node};

/// Tags whose contents never reach the plain text
const DROPPED_TAGS: &[&str] = &["ref", "references", "gallery", "math", "score", "timeline"];

/// Plain text of a wikitext fragment
///
/// Keeps running text, link labels (the target when a link has none),
/// headings, list items, table cells and character entities. Templates,
/// comments, categories, images, references and magic words are dropped.
pub fn strip_markup(wikitext: &str) -> String {
    let output = Configuration::default().parse(wikitext);
    let mut out = String::with_capacity(wikitext.len() / 2);
    write_nodes(&mut out, &output.nodes);
    collapse_blank_lines(&out)
}

pub(crate) fn write_nodes(out: &mut String, nodes: &[Node]) {
    for node in nodes {
        write_node(out, node);
    }
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text { value, .. } => out.push_str(value),
        Node::CharacterEntity { character, .. } => out.push(*character),
        Node::Link { target, text, .. } => {
            let mut label = String::new();
            write_nodes(&mut label, text);
            // an unlabeled link repeats its target as the text
            if label.is_empty() || label == *target {
                out.push_str(link_target_text(target));
            } else {
                out.push_str(&label);
            }
        }
        Node::ExternalLink { nodes, .. } => {
            // `[http://host label]`: keep only the label
            let mut inner = String::new();
            write_nodes(&mut inner, nodes);
            if let Some((_, label)) = inner.split_once(char::is_whitespace) {
                out.push_str(label.trim());
            }
        }
        Node::Heading { nodes, .. } => {
            out.push_str("\n\n");
            write_nodes(out, nodes);
            out.push_str("\n\n");
        }
        Node::ParagraphBreak { .. } | Node::HorizontalDivider { .. } => out.push_str("\n\n"),
        Node::Preformatted { nodes, .. } => {
            out.push('\n');
            write_nodes(out, nodes);
            out.push('\n');
        }
        Node::UnorderedList { items, .. } | Node::OrderedList { items, .. } => {
            for item in items {
                out.push('\n');
                write_nodes(out, &item.nodes);
            }
            out.push('\n');
        }
        Node::DefinitionList { items, .. } => {
            for item in items {
                out.push('\n');
                write_nodes(out, &item.nodes);
            }
            out.push('\n');
        }
        Node::Table { rows, .. } => {
            for row in rows {
                let cells: Vec<String> = row
                    .cells
                    .iter()
                    .map(|cell| {
                        let mut text = String::new();
                        write_nodes(&mut text, &cell.content);
                        text.split_whitespace().collect::<Vec<_>>().join(" ")
                    })
                    .filter(|text| !text.is_empty())
                    .collect();
                if !cells.is_empty() {
                    out.push('\n');
                    out.push_str(&cells.join(" | "));
                }
            }
            out.push('\n');
        }
        Node::Tag { name, nodes, .. } => {
            if !DROPPED_TAGS.contains(&name.to_ascii_lowercase().as_str()) {
                write_nodes(out, nodes);
            }
        }
        // templates, comments, categories, images, magic words, formatting marks
        _ => {}
    }
}

/// Display text for an unlabeled link: `Leaf#Anatomy` shows as `Leaf`
fn link_target_text(target: &str) -> &str {
    let target = target.trim_start_matches(':');
    match target.split_once('#') {
        Some((page, _)) if !page.is_empty() => page,
        Some((_, anchor)) => anchor,
        None => target,
    }
}

/// Trim every line and keep at most one blank line between paragraphs
pub(crate) fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = false;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            blank_run = !out.is_empty();
            continue;
        }
        if blank_run {
            out.push_str("\n\n");
            blank_run = false;
        } else if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
    }

    out
}
