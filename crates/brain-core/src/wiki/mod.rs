//! Wikipedia articles from a MediaWiki MySQL import
//!
//! ```ignore
//! let source = WikiSource::connect(&config.mysql).await?;
//! let reader = WikiReader::new(source, SectionFilter::from_config(&config.wiki));
//! let text = reader.article("Leaf").await?;
//! ```

mod markup;
mod reader;
mod sections;
mod source;

pub use markup::strip_markup;
pub use reader::{WikiReader, render_article};
pub use sections::{Section, SectionFilter, split_sections};
pub use source::{WikiSource, page_title_key};
