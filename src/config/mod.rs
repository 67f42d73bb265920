//! Configuration module

pub mod markdown;
mod site;

pub use markdown::{Extension, HtmlFlag, MarkdownOptions};
pub use site::{ScriptSpec, SiteConfig};
