//! Content module - handles posts, pages, and content processing

mod frontmatter;
mod highlight;
pub mod loader;
mod markdown;
mod post;
pub mod toc;
pub mod wikilink;

pub use frontmatter::FrontMatter;
pub use highlight::Highlighter;
pub use loader::{ContentLoader, LoadedPage};
pub use markdown::{MarkdownRenderer, TemplateHook};
pub use post::{post_url, Page, Post, PostName, Tag, DEFAULT_POST_LAYOUT};
