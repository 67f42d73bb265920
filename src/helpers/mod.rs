//! Helper functions shared by the renderer and templates
//!
//! The same functions back the `url`, `asset` and `date` template functions,
//! so links built by Markdown and by templates always agree.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
