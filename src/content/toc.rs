//! Table of contents

use std::collections::HashMap;

use crate::helpers::{html_escape, slugify};

/// A heading collected while rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// Hands out unique anchor ids for headings
#[derive(Debug, Default)]
pub struct HeadingIds {
    seen: HashMap<String, usize>,
}

impl HeadingIds {
    /// Slug of the heading text; repeats get `-1`, `-2`, ...
    pub fn next(&mut self, text: &str) -> String {
        let slug = slugify(text.trim());
        let base = match slug.trim_matches('-') {
            "" => "section".to_string(),
            trimmed => trimmed.to_string(),
        };

        let count = self.seen.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        id
    }
}

/// Render headings as nested lists of anchors
///
/// Deeper headings open a nested `<ul>`; a heading shallower than the first
/// one simply continues the top-level list.
pub fn render_toc(headings: &[Heading]) -> String {
    if headings.is_empty() {
        return String::new();
    }

    let mut html = String::new();
    let mut levels: Vec<u8> = Vec::new();

    for heading in headings {
        match levels.last().copied() {
            None => {
                html.push_str("<ul>\n<li>");
                levels.push(heading.level);
            }
            Some(current) if heading.level > current => {
                html.push_str("\n<ul>\n<li>");
                levels.push(heading.level);
            }
            Some(_) => {
                while levels.len() > 1 && levels.last().is_some_and(|&l| heading.level < l) {
                    html.push_str("</li>\n</ul>\n");
                    levels.pop();
                }
                html.push_str("</li>\n<li>");
            }
        }

        html.push_str(&format!(
            "<a href=\"#{}\">{}</a>",
            heading.id,
            html_escape(&heading.text)
        ));
    }

    for _ in levels {
        html.push_str("</li>\n</ul>\n");
    }

    html
}
