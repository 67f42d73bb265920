//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Undo [`html_escape`] and the escaping done by the Markdown renderer
pub fn html_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Generate an anchor tag
///
/// `text` is inserted as is; callers pass already rendered HTML.
///
/// # Examples
/// ```ignore
/// link_to("/about", "About") // -> <a href="/about">About</a>
/// ```
pub fn link_to(href: &str, text: &str) -> String {
    format!(r#"<a href="{}">{}</a>"#, html_escape(href), text)
}

/// Replace tabs with spaces up to the next multiple of four columns
pub fn expand_tabs(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut column = 0;

    for c in s.chars() {
        match c {
            '\t' => {
                let width = 4 - column % 4;
                result.extend(std::iter::repeat(' ').take(width));
                column += width;
            }
            '\n' => {
                result.push(c);
                column = 0;
            }
            _ => {
                result.push(c);
                column += 1;
            }
        }
    }

    result
}
