//! Wikilink dialect
//!
//! `[[Target]]` and `[[Title|Target]]` become anchors pointing at
//! `url(Target)`. The rewrite runs on rendered HTML. A backslash in front of
//! the brackets keeps the text literal; since Markdown would consume that
//! backslash as an escape, escaped openers are swapped for a private-use
//! marker before parsing and resolved afterwards.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::helpers::{html_unescape, link_to, url};

/// Stands in for `\` in front of an escaped `[[` while Markdown is rendered
pub const ESCAPE_MARK: char = '\u{E000}';

/// Output for a wikilink whose title is empty
pub const EMPTY_TITLE: &str = "[[?]]";

lazy_static! {
    static ref WIKILINK: Regex =
        Regex::new(r"(\\|\x{E000})?\[\[([^\[\]|]*)(?:\|([^\[\]]*))?\]\]").unwrap();
}

/// Replace every backslash-escaped `[[` with the escape marker
///
/// A doubled backslash is an escaped backslash and is left alone.
pub fn protect_escapes(source: &str) -> Cow<'_, str> {
    if !source.contains("\\[[") {
        return Cow::Borrowed(source);
    }

    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        if let Some(tail) = after.strip_prefix('\\') {
            out.push_str("\\\\");
            rest = tail;
        } else if after.starts_with("[[") {
            out.push(ESCAPE_MARK);
            rest = after;
        } else {
            out.push('\\');
            rest = after;
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Put the backslash back where Markdown did not treat it as an escape
/// (code spans, code blocks, raw HTML)
pub fn restore_escapes(text: &str) -> Cow<'_, str> {
    if text.contains(ESCAPE_MARK) {
        Cow::Owned(text.replace(ESCAPE_MARK, "\\"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Mark every `[[` in rendered code so [`resolve`] leaves it literal
pub fn shield(html: &str) -> Cow<'_, str> {
    if html.contains("[[") {
        Cow::Owned(html.replace("[[", &format!("{}[[", ESCAPE_MARK)))
    } else {
        Cow::Borrowed(html)
    }
}

/// Rewrite wikilinks in rendered HTML into anchors
///
/// Marked openers come out as literal brackets; any mark left over is
/// dropped.
pub fn resolve(html: &str, base_url: &str) -> String {
    let resolved =
        WIKILINK.replace_all(html, |caps: &Captures| match caps.get(1).map(|m| m.as_str()) {
            // Backslash survived rendering: raw HTML, leave untouched
            Some("\\") => caps[0].to_string(),
            Some(_) => caps[0][ESCAPE_MARK.len_utf8()..].to_string(),
            None => anchor(caps, base_url),
        });

    if resolved.contains(ESCAPE_MARK) {
        resolved.replace(ESCAPE_MARK, "")
    } else {
        resolved.into_owned()
    }
}

/// The title is already HTML; the target is unescaped before it is slugified
fn anchor(caps: &Captures, base_url: &str) -> String {
    let first = caps[2].trim();
    let (title, target) = match caps.get(3).map(|m| m.as_str().trim()) {
        Some(target) if !target.is_empty() => (first, target),
        _ => (first, first),
    };

    if title.is_empty() {
        return EMPTY_TITLE.to_string();
    }

    link_to(&url(base_url, &html_unescape(target)), title)
}
