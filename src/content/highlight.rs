//! Syntax highlighting for fenced code blocks

use lazy_static::lazy_static;
use regex::Regex;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::helpers::html_escape;

lazy_static! {
    static ref PRE_WRAPPER: Regex = Regex::new(r"(?s)\A\s*<pre[^>]*>\n?(.*?)</pre>\s*\z").unwrap();
}

/// syntect-backed highlighter
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl Highlighter {
    pub fn new(theme: &str) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
        }
    }

    /// Highlight `code` as `lang` and return the inner HTML only
    ///
    /// syntect wraps its output in a styled `<pre>`; that wrapper is removed
    /// so the caller can apply its own. Unknown languages are highlighted as
    /// plain text.
    pub fn highlight(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let Some(theme) = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
        else {
            return html_escape(code);
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => strip_pre_wrapper(&highlighted),
            Err(e) => {
                tracing::debug!("Highlighting {} failed: {}", lang, e);
                html_escape(code)
            }
        }
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new("base16-ocean.dark")
    }
}

fn strip_pre_wrapper(html: &str) -> String {
    match PRE_WRAPPER.captures(html) {
        Some(caps) => caps[1].to_string(),
        None => html.to_string(),
    }
}
