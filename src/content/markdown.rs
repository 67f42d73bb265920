//! Markdown rendering with syntax highlighting

use std::borrow::Cow;
use std::sync::Arc;

use lazy_static::lazy_static;
use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, LinkType, Parser, Tag, TagEnd, TextMergeStream,
};
use regex::Regex;

use super::highlight::Highlighter;
use super::toc::{render_toc, Heading, HeadingIds};
use super::wikilink::{self, ESCAPE_MARK};
use crate::config::{Extension, HtmlFlag, MarkdownOptions};
use crate::error::Result;
use crate::helpers::{expand_tabs, html_escape};

/// Runs over the Markdown source before it is parsed
pub type TemplateHook = Arc<dyn Fn(&str) -> Result<String> + Send + Sync>;

lazy_static! {
    static ref AUTOLINK: Regex =
        Regex::new(r"(?i)\b(?:(?:https?|ftp)://|www\.)[^\s<>]+|\b[\w.+-]+@[\w-]+(?:\.[\w-]+)+")
            .unwrap();
    static ref SUPERSCRIPT: Regex = Regex::new(r"\^(?:\(([^)]*)\)|([^\s^()]+))").unwrap();
    static ref SELF_CLOSING: Regex = Regex::new(r"<(br|hr|img\b[^>]*?)\s*/>").unwrap();
}

/// Markdown renderer with syntax highlighting
#[derive(Clone)]
pub struct MarkdownRenderer {
    options: MarkdownOptions,
    base_url: String,
    highlighter: Arc<Highlighter>,
    hook: Option<TemplateHook>,
}

impl MarkdownRenderer {
    pub fn new(base_url: &str, options: MarkdownOptions, theme: &str) -> Self {
        Self {
            options,
            base_url: base_url.to_string(),
            highlighter: Arc::new(Highlighter::new(theme)),
            hook: None,
        }
    }

    /// Same renderer, with `hook` applied to every source before parsing
    pub fn with_template_hook(mut self, hook: TemplateHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Same renderer without a template hook
    pub fn plain(&self) -> Self {
        Self {
            hook: None,
            ..self.clone()
        }
    }

    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// Render markdown to HTML
    pub fn render(&self, text: &str) -> Result<String> {
        let source = self.preprocess(text)?;
        Ok(self.render_source(&source, self.options.has_flag(HtmlFlag::Toc)))
    }

    /// Render markdown to HTML along with a table of contents
    ///
    /// Returns `(toc, body)`. The body is rendered exactly as [`render`](Self::render) would. The
    /// table of contents comes from a second pass that always assigns heading
    /// ids, so its anchors match a body rendered with the `toc` flag.
    pub fn render_with_toc(&self, text: &str) -> Result<(String, String)> {
        let source = self.preprocess(text)?;
        let toc = render_toc(&self.headings(&source));
        let body = self.render_source(&source, self.options.has_flag(HtmlFlag::Toc));
        Ok((toc, body))
    }

    fn preprocess(&self, text: &str) -> Result<String> {
        let text = match &self.hook {
            Some(hook) => Cow::Owned(hook(text)?),
            None => Cow::Borrowed(text),
        };
        Ok(wikilink::protect_escapes(&text).into_owned())
    }

    fn render_source(&self, source: &str, heading_ids: bool) -> String {
        let parser = TextMergeStream::new(Parser::new_ext(source, self.options.parser_options()));

        let skip_images = self.options.has_flag(HtmlFlag::SkipImages);
        let skip_links = self.options.has_flag(HtmlFlag::SkipLinks);
        let safelink = self.options.has_flag(HtmlFlag::Safelink);
        let hard_wrap = self.options.has_flag(HtmlFlag::HardWrap);

        let mut out: Vec<Event> = Vec::new();
        let mut code: Option<(Option<String>, String)> = None;
        let mut html_block: Option<String> = None;
        let mut skipped_images = 0usize;
        let mut open_images = 0usize;
        // One entry per open link: whether it was kept
        let mut links: Vec<bool> = Vec::new();
        let mut heading: Option<(usize, String)> = None;
        let mut ids = HeadingIds::default();

        for event in parser {
            if let Some((lang, content)) = &mut code {
                match event {
                    Event::Text(text) => content.push_str(&text),
                    Event::End(TagEnd::CodeBlock) => {
                        let html = self.code_block(content, lang.as_deref());
                        out.push(Event::Html(html.into()));
                        code = None;
                    }
                    _ => {}
                }
                continue;
            }

            if let Some(raw) = &mut html_block {
                match event {
                    Event::Html(html) | Event::Text(html) => raw.push_str(&html),
                    Event::End(TagEnd::HtmlBlock) => {
                        let raw = wikilink::restore_escapes(raw).into_owned();
                        self.push_html_block(raw, &mut out);
                        html_block = None;
                    }
                    _ => {}
                }
                continue;
            }

            if skipped_images > 0 {
                match event {
                    Event::Start(Tag::Image { .. }) => skipped_images += 1,
                    Event::End(TagEnd::Image) => skipped_images -= 1,
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(str::to_string)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((lang, String::new()));
                }
                Event::Start(Tag::HtmlBlock) => html_block = Some(String::new()),
                Event::Start(Tag::Image { .. }) if skip_images => skipped_images += 1,
                Event::Start(Tag::Image { .. }) => {
                    open_images += 1;
                    out.push(event);
                }
                Event::End(TagEnd::Image) => {
                    open_images = open_images.saturating_sub(1);
                    out.push(event);
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    let keep = !skip_links && (!safelink || is_safe_link(&dest_url));
                    links.push(keep);
                    if keep {
                        out.push(Event::Start(Tag::Link {
                            link_type,
                            dest_url,
                            title,
                            id,
                        }));
                    }
                }
                Event::End(TagEnd::Link) => {
                    if links.pop().unwrap_or(true) {
                        out.push(event);
                    }
                }
                Event::Start(Tag::Heading { .. }) if heading_ids => {
                    heading = Some((out.len(), String::new()));
                    out.push(event);
                }
                Event::End(TagEnd::Heading(_)) if heading_ids => {
                    if let Some((index, text)) = heading.take() {
                        let id = ids.next(&text.replace(ESCAPE_MARK, ""));
                        if let Event::Start(Tag::Heading { id: slot, .. }) = &mut out[index] {
                            *slot = Some(id.into());
                        }
                    }
                    out.push(event);
                }
                Event::Text(text) => {
                    if let Some((_, buf)) = &mut heading {
                        buf.push_str(&text);
                    }
                    if links.is_empty() && open_images == 0 {
                        self.inline_extensions(&text, &mut out);
                    } else {
                        out.push(Event::Text(text));
                    }
                }
                Event::Code(text) => {
                    if let Some((_, buf)) = &mut heading {
                        buf.push_str(&text);
                    }
                    let code = wikilink::shield(&restored(text)).into_owned();
                    out.push(Event::Code(code.into()));
                }
                Event::InlineHtml(html) | Event::Html(html) => {
                    if let Some(event) = self.inline_html(html) {
                        out.push(event);
                    }
                }
                Event::SoftBreak if hard_wrap => out.push(Event::HardBreak),
                other => out.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, out.into_iter());

        if !self.options.has_flag(HtmlFlag::UseXhtml) {
            html_output = SELF_CLOSING.replace_all(&html_output, "<${1}>").into_owned();
        }

        wikilink::resolve(&html_output, &self.base_url)
    }

    /// Collect headings with the ids a rendering pass would assign
    fn headings(&self, source: &str) -> Vec<Heading> {
        let mut ids = HeadingIds::default();
        let mut headings = Vec::new();
        let mut current: Option<(u8, String)> = None;
        let skip_images = self.options.has_flag(HtmlFlag::SkipImages);
        let mut skipped_images = 0usize;

        for event in Parser::new_ext(source, self.options.parser_options()) {
            match event {
                Event::Start(Tag::Image { .. }) if skip_images => skipped_images += 1,
                Event::End(TagEnd::Image) if skip_images => {
                    skipped_images = skipped_images.saturating_sub(1)
                }
                _ if skipped_images > 0 => {}
                Event::Start(Tag::Heading { level, .. }) => {
                    current = Some((level as u8, String::new()));
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, buf)) = &mut current {
                        buf.push_str(&text);
                    }
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, text)) = current.take() {
                        let text = text.replace(ESCAPE_MARK, "");
                        let id = ids.next(&text);
                        headings.push(Heading { level, id, text });
                    }
                }
                _ => {}
            }
        }

        headings
    }

    fn code_block(&self, code: &str, lang: Option<&str>) -> String {
        let code = wikilink::restore_escapes(code);
        let code = if self.options.has_flag(HtmlFlag::ExpandTabs) {
            Cow::Owned(expand_tabs(&code))
        } else {
            code
        };

        let inner = match lang {
            Some(lang) => self.highlighter.highlight(&code, lang),
            None => html_escape(&code),
        };
        format!(
            "<pre class=\"highlight\"><code>{}</code></pre>\n",
            wikilink::shield(&inner)
        )
    }

    fn push_html_block<'a>(&self, raw: String, out: &mut Vec<Event<'a>>) {
        if self.options.has_flag(HtmlFlag::SkipHtml) {
            return;
        }
        if self.options.has_flag(HtmlFlag::SkipStyle)
            && raw.trim_start().to_ascii_lowercase().starts_with("<style")
        {
            return;
        }

        if self.options.has_flag(HtmlFlag::Escape) {
            out.push(Event::Start(Tag::Paragraph));
            out.push(Event::Text(raw.into()));
            out.push(Event::End(TagEnd::Paragraph));
        } else {
            out.push(Event::Html(raw.into()));
        }
    }

    fn inline_html<'a>(&self, html: CowStr<'a>) -> Option<Event<'a>> {
        if self.options.has_flag(HtmlFlag::SkipHtml) {
            None
        } else if self.options.has_flag(HtmlFlag::Escape) {
            Some(Event::Text(html))
        } else {
            Some(Event::InlineHtml(restored(html)))
        }
    }

    /// Bare URLs and `^superscript` in running text
    fn inline_extensions<'a>(&self, text: &str, out: &mut Vec<Event<'a>>) {
        let mut last = 0;
        if self.options.has_extension(Extension::Autolink) {
            for m in AUTOLINK.find_iter(text) {
                if m.start() < last {
                    continue;
                }
                let link = trim_autolink(m.as_str());
                if link.is_empty() {
                    continue;
                }
                self.superscript(&text[last..m.start()], out);
                self.autolink(link, out);
                last = m.start() + link.len();
            }
        }
        self.superscript(&text[last..], out);
    }

    fn autolink<'a>(&self, link: &str, out: &mut Vec<Event<'a>>) {
        if self.options.has_flag(HtmlFlag::SkipLinks) {
            out.push(Event::Text(link.to_string().into()));
            return;
        }

        let (link_type, dest) = if link.contains("://") {
            (LinkType::Autolink, link.to_string())
        } else if link.to_ascii_lowercase().starts_with("www.") {
            (LinkType::Autolink, format!("http://{}", link))
        } else {
            (LinkType::Email, format!("mailto:{}", link))
        };

        out.push(Event::Start(Tag::Link {
            link_type,
            dest_url: dest.into(),
            title: "".into(),
            id: "".into(),
        }));
        out.push(Event::Text(link.to_string().into()));
        out.push(Event::End(TagEnd::Link));
    }

    fn superscript<'a>(&self, text: &str, out: &mut Vec<Event<'a>>) {
        if text.is_empty() {
            return;
        }
        if !self.options.has_extension(Extension::Superscript) {
            out.push(Event::Text(text.to_string().into()));
            return;
        }

        let mut last = 0;
        for caps in SUPERSCRIPT.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());

            if whole.start() > last {
                out.push(Event::Text(text[last..whole.start()].to_string().into()));
            }
            out.push(Event::InlineHtml("<sup>".into()));
            out.push(Event::Text(inner.to_string().into()));
            out.push(Event::InlineHtml("</sup>".into()));
            last = whole.end();
        }
        if last < text.len() {
            out.push(Event::Text(text[last..].to_string().into()));
        }
    }
}

fn restored(text: CowStr<'_>) -> CowStr<'_> {
    if text.contains(ESCAPE_MARK) {
        text.replace(ESCAPE_MARK, "\\").into()
    } else {
        text
    }
}

/// Drop trailing punctuation that belongs to the sentence, not the URL
fn trim_autolink(link: &str) -> &str {
    let mut end = link.len();
    while let Some(c) = link[..end].chars().last() {
        let current = &link[..end];
        let unbalanced = c == ')' && current.matches('(').count() < current.matches(')').count();
        if matches!(c, '.' | ',' | ':' | ';' | '!' | '?' | '"' | '\'') || unbalanced {
            end -= c.len_utf8();
        } else {
            break;
        }
    }
    &link[..end]
}

/// Relative links and a handful of well-known schemes
fn is_safe_link(dest: &str) -> bool {
    let dest = dest.trim().to_ascii_lowercase();
    match dest.find(':') {
        None => true,
        Some(pos) if dest[..pos].contains(['/', '?', '#']) => true,
        Some(pos) => matches!(&dest[..pos], "http" | "https" | "ftp" | "mailto"),
    }
}
