//! Template rendering using the Tera template engine
//!
//! Templates are loaded from `<source>/templates/`. Every render starts from
//! an immutable base context (`site`, plus `posts`, `archive` and `tags` once
//! the posts are known) and merges the per-call bindings into a copy of it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tera::{Context, Tera, Value};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::{MarkdownRenderer, TemplateHook};
use crate::error::{chain, Result};
use crate::helpers::{asset, format_date, from_timestamp, parse_date, url};

/// Format used by `date()` when none is given
const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Template renderer over the site's templates
#[derive(Clone)]
pub struct TemplateRenderer {
    tera: Tera,
    base: Context,
}

impl TemplateRenderer {
    /// Load every file under `templates_dir`
    ///
    /// A missing directory gives a renderer without templates; a template that
    /// fails to parse is an error.
    pub fn new(templates_dir: &Path, config: &SiteConfig, markdown: MarkdownRenderer) -> Result<Self> {
        let mut tera = Tera::default();
        if templates_dir.is_dir() {
            tera.add_template_files(template_files(templates_dir))?;
        }

        // Content is already HTML
        tera.autoescape_on(vec![]);

        tera.register_function("url", url_function(config.base_url.clone()));
        tera.register_function("asset", asset_function(config.base_url.clone()));
        tera.register_function("markdown", markdown_function(markdown));
        tera.register_function("date", date_function());

        let mut base = Context::new();
        base.insert("site", config);

        tracing::debug!(
            "Loaded {} templates from {:?}",
            tera.get_template_names().count(),
            templates_dir
        );

        Ok(Self { tera, base })
    }

    /// A renderer whose base context also carries `bindings`
    pub fn with_base(&self, bindings: &Context) -> Self {
        Self {
            tera: self.tera.clone(),
            base: self.context(bindings),
        }
    }

    /// The base context merged with `bindings`; the base is left untouched
    pub fn context(&self, bindings: &Context) -> Context {
        let mut context = self.base.clone();
        context.extend(bindings.clone());
        context
    }

    /// Template name for a layout: the exact name, else `<name>.html`
    pub fn resolve(&self, layout: &str) -> Option<String> {
        let html = format!("{}.html", layout);
        let mut fallback = None;
        for name in self.tera.get_template_names() {
            if name == layout {
                return Some(name.to_string());
            }
            if name == html {
                fallback = Some(html.clone());
            }
        }
        fallback
    }

    /// Render a layout with `bindings`
    pub fn render(&self, layout: &str, bindings: &Context) -> Result<String> {
        let name = self
            .resolve(layout)
            .ok_or_else(|| tera::Error::template_not_found(layout))?;
        Ok(self.tera.render(&name, &self.context(bindings))?)
    }

    /// Render a template given as text
    pub fn render_str(&self, text: &str, bindings: &Context) -> Result<String> {
        // Tera registers one-off templates on itself, so work on a copy
        let mut tera = self.tera.clone();
        Ok(tera.render_str(text, &self.context(bindings))?)
    }

    /// Markdown hook evaluating sources as templates against the base context
    pub fn hook(self: &Arc<Self>) -> TemplateHook {
        let templates = Arc::clone(self);
        Arc::new(move |text: &str| templates.render_str(text, &Context::new()))
    }
}

/// Every file under `dir`, named by its `/`-separated relative path
fn template_files(dir: &Path) -> Vec<(PathBuf, Option<String>)> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let name = e
                .path()
                .strip_prefix(dir)
                .ok()?
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            Some((e.into_path(), Some(name)))
        })
        .collect()
}

fn optional_str<'a>(
    args: &'a HashMap<String, Value>,
    function: &str,
    name: &str,
) -> tera::Result<Option<&'a str>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(tera::Error::msg(format!(
            "{}: `{}` must be a string, got {}",
            function, name, other
        ))),
    }
}

/// `url(path="")`: a site link for `path`
fn url_function(base_url: String) -> impl tera::Function {
    Box::new(
        move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            let path = optional_str(args, "url", "path")?.unwrap_or("");
            Ok(Value::String(url(&base_url, path)))
        },
    )
}

/// `asset(path=)`: a link to a copied asset
fn asset_function(base_url: String) -> impl tera::Function {
    Box::new(
        move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            let path = optional_str(args, "asset", "path")?
                .ok_or_else(|| tera::Error::msg("asset function requires 'path' parameter"))?;
            Ok(Value::String(asset(&base_url, path)))
        },
    )
}

/// `markdown(text=)`: render Markdown inline
fn markdown_function(renderer: MarkdownRenderer) -> impl tera::Function {
    Box::new(
        move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            let text = optional_str(args, "markdown", "text")?.unwrap_or("");
            renderer
                .render(text)
                .map(Value::String)
                .map_err(|e| tera::Error::msg(chain(&e)))
        },
    )
}

/// `date(format="%Y-%m-%d", when=<now>)`
///
/// `when` is an RFC 3339 timestamp, a `YYYY-MM-DD` date or unix seconds.
fn date_function() -> impl tera::Function {
    Box::new(
        move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            let format = optional_str(args, "date", "format")?.unwrap_or(DEFAULT_DATE_FORMAT);

            let when = match args.get("when") {
                None | Some(Value::Null) => Local::now(),
                Some(Value::String(s)) => parse_date(s)
                    .ok_or_else(|| tera::Error::msg(format!("date: cannot parse `{}`", s)))?,
                Some(Value::Number(n)) => n
                    .as_i64()
                    .and_then(from_timestamp)
                    .ok_or_else(|| tera::Error::msg(format!("date: bad timestamp {}", n)))?,
                Some(other) => {
                    return Err(tera::Error::msg(format!(
                        "date: `when` must be a string or a number, got {}",
                        other
                    )))
                }
            };

            format_date(&when, format)
                .map(Value::String)
                .ok_or_else(|| tera::Error::msg(format!("date: invalid format `{}`", format)))
        },
    )
}
