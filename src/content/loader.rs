//! Content loader - loads posts and pages from the source directory

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use walkdir::WalkDir;

use super::{FrontMatter, MarkdownRenderer, Page, Post, PostName};
use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::helpers::{slugify, url};

/// A file from `pages/`, ready for its layout
#[derive(Debug)]
pub enum LoadedPage {
    Markdown(Page),
    /// Any other file: the whole text is a template
    Raw {
        slug: String,
        template: String,
        source: PathBuf,
    },
}

impl LoadedPage {
    pub fn slug(&self) -> &str {
        match self {
            LoadedPage::Markdown(page) => &page.slug,
            LoadedPage::Raw { slug, .. } => slug,
        }
    }

    pub fn is_markdown(&self) -> bool {
        matches!(self, LoadedPage::Markdown(_))
    }
}

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    source_dir: &'a Path,
    config: &'a SiteConfig,
    renderer: &'a MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    pub fn new(source_dir: &'a Path, config: &'a SiteConfig, renderer: &'a MarkdownRenderer) -> Self {
        Self {
            source_dir,
            config,
            renderer,
        }
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.source_dir.join("posts")
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.source_dir.join("pages")
    }

    /// Post files in processing order: newest file name first
    ///
    /// Entries that do not follow the `YYYY-MM-DD <title>.md` pattern are not
    /// posts and are left out.
    pub fn post_files(&self) -> Vec<PathBuf> {
        let posts_dir = self.posts_dir();
        if !posts_dir.is_dir() {
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&posts_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let matches = e.file_name().to_str().is_some_and(PostName::matches);
                if !matches {
                    tracing::debug!("Ignoring {:?}: not a post file name", e.path());
                }
                matches
            })
            .map(|e| e.into_path())
            .collect();

        files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
        files
    }

    /// Load a single post and render its body
    pub fn load_post(&self, path: &Path) -> Result<Post> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let name = PostName::parse(file_name)?;

        let content = read(path)?;
        let (front_matter, body) =
            FrontMatter::split(&content)?.ok_or(Error::MissingFrontmatter)?;
        let html = self.renderer.render(body)?;

        Ok(Post::new(
            name,
            front_matter,
            html,
            modified(path),
            path.to_path_buf(),
            &self.config.base_url,
        ))
    }

    /// Every file under `pages/`, sorted by path
    pub fn page_files(&self) -> Vec<PathBuf> {
        let pages_dir = self.pages_dir();
        if !pages_dir.is_dir() {
            return Vec::new();
        }

        WalkDir::new(&pages_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect()
    }

    /// Load a page; Markdown bodies are rendered, other files are kept as
    /// template text
    pub fn load_page(&self, path: &Path) -> Result<LoadedPage> {
        let relative = path.strip_prefix(self.pages_dir()).unwrap_or(path);
        let slug = page_slug(relative);
        let content = read(path)?;

        if !is_markdown_file(path) {
            return Ok(LoadedPage::Raw {
                slug,
                template: content,
                source: path.to_path_buf(),
            });
        }

        let (front_matter, body) =
            FrontMatter::split(&content)?.ok_or(Error::MissingFrontmatter)?;
        let layout = front_matter.layout.clone().ok_or(Error::MissingLayout)?;

        let (toc, html) = if front_matter.toc {
            let (toc, html) = self.renderer.render_with_toc(body)?;
            (Some(toc), html)
        } else {
            (None, self.renderer.render(body)?)
        };

        let page_url = if self.config.is_root(&slug) {
            format!("{}.html", url(&self.config.base_url, &slug))
        } else {
            url(&self.config.base_url, &slug)
        };

        Ok(LoadedPage::Markdown(Page::new(
            slug,
            page_url,
            layout,
            front_matter,
            html,
            toc,
            path.to_path_buf(),
        )))
    }
}

/// Slug of a page from its path under `pages/`
///
/// Every directory segment is slugified. Markdown pages lose their `.md`;
/// any other file keeps its extension so `feed.xml` stays `feed.xml`.
pub fn page_slug(relative: &Path) -> String {
    let stem = relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    let slug = slugify(&stem);

    match relative.extension().and_then(|e| e.to_str()) {
        Some(ext) if !is_markdown_file(relative) => format!("{}.{}", slug, ext),
        _ => slug,
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md")
        .unwrap_or(false)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn modified(path: &Path) -> DateTime<Local> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now())
}
