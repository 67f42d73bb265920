//! Generator module - runs the content pipeline
//!
//! Phases run in order: posts, pages, tags, archive. The post phase hands
//! back the [`Store`]; everything after it only reads from the store.

mod store;
mod writer;

pub use store::Store;
pub use writer::{archive_path, page_path, post_path, tag_path, Writer};

use std::path::Path;
use std::sync::Arc;

use tera::Context;

use crate::content::{ContentLoader, LoadedPage, MarkdownRenderer};
use crate::error::{chain, Error, Result};
use crate::templates::TemplateRenderer;
use crate::Elyse;

/// What a run produced
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub posts: usize,
    pub pages: usize,
    pub tags: usize,
    pub archive: bool,
    /// Items left out because of a content error
    pub skipped: usize,
}

/// Static site generator over one source tree
pub struct Generator<'a> {
    elyse: &'a Elyse,
    markdown: MarkdownRenderer,
    templates: Arc<TemplateRenderer>,
    writer: Writer,
}

impl<'a> Generator<'a> {
    /// Create a new generator; fails when a template does not parse
    pub fn new(elyse: &'a Elyse) -> Result<Self> {
        let config = &elyse.config;
        let markdown = MarkdownRenderer::new(
            &config.base_url,
            elyse.markdown.clone(),
            &config.highlight_theme,
        );
        let templates = TemplateRenderer::new(&elyse.templates_dir(), config, markdown.clone())?;

        Ok(Self {
            elyse,
            markdown,
            templates: Arc::new(templates),
            writer: Writer::new(&elyse.dest_dir),
        })
    }

    /// Generate the entire site
    pub fn generate(&self) -> Result<Summary> {
        let mut summary = Summary::default();

        let store = self.generate_posts(&mut summary)?;
        let templates = Arc::new(self.templates.with_base(&store.context()));

        self.generate_pages(&templates, &mut summary)?;
        self.generate_tags(&store, &templates, &mut summary)?;
        self.generate_archive(&store, &templates, &mut summary)?;

        Ok(summary)
    }

    /// Renderer for post and page bodies
    fn content_renderer(&self, templates: &Arc<TemplateRenderer>) -> MarkdownRenderer {
        if self.elyse.config.template_content {
            self.markdown.clone().with_template_hook(templates.hook())
        } else {
            self.markdown.clone()
        }
    }

    fn generate_posts(&self, summary: &mut Summary) -> Result<Store> {
        let config = &self.elyse.config;
        let mut store = Store::new(&config.base_url);
        let renderer = self.content_renderer(&self.templates);
        let loader = ContentLoader::new(&self.elyse.source_dir, config, &renderer);

        let files = loader.post_files();
        if files.is_empty() {
            tracing::debug!("No posts in {:?}", loader.posts_dir());
            return Ok(store);
        }

        for path in &files {
            match self.generate_post(&loader, path, &mut store) {
                Ok(()) => summary.posts += 1,
                Err(e) => skip(path, e, summary)?,
            }
        }

        tracing::info!("Generated {} posts", summary.posts);
        Ok(store)
    }

    fn generate_post(&self, loader: &ContentLoader, path: &Path, store: &mut Store) -> Result<()> {
        let config = &self.elyse.config;
        let post = loader.load_post(path)?;
        if store.contains_url(&post.url) {
            return Err(Error::DuplicateUrl(post.url));
        }

        let mut bindings = Context::new();
        bindings.insert("post", &post);
        let html = self.templates.render(&post.layout, &bindings)?;
        self.writer.write(post_path(&post), html.as_bytes())?;

        store.insert(
            post,
            config.archive_layout.is_some(),
            config.tag_layout.is_some(),
        )?;
        Ok(())
    }

    fn generate_pages(&self, templates: &Arc<TemplateRenderer>, summary: &mut Summary) -> Result<()> {
        let renderer = self.content_renderer(templates);
        let loader = ContentLoader::new(&self.elyse.source_dir, &self.elyse.config, &renderer);

        let files = loader.page_files();
        if files.is_empty() {
            tracing::debug!("No pages in {:?}", loader.pages_dir());
            return Ok(());
        }

        for path in &files {
            match self.generate_page(&loader, templates, path) {
                Ok(()) => summary.pages += 1,
                Err(e) => skip(path, e, summary)?,
            }
        }

        tracing::info!("Generated {} pages", summary.pages);
        Ok(())
    }

    fn generate_page(
        &self,
        loader: &ContentLoader,
        templates: &TemplateRenderer,
        path: &Path,
    ) -> Result<()> {
        let page = loader.load_page(path)?;
        let in_root = self.elyse.config.is_root(page.slug());
        let output = page_path(page.slug(), page.is_markdown(), in_root);

        let html = match &page {
            LoadedPage::Markdown(page) => {
                let mut bindings = Context::new();
                bindings.insert("page", page);
                bindings.insert("content", &page.content);
                if let Some(toc) = &page.toc {
                    bindings.insert("toc", toc);
                }
                templates.render(&page.layout, &bindings)?
            }
            LoadedPage::Raw { template, .. } => templates.render_str(template, &Context::new())?,
        };

        self.writer.write(output, html.as_bytes())?;
        Ok(())
    }

    fn generate_tags(
        &self,
        store: &Store,
        templates: &TemplateRenderer,
        summary: &mut Summary,
    ) -> Result<()> {
        let Some(layout) = &self.elyse.config.tag_layout else {
            tracing::debug!("No tag_layout configured, skipping tags");
            return Ok(());
        };
        if store.tags().is_empty() {
            return Ok(());
        }

        for tag in store.tags().values() {
            let mut bindings = Context::new();
            bindings.insert("tag", tag);

            match templates.render(layout, &bindings) {
                Ok(html) => {
                    self.writer.write(tag_path(tag), html.as_bytes())?;
                    summary.tags += 1;
                }
                Err(e) if e.is_skippable() => {
                    tracing::warn!("Skipping tag {:?}: {}", tag.title, chain(&e));
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!("Generated {} tag pages", summary.tags);
        Ok(())
    }

    fn generate_archive(
        &self,
        store: &Store,
        templates: &TemplateRenderer,
        summary: &mut Summary,
    ) -> Result<()> {
        let Some(layout) = &self.elyse.config.archive_layout else {
            tracing::debug!("No archive_layout configured, skipping archive");
            return Ok(());
        };

        let mut bindings = Context::new();
        bindings.insert("archive", store.archive());

        match templates.render(layout, &bindings) {
            Ok(html) => {
                self.writer.write(archive_path(), html.as_bytes())?;
                summary.archive = true;
                tracing::info!("Generated archive page");
            }
            Err(e) if e.is_skippable() => {
                tracing::warn!("Skipping archive: {}", chain(&e));
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }
}

/// Log and count a content error; anything else ends the run
fn skip(path: &Path, err: Error, summary: &mut Summary) -> Result<()> {
    if !err.is_skippable() {
        return Err(err);
    }
    tracing::warn!("Skipping {:?}: {}", path, chain(&err));
    summary.skipped += 1;
    Ok(())
}
