//! elyse: a simple static website generator
//!
//! Markdown posts and pages plus a directory of Tera templates go in; a
//! rendered HTML site comes out, with per-year archives and tag pages.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod templates;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use error::Error;
pub use generator::Summary;

/// The main Elyse application
#[derive(Debug, Clone)]
pub struct Elyse {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Validated Markdown extensions and flags
    pub markdown: config::MarkdownOptions,
    /// Source directory
    pub source_dir: PathBuf,
    /// Destination (output) directory
    pub dest_dir: PathBuf,
}

impl Elyse {
    /// Create an instance for a source tree, reading `config.yml` if present
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(source_dir: P, dest_dir: Q) -> Result<Self> {
        let config_path = source_dir.as_ref().join("config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No config file at {:?}, using defaults", config_path);
            config::SiteConfig::default()
        };

        Self::with_config(source_dir, dest_dir, config)
    }

    /// Create an instance with an already loaded configuration
    ///
    /// Markdown extension and flag names are checked here, before anything
    /// is rendered.
    pub fn with_config<P: AsRef<Path>, Q: AsRef<Path>>(
        source_dir: P,
        dest_dir: Q,
        config: config::SiteConfig,
    ) -> Result<Self> {
        let markdown = config::MarkdownOptions::from_config(&config)
            .context("Invalid markdown configuration")?;

        Ok(Self {
            config,
            markdown,
            source_dir: source_dir.as_ref().to_path_buf(),
            dest_dir: dest_dir.as_ref().to_path_buf(),
        })
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.source_dir.join("templates")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.source_dir.join("assets")
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.source_dir.join("scripts")
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<Summary> {
        commands::generate::run(self)
    }

    /// Empty the destination directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
