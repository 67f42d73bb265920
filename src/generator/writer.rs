//! Output paths and file emission

use std::fs;
use std::path::{Path, PathBuf};

use crate::content::{Post, Tag};
use crate::error::{Error, Result};

/// Writes rendered files below the destination directory
#[derive(Debug, Clone)]
pub struct Writer {
    dest: PathBuf,
}

impl Writer {
    pub fn new<P: AsRef<Path>>(dest: P) -> Self {
        Self {
            dest: dest.as_ref().to_path_buf(),
        }
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Write `bytes` to `rel` under the destination, creating directories
    /// and overwriting any existing file
    pub fn write<P: AsRef<Path>>(&self, rel: P, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.dest.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, bytes).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Generated: {:?}", path);
        Ok(path)
    }

    /// Copy `src` verbatim to `rel` under the destination
    pub fn copy<P: AsRef<Path>>(&self, src: &Path, rel: P) -> Result<PathBuf> {
        let path = self.dest.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::copy(src, &path).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Copied: {:?}", path);
        Ok(path)
    }

    /// Remove everything inside the destination directory
    ///
    /// The directory itself is kept, or created when missing.
    pub fn clean(&self) -> Result<()> {
        if !self.dest.exists() {
            fs::create_dir_all(&self.dest).map_err(|source| Error::Write {
                path: self.dest.clone(),
                source,
            })?;
            return Ok(());
        }

        for entry in fs::read_dir(&self.dest)? {
            let path = entry?.path();
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.map_err(|source| Error::Write {
                path: path.clone(),
                source,
            })?;
            tracing::debug!("Deleted: {:?}", path);
        }

        Ok(())
    }
}

/// `YYYY/MM/DD/<slug>/index.html`
pub fn post_path(post: &Post) -> PathBuf {
    Path::new(&post.url).join("index.html")
}

/// Root pages sit at the top level (Markdown ones as `<slug>.html`); every
/// other page gets `<slug>/index.html`
pub fn page_path(slug: &str, markdown: bool, in_root: bool) -> PathBuf {
    match (in_root, markdown) {
        (true, true) => PathBuf::from(format!("{}.html", slug)),
        (true, false) => PathBuf::from(slug),
        (false, _) => Path::new(slug).join("index.html"),
    }
}

/// `tags/<slug>/index.html`
pub fn tag_path(tag: &Tag) -> PathBuf {
    Path::new("tags").join(&tag.slug).join("index.html")
}

/// `archive/index.html`
pub fn archive_path() -> PathBuf {
    Path::new("archive").join("index.html")
}
