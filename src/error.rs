//! Error types shared by the content pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or running the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A `misaka_extensions` entry names no known extension.
    #[error("unknown markdown extension `{0}`")]
    UnknownExtension(String),

    /// A `misaka_html_flags` entry names no known flag.
    #[error("unknown markdown html flag `{0}`")]
    UnknownHtmlFlag(String),

    /// The document does not start with a `---` delimited block.
    #[error("missing front-matter")]
    MissingFrontmatter,

    /// The front-matter block is not a valid YAML mapping.
    #[error("invalid front-matter: {0}")]
    Frontmatter(#[from] serde_yaml::Error),

    /// A Markdown page without a `layout` key.
    #[error("no layout declared")]
    MissingLayout,

    /// The date prefix of a post file name is not a calendar date.
    #[error("invalid date `{0}`")]
    InvalidDate(String),

    /// Another post already claimed this url.
    #[error("duplicate url `{0}`")]
    DuplicateUrl(String),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error only affects the item being processed.
    ///
    /// Skippable errors are logged and the run continues; everything else
    /// aborts the run.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Error::MissingFrontmatter
                | Error::Frontmatter(_)
                | Error::MissingLayout
                | Error::InvalidDate(_)
                | Error::DuplicateUrl(_)
                | Error::Template(_)
                | Error::Read { .. }
        )
    }
}

/// Flatten an error and its sources into a single line.
///
/// Tera reports the interesting part of a failure in nested sources, so
/// diagnostics print the whole chain.
pub fn chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        // `#[error("...: {0}")]` variants already print their source
        if !message.ends_with(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skippable_classification() {
        assert!(Error::MissingLayout.is_skippable());
        assert!(Error::DuplicateUrl("2023/01/01/a".into()).is_skippable());
        assert!(!Error::UnknownExtension("tabels".into()).is_skippable());
        let write = Error::Write {
            path: PathBuf::from("build/index.html"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!write.is_skippable());
    }

    #[test]
    fn test_chain_includes_sources() {
        let err = Error::Write {
            path: PathBuf::from("out"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let message = chain(&err);
        assert!(message.starts_with("failed to write"));
        assert!(message.ends_with(": disk full"));
        assert_eq!(message.matches("disk full").count(), 1);
    }
}
