//! Front-matter parsing

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> std::result::Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter data from a post or page
///
/// Every field is optional. Keys the generator does not know about are kept
/// in `extra` and reach templates unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Request a table of contents (pages only)
    pub toc: bool,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Split a document into front-matter and body
    ///
    /// The document must open with a line of exactly `---` and the block must
    /// be closed by another line of exactly `---`. Without that structure the
    /// front-matter is absent and `Ok(None)` is returned; a block that is not
    /// a YAML mapping is an error.
    pub fn split(content: &str) -> Result<Option<(Self, &str)>> {
        let Some(rest) = strip_delimiter_line(content) else {
            return Ok(None);
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end_matches(['\n', '\r']) == "---" {
                let yaml = &rest[..offset];
                let body = &rest[offset + line.len()..];
                return Ok(Some((Self::parse_yaml(yaml)?, body)));
            }
            offset += line.len();
        }

        Ok(None)
    }

    fn parse_yaml(yaml: &str) -> Result<Self> {
        // An empty block deserializes as null, which is not a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Look up any front-matter key; missing keys read as `None`
    pub fn get(&self, key: &str) -> Option<serde_yaml::Value> {
        match key {
            "title" => self.title.clone().map(serde_yaml::Value::String),
            "layout" => self.layout.clone().map(serde_yaml::Value::String),
            "toc" => Some(serde_yaml::Value::Bool(self.toc)),
            "tags" => Some(serde_yaml::Value::Sequence(
                self.tags
                    .iter()
                    .cloned()
                    .map(serde_yaml::Value::String)
                    .collect(),
            )),
            _ => self.extra.get(key).cloned(),
        }
    }
}

fn strip_delimiter_line(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("---")?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
layout: post.html
tags:
  - rust
  - elyse
---

This is the content.
"#;

        let (fm, body) = FrontMatter::split(content).unwrap().unwrap();
        assert_eq!(fm.title, Some("Hello World".to_string()));
        assert_eq!(fm.layout.as_deref(), Some("post.html"));
        assert_eq!(fm.tags, vec!["rust", "elyse"]);
        assert_eq!(body, "\nThis is the content.\n");
    }

    #[test]
    fn test_parse_single_string_tags() {
        let content = "---\ntags: Notes\n---\nbody";
        let (fm, body) = FrontMatter::split(content).unwrap().unwrap();
        assert_eq!(fm.tags, vec!["Notes"]);
        assert_eq!(body, "body");
    }

    #[test]
    fn test_missing_keys_read_as_absent() {
        let (fm, _) = FrontMatter::split("---\nsubtitle: Hi\n---\n").unwrap().unwrap();
        assert_eq!(fm.layout, None);
        assert!(!fm.toc);
        assert!(fm.tags.is_empty());
        assert_eq!(fm.get("nothing"), None);
        assert_eq!(
            fm.get("subtitle"),
            Some(serde_yaml::Value::String("Hi".into()))
        );
    }

    #[test]
    fn test_empty_block() {
        let (fm, body) = FrontMatter::split("---\n---\nbody").unwrap().unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_crlf_line_endings() {
        let (fm, body) = FrontMatter::split("---\r\nlayout: page.html\r\n---\r\nbody")
            .unwrap()
            .unwrap();
        assert_eq!(fm.layout.as_deref(), Some("page.html"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_absent_frontmatter() {
        assert!(FrontMatter::split("Just text.\n").unwrap().is_none());
        assert!(FrontMatter::split("").unwrap().is_none());
        // Leading blank line: the delimiter must be the very first line
        assert!(FrontMatter::split("\n---\ntitle: x\n---\n").unwrap().is_none());
        // Delimiter lines must be exactly ---
        assert!(FrontMatter::split("----\ntitle: x\n----\n").unwrap().is_none());
        // Never closed
        assert!(FrontMatter::split("---\ntitle: x\n").unwrap().is_none());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let err = FrontMatter::split("---\n- just\n- a list\n---\nbody").unwrap_err();
        assert!(matches!(err, Error::Frontmatter(_)));
        assert!(err.is_skippable());
    }
}
