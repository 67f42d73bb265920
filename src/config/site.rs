//! Site configuration (config.yml)

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Prefix for every generated link
    pub base_url: String,

    /// Page slugs emitted at the destination root
    #[serde(deserialize_with = "slug_set")]
    pub root: BTreeSet<String>,

    /// Template for tag pages; tag generation is off without it
    pub tag_layout: Option<String>,

    /// Template for the archive page; archive generation is off without it
    pub archive_layout: Option<String>,

    // Scripts
    pub pre_scripts: Vec<ScriptSpec>,
    pub post_scripts: Vec<ScriptSpec>,

    // Markdown
    pub misaka_extensions: Option<Vec<String>>,
    pub misaka_html_flags: Option<Vec<String>>,

    /// Evaluate Markdown bodies as template strings before rendering them
    pub template_content: bool,

    /// syntect theme used for code blocks
    pub highlight_theme: String,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "/".to_string(),
            root: BTreeSet::new(),
            tag_layout: None,
            archive_layout: None,
            pre_scripts: Vec::new(),
            post_scripts: Vec::new(),
            misaka_extensions: None,
            misaka_html_flags: None,
            template_content: true,
            highlight_theme: "base16-ocean.dark".to_string(),
            extra: IndexMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config {:?}", path))
    }

    /// Parse configuration from YAML text; an empty document yields defaults
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Whether a page slug is placed at the destination root
    pub fn is_root(&self, slug: &str) -> bool {
        self.root.contains(slug)
    }

    /// Look up a pass-through key
    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.extra.get(key)
    }
}

/// A script entry from `pre_scripts` / `post_scripts`
///
/// Either a bare script name, or a mapping that spells out whether the
/// generator waits for the script to finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptSpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        wait: bool,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl ScriptSpec {
    /// File name under `scripts/`
    pub fn name(&self) -> &str {
        match self {
            ScriptSpec::Name(name) | ScriptSpec::Detailed { name, .. } => name,
        }
    }

    /// Whether to block until the script exits. Bare names never wait.
    pub fn wait(&self) -> bool {
        match self {
            ScriptSpec::Name(_) => false,
            ScriptSpec::Detailed { wait, .. } => *wait,
        }
    }

    pub fn args(&self) -> &[String] {
        match self {
            ScriptSpec::Name(_) => &[],
            ScriptSpec::Detailed { args, .. } => args,
        }
    }
}

/// Accepts a sequence of names, the keys of a mapping, or a single name
fn slug_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, MapAccess, SeqAccess, Visitor};
    use std::fmt;

    struct SlugSet;

    impl<'de> Visitor<'de> for SlugSet {
        type Value = BTreeSet<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a page name or a set of page names")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(BTreeSet::from([value.to_string()]))
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut set = BTreeSet::new();
            while let Some(item) = seq.next_element::<String>()? {
                set.insert(item);
            }
            Ok(set)
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut set = BTreeSet::new();
            while let Some((key, _)) = map.next_entry::<String, serde::de::IgnoredAny>()? {
                set.insert(key);
            }
            Ok(set)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(BTreeSet::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(BTreeSet::new())
        }
    }

    deserializer.deserialize_any(SlugSet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.base_url, "/");
        assert!(config.root.is_empty());
        assert!(config.tag_layout.is_none());
        assert!(config.template_content);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
base_url: https://example.com/
root:
  - about
  - index.html
tag_layout: tag.html
pre_scripts:
  - prepare.sh
  - name: compress.sh
    wait: true
    args: [--fast]
title: My Blog
"#;
        let config = SiteConfig::parse(yaml).unwrap();
        assert_eq!(config.base_url, "https://example.com/");
        assert!(config.is_root("about"));
        assert!(config.is_root("index.html"));
        assert!(!config.is_root("contact"));
        assert_eq!(config.tag_layout.as_deref(), Some("tag.html"));
        assert!(config.archive_layout.is_none());
        assert_eq!(config.pre_scripts.len(), 2);
        assert_eq!(config.pre_scripts[0], ScriptSpec::Name("prepare.sh".into()));
        assert!(!config.pre_scripts[0].wait());
        assert!(config.pre_scripts[1].wait());
        assert_eq!(config.pre_scripts[1].args(), ["--fast".to_string()]);
        assert_eq!(
            config.get("title").and_then(|v| v.as_str()),
            Some("My Blog")
        );
    }

    #[test]
    fn test_root_as_mapping_or_string() {
        let config = SiteConfig::parse("root:\n  about:\n  contact:\n").unwrap();
        assert!(config.is_root("about"));
        assert!(config.is_root("contact"));

        let config = SiteConfig::parse("root: about").unwrap();
        assert!(config.is_root("about"));
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = SiteConfig::parse("\n").unwrap();
        assert_eq!(config.base_url, "/");
    }

    #[test]
    fn test_extra_keys_are_serialized_for_templates() {
        let config = SiteConfig::parse("author: Jane\n").unwrap();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["author"], "Jane");
        assert_eq!(value["base_url"], "/");
    }
}
