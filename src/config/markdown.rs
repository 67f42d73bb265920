//! Markdown dialect extensions and HTML flags
//!
//! Names follow the misaka/sundown vocabulary so existing `config.yml` files
//! keep working. Lookups are case-insensitive and accept the `EXT_` and
//! `HTML_` prefixes used by misaka's constants.

use std::collections::HashSet;
use std::str::FromStr;

use pulldown_cmark::Options;

use super::SiteConfig;
use crate::error::{Error, Result};

/// Markdown dialect extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    Tables,
    FencedCode,
    Autolink,
    Strikethrough,
    Superscript,
    LaxSpacing,
    SpaceHeaders,
    NoIntraEmphasis,
}

impl Extension {
    pub const ALL: [Extension; 8] = [
        Extension::Tables,
        Extension::FencedCode,
        Extension::Autolink,
        Extension::Strikethrough,
        Extension::Superscript,
        Extension::LaxSpacing,
        Extension::SpaceHeaders,
        Extension::NoIntraEmphasis,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Extension::Tables => "tables",
            Extension::FencedCode => "fenced_code",
            Extension::Autolink => "autolink",
            Extension::Strikethrough => "strikethrough",
            Extension::Superscript => "superscript",
            Extension::LaxSpacing => "lax_spacing",
            Extension::SpaceHeaders => "space_headers",
            Extension::NoIntraEmphasis => "no_intra_emphasis",
        }
    }
}

impl FromStr for Extension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = match normalize(s, "ext_").as_str() {
            // misaka 1.x renamed lax_html_blocks
            "lax_html_blocks" => "lax_spacing".to_string(),
            other => other.to_string(),
        };
        Extension::ALL
            .into_iter()
            .find(|ext| ext.name() == key)
            .ok_or_else(|| Error::UnknownExtension(s.to_string()))
    }
}

/// HTML rendering flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HtmlFlag {
    SkipHtml,
    SkipStyle,
    SkipImages,
    SkipLinks,
    ExpandTabs,
    Safelink,
    Toc,
    HardWrap,
    UseXhtml,
    Escape,
    Smartypants,
}

impl HtmlFlag {
    pub const ALL: [HtmlFlag; 11] = [
        HtmlFlag::SkipHtml,
        HtmlFlag::SkipStyle,
        HtmlFlag::SkipImages,
        HtmlFlag::SkipLinks,
        HtmlFlag::ExpandTabs,
        HtmlFlag::Safelink,
        HtmlFlag::Toc,
        HtmlFlag::HardWrap,
        HtmlFlag::UseXhtml,
        HtmlFlag::Escape,
        HtmlFlag::Smartypants,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HtmlFlag::SkipHtml => "skip_html",
            HtmlFlag::SkipStyle => "skip_style",
            HtmlFlag::SkipImages => "skip_images",
            HtmlFlag::SkipLinks => "skip_links",
            HtmlFlag::ExpandTabs => "expand_tabs",
            HtmlFlag::Safelink => "safelink",
            HtmlFlag::Toc => "toc",
            HtmlFlag::HardWrap => "hard_wrap",
            HtmlFlag::UseXhtml => "use_xhtml",
            HtmlFlag::Escape => "escape",
            HtmlFlag::Smartypants => "smartypants",
        }
    }
}

impl FromStr for HtmlFlag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = normalize(s, "html_");
        HtmlFlag::ALL
            .into_iter()
            .find(|flag| flag.name() == key)
            .ok_or_else(|| Error::UnknownHtmlFlag(s.to_string()))
    }
}

fn normalize(name: &str, prefix: &str) -> String {
    let lower = name.trim().to_ascii_lowercase().replace('-', "_");
    match lower.strip_prefix(prefix) {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// The set of enabled extensions and flags for one renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
    extensions: HashSet<Extension>,
    flags: HashSet<HtmlFlag>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            extensions: HashSet::from([
                Extension::Tables,
                Extension::FencedCode,
                Extension::Autolink,
                Extension::Strikethrough,
                Extension::NoIntraEmphasis,
            ]),
            flags: HashSet::new(),
        }
    }
}

impl MarkdownOptions {
    /// Options with nothing enabled
    pub fn empty() -> Self {
        Self {
            extensions: HashSet::new(),
            flags: HashSet::new(),
        }
    }

    /// Parse extension and flag names, failing on the first unknown one
    pub fn parse<E, F>(extensions: E, flags: F) -> Result<Self>
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        F: IntoIterator,
        F::Item: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<HashSet<Extension>>>()?;
        let flags = flags
            .into_iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<HashSet<HtmlFlag>>>()?;
        Ok(Self { extensions, flags })
    }

    /// Build options from the `misaka_extensions` / `misaka_html_flags` keys
    ///
    /// An absent key keeps the default for that half.
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let defaults = Self::default();
        let extensions = match &config.misaka_extensions {
            Some(names) => Self::parse(names, Vec::<String>::new())?.extensions,
            None => defaults.extensions,
        };
        let flags = match &config.misaka_html_flags {
            Some(names) => Self::parse(Vec::<String>::new(), names)?.flags,
            None => defaults.flags,
        };
        Ok(Self { extensions, flags })
    }

    pub fn has_extension(&self, ext: Extension) -> bool {
        self.extensions.contains(&ext)
    }

    pub fn has_flag(&self, flag: HtmlFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn with_extension(mut self, ext: Extension) -> Self {
        self.extensions.insert(ext);
        self
    }

    pub fn with_flag(mut self, flag: HtmlFlag) -> Self {
        self.flags.insert(flag);
        self
    }

    /// pulldown-cmark parser options for this set
    ///
    /// Fenced code, lax spacing, space-delimited headers and intra-word
    /// emphasis rules are CommonMark behavior in pulldown-cmark and need no
    /// parser option.
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.has_extension(Extension::Tables) {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.has_extension(Extension::Strikethrough) {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.has_flag(HtmlFlag::Smartypants) {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("tables".parse::<Extension>().unwrap(), Extension::Tables);
        assert_eq!("EXT_FENCED_CODE".parse::<Extension>().unwrap(), Extension::FencedCode);
        assert_eq!("lax_html_blocks".parse::<Extension>().unwrap(), Extension::LaxSpacing);
        assert_eq!("HTML_SKIP_HTML".parse::<HtmlFlag>().unwrap(), HtmlFlag::SkipHtml);
        assert_eq!("hard-wrap".parse::<HtmlFlag>().unwrap(), HtmlFlag::HardWrap);
    }

    #[test]
    fn test_unknown_name_is_config_error() {
        let err = "tabels".parse::<Extension>().unwrap_err();
        assert!(matches!(err, Error::UnknownExtension(ref name) if name == "tabels"));
        assert!(!err.is_skippable());

        let err = MarkdownOptions::parse(["tables"], ["toc", "blink"]).unwrap_err();
        assert!(matches!(err, Error::UnknownHtmlFlag(ref name) if name == "blink"));
    }

    #[test]
    fn test_from_config() {
        let mut config = SiteConfig::default();
        let options = MarkdownOptions::from_config(&config).unwrap();
        assert!(options.has_extension(Extension::Tables));
        assert!(!options.has_flag(HtmlFlag::Toc));

        config.misaka_extensions = Some(vec!["superscript".into()]);
        config.misaka_html_flags = Some(vec!["toc".into(), "hard_wrap".into()]);
        let options = MarkdownOptions::from_config(&config).unwrap();
        assert!(options.has_extension(Extension::Superscript));
        assert!(!options.has_extension(Extension::Tables));
        assert!(options.has_flag(HtmlFlag::Toc));
        assert!(options.has_flag(HtmlFlag::HardWrap));

        config.misaka_html_flags = Some(vec!["nope".into()]);
        assert!(MarkdownOptions::from_config(&config).is_err());
    }

    #[test]
    fn test_parser_options() {
        let options = MarkdownOptions::empty().with_extension(Extension::Tables);
        assert!(options.parser_options().contains(Options::ENABLE_TABLES));
        assert!(!options.parser_options().contains(Options::ENABLE_STRIKETHROUGH));
    }
}
