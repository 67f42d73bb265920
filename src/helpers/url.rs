//! URL helper functions

use deunicode::deunicode;
use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^a-z0-9_]+").unwrap();
}

/// Characters left alone when encoding an asset path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Turn text into a URL segment
///
/// Non-ASCII characters are transliterated, the result is lowercased and every
/// run of non-word characters becomes a single `-`. Paths are slugified one
/// segment at a time so the directory structure survives.
///
/// # Examples
/// ```ignore
/// slugify("Hello, Wörld!")      // -> "hello-world-"
/// slugify("Guides/First Steps") // -> "guides/first-steps"
/// ```
pub fn slugify(text: &str) -> String {
    text.split('/')
        .map(slugify_segment)
        .collect::<Vec<_>>()
        .join("/")
}

fn slugify_segment(segment: &str) -> String {
    let ascii = deunicode(segment).to_lowercase();
    NON_WORD.replace_all(&ascii, "-").into_owned()
}

/// Generate a site URL for a path
///
/// The path is slugified and joined to `base_url` with exactly one `/`. An
/// empty path yields `base_url` itself.
///
/// # Examples
/// ```ignore
/// url("https://example.com/", "About Me") // -> "https://example.com/about-me"
/// url("/", "")                            // -> "/"
/// ```
pub fn url(base_url: &str, path: &str) -> String {
    if path.is_empty() {
        return base_url.to_string();
    }
    join(base_url, &slugify(path))
}

/// Generate the URL of a file copied from `assets/`
///
/// Asset names are kept as they are on disk; only characters that are not
/// URL safe get percent-encoded.
pub fn asset(base_url: &str, path: &str) -> String {
    let encoded = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/");
    join(base_url, &format!("assets/{}", encoded))
}

fn join(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Hello,   World!"), "hello-world-");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
        assert_eq!(slugify("Crème Brûlée"), "creme-brulee");
        assert_eq!(slugify("Über"), "uber");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        for input in [
            "Hello World",
            "  leading and trailing  ",
            "Ünïcödé / Pâth",
            "a--b__c",
            "日本語",
            "",
            "C++ & Rust!",
        ] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_slugify_path_segments() {
        let path = "Guides/First Steps/Read Me";
        let joined = path
            .split('/')
            .map(slugify)
            .collect::<Vec<_>>()
            .join("/");
        assert_eq!(slugify(path), joined);
        assert_eq!(slugify(path), "guides/first-steps/read-me");
    }

    #[test]
    fn test_url() {
        assert_eq!(url("https://example.com/", "Home"), "https://example.com/home");
        assert_eq!(url("https://example.com", "Home"), "https://example.com/home");
        assert_eq!(url("/", "about/Team"), "/about/team");
        assert_eq!(url("https://example.com/", ""), "https://example.com/");
        assert_eq!(url("/", "2023/01/05/hello"), "/2023/01/05/hello");
    }

    #[test]
    fn test_asset() {
        assert_eq!(asset("/", "css/style.css"), "/assets/css/style.css");
        assert_eq!(
            asset("https://example.com/", "/img/My Photo.jpg"),
            "https://example.com/assets/img/My%20Photo.jpg"
        );
    }
}
