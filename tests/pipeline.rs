//! End-to-end runs over a small source tree

use std::fs;
use std::path::Path;

use elyse::config::SiteConfig;
use elyse::Elyse;
use tempfile::TempDir;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(dir: &Path, rel: &str) -> String {
    fs::read_to_string(dir.join(rel)).unwrap()
}

/// A site with three posts over two years, a root page, a raw feed and a
/// nested page
fn site(source: &Path) {
    write(source, "templates/post.html", "{{ post.title }}|{{ post.content }}");
    write(source, "templates/page.html", "{% for p in posts %}{{ p.slug }},{% endfor %}|{{ content }}");
    write(
        source,
        "templates/archive.html",
        "{% for year, posts in archive %}{{ year }}:{% for p in posts %}{{ p.slug }}{% endfor %};{% endfor %}",
    );

    write(source, "posts/2023-01-01 a.md", "---\ntags: [rust]\n---\nSee [[Bee|b]].\n");
    write(source, "posts/2023-06-01 b.md", "---\n---\nBee\n");
    write(source, "posts/2022-12-31 c.md", "---\n---\nSea\n");
    write(source, "posts/notes.md", "---\n---\nnot a post\n");

    write(source, "pages/about.md", "---\nlayout: page.html\n---\nAbout *me*\n");
    write(source, "pages/feed.xml", "{% for p in posts %}<item>{{ p.url }}</item>{% endfor %}");
    write(source, "pages/guides/First Steps.md", "---\nlayout: page\n---\nStart here\n");
}

fn config() -> SiteConfig {
    SiteConfig::parse(
        "
base_url: /
root: [about, feed.xml]
archive_layout: archive.html
",
    )
    .unwrap()
}

#[test]
fn test_generate_site() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("site");
    let dest = dir.path().join("build");
    site(&source);

    let elyse = Elyse::with_config(&source, &dest, config()).unwrap();
    let summary = elyse.generate().unwrap();

    assert_eq!(summary.posts, 3);
    assert_eq!(summary.pages, 3);
    assert_eq!(summary.tags, 0);
    assert!(summary.archive);
    assert_eq!(summary.skipped, 0);

    // Posts
    let a = read(&dest, "2023/01/01/a/index.html");
    assert!(a.starts_with("a|"));
    assert!(a.contains(r#"See <a href="/b">Bee</a>."#));
    assert!(dest.join("2023/06/01/b/index.html").exists());
    assert!(dest.join("2022/12/31/c/index.html").exists());
    assert!(!dest.join("notes").exists());

    // Pages see every post, newest first
    let about = read(&dest, "about.html");
    assert!(about.starts_with("b,a,c,|"));
    assert!(about.contains("<em>me</em>"));
    assert_eq!(
        read(&dest, "feed.xml"),
        "<item>2023/06/01/b</item><item>2023/01/01/a</item><item>2022/12/31/c</item>"
    );
    assert!(dest.join("guides/first-steps/index.html").exists());

    // Archive groups by year in post order
    assert_eq!(read(&dest, "archive/index.html"), "2023:ba;2022:c;");

    // No tag_layout, no tag pages
    assert!(!dest.join("tags").exists());
}

#[test]
fn test_tag_pages() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("site");
    let dest = dir.path().join("build");
    site(&source);
    write(
        &source,
        "templates/tag.html",
        "{{ tag.title }}:{% for p in tag.posts %}{{ p.slug }}{% endfor %}",
    );
    write(&source, "posts/2023-07-01 d.md", "---\ntags: rust\n---\nDee\n");

    let mut config = config();
    config.tag_layout = Some("tag.html".into());

    let elyse = Elyse::with_config(&source, &dest, config).unwrap();
    let summary = elyse.generate().unwrap();

    assert_eq!(summary.tags, 1);
    assert_eq!(read(&dest, "tags/rust/index.html"), "rust:da");
}

#[test]
fn test_tags_differing_in_case_share_a_page() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("site");
    let dest = dir.path().join("build");
    site(&source);
    write(
        &source,
        "templates/tag.html",
        "{{ tag.title }}:{% for p in tag.posts %}{{ p.slug }}{% endfor %}",
    );
    write(&source, "posts/2023-07-01 d.md", "---\ntags: [Rust]\n---\nDee\n");

    let mut config = config();
    config.tag_layout = Some("tag.html".into());

    let elyse = Elyse::with_config(&source, &dest, config).unwrap();
    let summary = elyse.generate().unwrap();

    assert_eq!(summary.tags, 1);
    assert_eq!(read(&dest, "tags/rust/index.html"), "Rust:da");
}

#[test]
fn test_templates_under_glob_characters() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("site [draft]");
    let dest = dir.path().join("build");
    site(&source);

    let elyse = Elyse::with_config(&source, &dest, config()).unwrap();
    let summary = elyse.generate().unwrap();

    assert_eq!(summary.posts, 3);
    assert!(read(&dest, "2023/06/01/b/index.html").starts_with("b|"));
}

#[test]
fn test_duplicate_url_is_skipped() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("site");
    let dest = dir.path().join("build");
    site(&source);
    write(&source, "posts/2023-01-01 A.md", "---\n---\nSame url as a\n");

    let elyse = Elyse::with_config(&source, &dest, config()).unwrap();
    let summary = elyse.generate().unwrap();

    assert_eq!(summary.posts, 3);
    assert_eq!(summary.skipped, 1);
    // "a" sorts after "A" in reverse name order, so it wins
    assert!(read(&dest, "2023/01/01/a/index.html").contains("See"));
}

#[test]
fn test_unknown_extension_fails_fast() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("site");
    site(&source);
    write(&source, "config.yml", "misaka_extensions: [tabels]\n");

    let err = Elyse::new(&source, dir.path().join("build")).unwrap_err();
    assert!(format!("{:#}", err).contains("tabels"));
    assert!(!dir.path().join("build").exists());
}

#[test]
fn test_destination_is_emptied() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("site");
    let dest = dir.path().join("build");
    site(&source);
    write(&dest, "old/index.html", "stale");

    let elyse = Elyse::with_config(&source, &dest, config()).unwrap();
    elyse.generate().unwrap();

    assert!(!dest.join("old").exists());
    assert!(dest.join("about.html").exists());
}
