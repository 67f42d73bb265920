//! Posts collected during the post phase

use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;
use tera::Context;

use crate::content::{Post, Tag};
use crate::error::{Error, Result};
use crate::helpers::slugify;

/// Post list, per-year archive and per-tag lists
///
/// All three hold the same `Rc<Post>` values, in the order posts were
/// inserted. Once the post phase returns the store it is only read.
#[derive(Debug, Default)]
pub struct Store {
    base_url: String,
    posts: Vec<Rc<Post>>,
    archive: IndexMap<i32, Vec<Rc<Post>>>,
    tags: IndexMap<String, Tag>,
    urls: HashSet<String>,
}

impl Store {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Add a post to the list and, when enabled, to its year and its tags
    pub fn insert(&mut self, post: Post, archive_enabled: bool, tags_enabled: bool) -> Result<Rc<Post>> {
        if !self.urls.insert(post.url.clone()) {
            return Err(Error::DuplicateUrl(post.url));
        }

        let post = Rc::new(post);
        self.posts.push(Rc::clone(&post));

        if archive_enabled {
            self.archive
                .entry(post.year)
                .or_default()
                .push(Rc::clone(&post));
        }

        if tags_enabled {
            // Keyed by slug: names that share an output directory share a tag,
            // titled after the first name seen
            for name in &post.tags {
                let tag = self
                    .tags
                    .entry(slugify(name))
                    .or_insert_with(|| Tag::new(name, &self.base_url));
                if !tag.posts.last().is_some_and(|last| Rc::ptr_eq(last, &post)) {
                    tag.posts.push(Rc::clone(&post));
                }
            }
        }

        Ok(post)
    }

    pub fn posts(&self) -> &[Rc<Post>] {
        &self.posts
    }

    pub fn archive(&self) -> &IndexMap<i32, Vec<Rc<Post>>> {
        &self.archive
    }

    /// Tags keyed by slug
    pub fn tags(&self) -> &IndexMap<String, Tag> {
        &self.tags
    }

    /// `posts`, `archive` and `tags` as template bindings
    pub fn context(&self) -> Context {
        let mut context = Context::new();
        context.insert("posts", &self.posts);
        context.insert("archive", &self.archive);
        context.insert("tags", &self.tags);
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{FrontMatter, PostName};
    use chrono::Local;
    use std::path::PathBuf;

    fn post(file_name: &str, tags: &[&str]) -> Post {
        let front_matter = FrontMatter {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        };
        Post::new(
            PostName::parse(file_name).unwrap(),
            front_matter,
            String::new(),
            Local::now(),
            PathBuf::from(file_name),
            "/",
        )
    }

    #[test]
    fn test_insert_aggregates() {
        let mut store = Store::new("/");
        store.insert(post("2023-06-01 b.md", &["rust"]), true, true).unwrap();
        store.insert(post("2023-01-01 a.md", &["rust", "web"]), true, true).unwrap();
        store.insert(post("2022-12-31 c.md", &[]), true, true).unwrap();

        let titles: Vec<&str> = store.posts().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a", "c"]);

        let years: Vec<i32> = store.archive().keys().copied().collect();
        assert_eq!(years, vec![2023, 2022]);
        let bucket: Vec<&str> = store.archive()[&2023].iter().map(|p| p.title.as_str()).collect();
        assert_eq!(bucket, vec!["b", "a"]);

        assert_eq!(store.tags().len(), 2);
        assert_eq!(store.tags()["rust"].posts.len(), 2);
        assert_eq!(store.tags()["web"].url, "/tags/web");
    }

    #[test]
    fn test_tags_merge_by_slug() {
        let mut store = Store::new("/");
        store.insert(post("2023-06-01 b.md", &["Rust"]), true, true).unwrap();
        store.insert(post("2023-01-01 a.md", &["rust", "RUST"]), true, true).unwrap();

        assert_eq!(store.tags().len(), 1);
        let tag = &store.tags()["rust"];
        assert_eq!(tag.title, "Rust");
        let titles: Vec<&str> = tag.posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a"]);
    }

    #[test]
    fn test_aggregates_share_posts() {
        let mut store = Store::new("/");
        let inserted = store.insert(post("2023-06-01 b.md", &["rust"]), true, true).unwrap();
        assert!(Rc::ptr_eq(&inserted, &store.posts()[0]));
        assert!(Rc::ptr_eq(&inserted, &store.archive()[&2023][0]));
        assert!(Rc::ptr_eq(&inserted, &store.tags()["rust"].posts[0]));
    }

    #[test]
    fn test_disabled_aggregation() {
        let mut store = Store::new("/");
        store.insert(post("2023-06-01 b.md", &["rust"]), false, false).unwrap();
        assert_eq!(store.posts().len(), 1);
        assert!(store.archive().is_empty());
        assert!(store.tags().is_empty());
    }

    #[test]
    fn test_duplicate_url() {
        let mut store = Store::new("/");
        store.insert(post("2023-06-01 b.md", &[]), true, true).unwrap();
        assert!(store.contains_url("2023/06/01/b"));

        let err = store.insert(post("2023-06-01 B.md", &[]), true, true).unwrap_err();
        assert!(matches!(err, Error::DuplicateUrl(ref url) if url == "2023/06/01/b"));
        assert_eq!(store.posts().len(), 1);
    }

    #[test]
    fn test_context() {
        let mut store = Store::new("/");
        store.insert(post("2023-06-01 b.md", &["rust"]), true, true).unwrap();
        let value = store.context().into_json();
        assert_eq!(value["posts"][0]["url"], "2023/06/01/b");
        assert_eq!(value["archive"]["2023"][0]["title"], "b");
        assert_eq!(value["tags"]["rust"]["slug"], "rust");
    }
}
