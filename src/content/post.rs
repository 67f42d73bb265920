//! Post, Page and Tag models

use std::path::PathBuf;
use std::rc::Rc;

use chrono::{DateTime, Datelike, Local, NaiveDate};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::FrontMatter;
use crate::error::{Error, Result};
use crate::helpers::{slugify, url};

/// Layout used by posts that do not declare one
pub const DEFAULT_POST_LAYOUT: &str = "post.html";

lazy_static! {
    static ref POST_FILE: Regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2}) (.+)\.md$").unwrap();
}

/// Keys computed by the generator; front-matter cannot shadow them
const RESERVED: &[&str] = &[
    "title", "slug", "year", "month", "day", "url", "permalink", "date", "mdate", "content",
    "layout", "tags", "toc",
];

/// Date and title taken from a `YYYY-MM-DD <title>.md` file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostName {
    pub date: NaiveDate,
    pub title: String,
}

impl PostName {
    /// Whether a file name follows the post naming pattern
    pub fn matches(file_name: &str) -> bool {
        POST_FILE.is_match(file_name)
    }

    pub fn parse(file_name: &str) -> Result<Self> {
        let caps = POST_FILE
            .captures(file_name)
            .ok_or_else(|| Error::InvalidDate(file_name.to_string()))?;

        let invalid = || Error::InvalidDate(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]));
        let year: i32 = caps[1].parse().map_err(|_| invalid())?;
        let month: u32 = caps[2].parse().map_err(|_| invalid())?;
        let day: u32 = caps[3].parse().map_err(|_| invalid())?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;

        Ok(Self {
            date,
            title: caps[4].to_string(),
        })
    }
}

/// A blog post
///
/// Posts are built once and shared between the post list, the archive and
/// the tags through `Rc`.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Front-matter title, or the title part of the file name
    pub title: String,
    pub slug: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// `YYYY/MM/DD/slug`
    pub url: String,
    pub permalink: String,
    pub date: NaiveDate,
    /// Last modification time of the source file
    pub mdate: DateTime<Local>,
    /// Rendered HTML
    pub content: String,
    pub layout: String,
    pub tags: Vec<String>,

    #[serde(skip)]
    pub source: PathBuf,

    /// Remaining front-matter fields
    #[serde(flatten)]
    pub meta: IndexMap<String, serde_yaml::Value>,
}

impl Post {
    pub fn new(
        name: PostName,
        front_matter: FrontMatter,
        content: String,
        mdate: DateTime<Local>,
        source: PathBuf,
        base_url: &str,
    ) -> Self {
        let slug = slugify(&name.title);
        let date = name.date;
        let path = post_url(date, &slug);

        Self {
            title: front_matter.title.unwrap_or(name.title),
            permalink: url(base_url, &path),
            url: path,
            slug,
            year: date.year(),
            month: date.month(),
            day: date.day(),
            date,
            mdate,
            content,
            layout: front_matter
                .layout
                .unwrap_or_else(|| DEFAULT_POST_LAYOUT.to_string()),
            tags: front_matter.tags,
            source,
            meta: without_reserved(front_matter.extra),
        }
    }
}

/// `YYYY/MM/DD/slug` for a post
pub fn post_url(date: NaiveDate, slug: &str) -> String {
    format!(
        "{:04}/{:02}/{:02}/{}",
        date.year(),
        date.month(),
        date.day(),
        slug
    )
}

/// A rendered Markdown page
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub slug: String,
    pub url: String,
    pub layout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toc: Option<String>,

    #[serde(skip)]
    pub source: PathBuf,

    #[serde(flatten)]
    pub meta: IndexMap<String, serde_yaml::Value>,
}

impl Page {
    pub fn new(
        slug: String,
        url: String,
        layout: String,
        front_matter: FrontMatter,
        content: String,
        toc: Option<String>,
        source: PathBuf,
    ) -> Self {
        Self {
            slug,
            url,
            layout,
            title: front_matter.title,
            content,
            toc,
            source,
            meta: without_reserved(front_matter.extra),
        }
    }
}

/// A tag with the posts that declare it, in processing order
#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub title: String,
    pub slug: String,
    pub url: String,
    pub posts: Vec<Rc<Post>>,
}

impl Tag {
    pub fn new(title: &str, base_url: &str) -> Self {
        let slug = slugify(title);
        Self {
            title: title.to_string(),
            url: url(base_url, &format!("tags/{}", slug)),
            slug,
            posts: Vec::new(),
        }
    }
}

fn without_reserved(
    mut extra: IndexMap<String, serde_yaml::Value>,
) -> IndexMap<String, serde_yaml::Value> {
    extra.retain(|key, _| !RESERVED.contains(&key.as_str()));
    extra
}
