//! Dynamic content types.

use std::fmt;

use chrono::NaiveDate;

use crate::routes::ChangeFreq;

/// The four content collections served by the content API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Posts,
    Categories,
    Events,
    Authors,
}

impl ContentKind {
    /// All kinds in sitemap emission order.
    pub const ALL: [ContentKind; 4] = [Self::Posts, Self::Categories, Self::Events, Self::Authors];

    /// Collection name, also the default endpoint path and envelope key.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Categories => "categories",
            Self::Events => "events",
            Self::Authors => "authors",
        }
    }

    /// Item field holding the identifier used in the URL.
    #[must_use]
    pub fn identifier_field(&self) -> &'static str {
        match self {
            Self::Authors => "id",
            _ => "slug",
        }
    }

    /// Site-relative URL prefix; the identifier is appended after it.
    #[must_use]
    pub fn url_prefix(&self) -> &'static str {
        match self {
            Self::Posts => "/blog/",
            Self::Categories => "/category/",
            Self::Events => "/events/",
            Self::Authors => "/author/",
        }
    }

    /// Fixed change frequency for entries of this kind.
    #[must_use]
    pub fn change_freq(&self) -> ChangeFreq {
        ChangeFreq::Weekly
    }

    /// Fixed priority for entries of this kind.
    #[must_use]
    pub fn priority(&self) -> f32 {
        match self {
            Self::Posts | Self::Events => 0.7,
            Self::Categories | Self::Authors => 0.6,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One item of a content collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentItem {
    /// Slug or id; `None` when the API omitted it.
    pub identifier: Option<String>,

    /// UTC date of the last update, if the API supplied a parsable one.
    pub last_modified: Option<NaiveDate>,
}

impl ContentItem {
    /// Create an item with an identifier and optional date.
    pub fn new(identifier: impl Into<String>, last_modified: Option<NaiveDate>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            last_modified,
        }
    }

    /// The identifier if present and not blank.
    pub fn usable_identifier(&self) -> Option<&str> {
        self.identifier
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Results of fetching all four collections.
///
/// Any field may be empty; an empty field is what a failed fetch leaves
/// behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiResultSet {
    pub posts: Vec<ContentItem>,
    pub categories: Vec<ContentItem>,
    pub events: Vec<ContentItem>,
    pub authors: Vec<ContentItem>,
}

impl ApiResultSet {
    /// Items of one collection.
    pub fn get(&self, kind: ContentKind) -> &[ContentItem] {
        match kind {
            ContentKind::Posts => &self.posts,
            ContentKind::Categories => &self.categories,
            ContentKind::Events => &self.events,
            ContentKind::Authors => &self.authors,
        }
    }

    /// Replace the items of one collection.
    pub fn set(&mut self, kind: ContentKind, items: Vec<ContentItem>) {
        match kind {
            ContentKind::Posts => self.posts = items,
            ContentKind::Categories => self.categories = items,
            ContentKind::Events => self.events = items,
            ContentKind::Authors => self.authors = items,
        }
    }

    /// Whether every collection is empty.
    pub fn is_empty(&self) -> bool {
        ContentKind::ALL.iter().all(|kind| self.get(*kind).is_empty())
    }

    /// Total number of items across all collections.
    pub fn len(&self) -> usize {
        ContentKind::ALL.iter().map(|kind| self.get(*kind).len()).sum()
    }
}
