//! Provider-independent content model.
//!
//! Every provider adapter normalizes into these types before anything reaches
//! the router.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComicCard {
    pub slug: String,
    pub title: String,
    pub image: String,
    /// Comic type as reported by the provider ("Manga", "Manhwa", ...).
    pub kind: Option<String>,
    pub latest_chapter: Option<String>,
}

impl ComicCard {
    /// Badge class used to colour the card by comic type.
    pub fn type_class(&self) -> &'static str {
        type_class(self.kind.as_deref())
    }
}

pub fn type_class(kind: Option<&str>) -> &'static str {
    let Some(kind) = kind else {
        return "type-default";
    };
    let kind = kind.to_lowercase();
    if kind.contains("manga") {
        "type-manga"
    } else if kind.contains("manhwa") {
        "type-manhwa"
    } else if kind.contains("manhua") {
        "type-manhua"
    } else {
        "type-default"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Listing {
    pub items: Vec<ComicCard>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HomeFeed {
    pub hot: Vec<ComicCard>,
    pub latest: Vec<ComicCard>,
    pub projects: Vec<ComicCard>,
}

impl HomeFeed {
    pub fn is_empty(&self) -> bool {
        self.hot.is_empty() && self.latest.is_empty() && self.projects.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRef {
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComicDetail {
    pub slug: String,
    pub title: String,
    pub image: String,
    pub synopsis: Option<String>,
    pub rating: Option<String>,
    pub status: Option<String>,
    pub kind: Option<String>,
    pub genres: Vec<Genre>,
    /// Chapters in the order the provider returned them.
    pub chapters: Vec<ChapterRef>,
}

impl ComicDetail {
    /// Chapters whose title contains `query`, ignoring case.
    pub fn filter_chapters(&self, query: &str) -> Vec<&ChapterRef> {
        let needle = query.to_lowercase();
        self.chapters
            .iter()
            .filter(|c| c.title.to_lowercase().contains(&needle))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChapterContent {
    pub slug: String,
    pub title: Option<String>,
    /// Slug of the comic this chapter belongs to, when the provider says.
    pub comic_slug: Option<String>,
    pub comic_title: Option<String>,
    pub images: Vec<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
}
