//! Reading history, newest first.

use serde::{Deserialize, Serialize};

pub const MAX_ENTRIES: usize = 50;

const DEFAULT_TITLE: &str = "Unknown Title";
const DEFAULT_IMAGE: &str = "assets/icon.png";
const DEFAULT_CHAPTER_TITLE: &str = "Chapter ?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub slug: String,
    pub title: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_chapter_slug: Option<String>,
    pub last_chapter_title: String,
    /// Milliseconds since the unix epoch.
    pub timestamp: u64,
}

/// Fields written on a visit. Absent fields keep the previous entry's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryUpdate {
    pub slug: String,
    pub title: Option<String>,
    pub image: Option<String>,
    pub chapter_slug: Option<String>,
    pub chapter_title: Option<String>,
}

impl HistoryUpdate {
    pub fn comic(slug: &str, title: Option<&str>, image: Option<&str>) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.map(str::to_string),
            image: image.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn chapter(mut self, chapter_slug: &str, chapter_title: Option<&str>) -> Self {
        self.chapter_slug = Some(chapter_slug.to_string());
        self.chapter_title = chapter_title.map(str::to_string);
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Moves `update.slug` to the front, merged with its previous entry, and
/// evicts from the back past [`MAX_ENTRIES`].
pub fn record(entries: &mut Vec<HistoryEntry>, update: HistoryUpdate, now: u64) {
    let previous = entries
        .iter()
        .position(|e| e.slug == update.slug)
        .map(|i| entries.remove(i));

    let (title, image, chapter_slug, chapter_title) = match previous {
        Some(p) => (
            Some(p.title),
            Some(p.image),
            p.last_chapter_slug,
            Some(p.last_chapter_title),
        ),
        None => (None, None, None, None),
    };

    let entry = HistoryEntry {
        title: non_empty(update.title)
            .or(title)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        image: non_empty(update.image)
            .or(image)
            .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
        last_chapter_slug: non_empty(update.chapter_slug).or(chapter_slug),
        last_chapter_title: non_empty(update.chapter_title)
            .or(chapter_title)
            .unwrap_or_else(|| DEFAULT_CHAPTER_TITLE.to_string()),
        slug: update.slug,
        timestamp: now,
    };

    entries.insert(0, entry);
    entries.truncate(MAX_ENTRIES);
}

pub fn find<'a>(entries: &'a [HistoryEntry], slug: &str) -> Option<&'a HistoryEntry> {
    entries.iter().find(|e| e.slug == slug)
}
