use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkEntry {
    pub slug: String,
    pub title: String,
    pub image: String,
}

/// Removes the bookmark for `entry.slug` if present, otherwise appends it.
/// Returns whether the comic is bookmarked afterwards.
pub fn toggle(entries: &mut Vec<BookmarkEntry>, entry: BookmarkEntry) -> bool {
    match entries.iter().position(|b| b.slug == entry.slug) {
        Some(i) => {
            entries.remove(i);
            false
        }
        None => {
            entries.push(entry);
            true
        }
    }
}

pub fn contains(entries: &[BookmarkEntry], slug: &str) -> bool {
    entries.iter().any(|b| b.slug == slug)
}
