//! Per-session navigation state: the active comic and its chapter list.
//!
//! Lives only as long as the controller that owns it; a full reload starts
//! from [`Session::default`].

use regex::Regex;
use std::sync::LazyLock;

use crate::gateway::ChapterOrder;
use crate::models::{ChapterRef, ComicDetail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicContext {
    pub slug: String,
    pub title: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub comic: Option<ComicContext>,
    pub chapters: Vec<ChapterRef>,
}

impl Session {
    pub fn set_comic(&mut self, slug: &str, detail: &ComicDetail) {
        self.comic = Some(ComicContext {
            slug: slug.to_string(),
            title: Some(detail.title.clone()).filter(|t| !t.is_empty()),
            image: Some(detail.image.clone()).filter(|i| !i.is_empty()),
        });
        self.chapters = detail.chapters.clone();
    }

    pub fn context_for(&self, comic_slug: &str) -> Option<&ComicContext> {
        self.comic.as_ref().filter(|c| c.slug == comic_slug)
    }

    /// Cached chapters, only when they belong to `comic_slug`.
    pub fn chapters_for(&self, comic_slug: &str) -> &[ChapterRef] {
        match self.context_for(comic_slug) {
            Some(_) => &self.chapters,
            None => &[],
        }
    }
}

/// The first chapter in reading order.
pub fn first_chapter(chapters: &[ChapterRef], order: ChapterOrder) -> Option<&ChapterRef> {
    match order {
        ChapterOrder::NewestFirst => chapters.last(),
        ChapterOrder::OldestFirst => chapters.first(),
    }
}

/// `(prev, next)` around `current` in reading order, or `None` when the list
/// does not contain it.
pub fn adjacent(
    chapters: &[ChapterRef],
    current: &str,
    order: ChapterOrder,
) -> Option<(Option<String>, Option<String>)> {
    let i = chapters.iter().position(|c| c.slug == current)?;
    let before = i.checked_sub(1).map(|j| chapters[j].slug.clone());
    let after = chapters.get(i + 1).map(|c| c.slug.clone());
    Some(match order {
        ChapterOrder::NewestFirst => (after, before),
        ChapterOrder::OldestFirst => (before, after),
    })
}

static CHAPTER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(\.\d+)?)").expect("chapter number pattern is valid"));

/// Reader label for a chapter title: "Chapter 12" style where possible.
pub fn chapter_label(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return "Chapter".to_string();
    }
    if text.to_lowercase().contains("chapter") {
        return text.to_string();
    }
    match CHAPTER_NUMBER.captures(text).and_then(|c| c.get(1)) {
        Some(n) => format!("Chapter {}", n.as_str()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapters(slugs: &[&str]) -> Vec<ChapterRef> {
        slugs
            .iter()
            .map(|s| ChapterRef {
                slug: s.to_string(),
                title: s.to_string(),
            })
            .collect()
    }

    #[test]
    fn first_chapter_follows_order() {
        let list = chapters(&["ch-3", "ch-2", "ch-1"]);
        assert_eq!(
            first_chapter(&list, ChapterOrder::NewestFirst).unwrap().slug,
            "ch-1"
        );
        assert_eq!(
            first_chapter(&list, ChapterOrder::OldestFirst).unwrap().slug,
            "ch-3"
        );
        assert!(first_chapter(&[], ChapterOrder::NewestFirst).is_none());
    }

    #[test]
    fn adjacent_in_newest_first_list() {
        let list = chapters(&["ch-3", "ch-2", "ch-1"]);
        assert_eq!(
            adjacent(&list, "ch-2", ChapterOrder::NewestFirst),
            Some((Some("ch-1".into()), Some("ch-3".into())))
        );
        assert_eq!(
            adjacent(&list, "ch-3", ChapterOrder::NewestFirst),
            Some((Some("ch-2".into()), None))
        );
        assert_eq!(
            adjacent(&list, "ch-1", ChapterOrder::OldestFirst),
            Some((Some("ch-2".into()), None))
        );
        assert_eq!(adjacent(&list, "ch-9", ChapterOrder::NewestFirst), None);
    }

    #[test]
    fn chapters_only_for_active_comic() {
        let mut session = Session::default();
        session.set_comic(
            "one-piece",
            &ComicDetail {
                title: "One Piece".into(),
                chapters: chapters(&["ch-1"]),
                ..Default::default()
            },
        );
        assert_eq!(session.chapters_for("one-piece").len(), 1);
        assert!(session.chapters_for("naruto").is_empty());
        assert_eq!(
            session.context_for("one-piece").unwrap().title.as_deref(),
            Some("One Piece")
        );
        assert_eq!(session.context_for("one-piece").unwrap().image, None);
    }

    #[test]
    fn labels() {
        assert_eq!(chapter_label("Chapter 12"), "Chapter 12");
        assert_eq!(chapter_label("  CHAPTER 7 END "), "CHAPTER 7 END");
        assert_eq!(chapter_label("Ch. 10.5 - Finale"), "Chapter 10.5");
        assert_eq!(chapter_label("one-piece-1100"), "Chapter 1100");
        assert_eq!(chapter_label("ep 3."), "Chapter 3");
        assert_eq!(chapter_label("Prologue"), "Prologue");
        assert_eq!(chapter_label(""), "Chapter");
    }

    #[test]
    fn label_uses_first_number_only() {
        assert_eq!(chapter_label("Vol 2 Ep 15"), "Chapter 2");
        assert_eq!(chapter_label("ep 7.25.1"), "Chapter 7.25");
        assert_eq!(chapter_label(".5 extra"), "Chapter 5");
    }
}
