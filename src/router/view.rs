use std::fmt;

use crate::gateway::ListingQuery;
use crate::models::{ChapterRef, ComicCard, ComicDetail, HomeFeed, Pagination};
use crate::storage::{BookmarkEntry, HistoryEntry};

/// Number of latest releases shown on the home view.
pub const HOME_LATEST_LIMIT: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading,
    NotFound,
    Home(HomeFeed),
    Listing(ListingView),
    Detail(DetailView),
    Reader(ReaderView),
    History(Vec<HistoryEntry>),
    Bookmarks(Vec<BookmarkEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingView {
    pub heading: String,
    pub query: ListingQuery,
    pub items: Vec<ComicCard>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryAction {
    /// Continue from the last chapter read.
    Resume(String),
    /// Start from the first chapter in reading order.
    Start(String),
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub comic: ComicDetail,
    pub primary: PrimaryAction,
    pub last_read: Option<String>,
    pub bookmarked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderView {
    pub chapter_slug: String,
    pub comic_slug: Option<String>,
    pub comic_title: String,
    pub chapter_label: String,
    pub images: Vec<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
    /// Options for the chapter switcher; empty until the list is known.
    pub chapters: Vec<ChapterRef>,
}

impl ListingView {
    /// A listing that loaded but matched nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ReaderView {
    pub fn header(&self) -> String {
        format!("{} - {}", self.comic_title, self.chapter_label)
    }
}

fn write_cards(f: &mut fmt::Formatter<'_>, cards: &[ComicCard]) -> fmt::Result {
    for card in cards {
        write!(f, "  [{}] {} ({})", card.type_class(), card.title, card.slug)?;
        if let Some(latest) = &card.latest_chapter {
            write!(f, " - {}", latest)?;
        }
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Loading => writeln!(f, "Loading..."),
            View::NotFound => writeln!(f, "Error 404: page not found."),
            View::Home(feed) => {
                writeln!(f, "Popular today")?;
                write_cards(f, &feed.hot)?;
                writeln!(f, "Latest releases")?;
                let latest = &feed.latest[..feed.latest.len().min(HOME_LATEST_LIMIT)];
                write_cards(f, latest)?;
                writeln!(f, "Our projects")?;
                write_cards(f, &feed.projects)
            }
            View::Listing(listing) => {
                writeln!(f, "{}", listing.heading)?;
                if listing.is_empty() {
                    return writeln!(f, "  No comics found.");
                }
                write_cards(f, &listing.items)?;
                if let Some(p) = listing.pagination {
                    let more = if p.has_next_page { ", more available" } else { "" };
                    writeln!(f, "Page {}{}", p.current_page, more)?;
                }
                Ok(())
            }
            View::Detail(detail) => {
                let comic = &detail.comic;
                writeln!(f, "{}", comic.title)?;
                let facts: Vec<&str> = [&comic.rating, &comic.status, &comic.kind]
                    .into_iter()
                    .filter_map(|v| v.as_deref())
                    .collect();
                if !facts.is_empty() {
                    writeln!(f, "{}", facts.join(" | "))?;
                }
                if !comic.genres.is_empty() {
                    let genres: Vec<&str> = comic.genres.iter().map(|g| g.title.as_str()).collect();
                    writeln!(f, "Genres: {}", genres.join(", "))?;
                }
                writeln!(
                    f,
                    "{}",
                    comic.synopsis.as_deref().unwrap_or("No synopsis available.")
                )?;
                match &detail.primary {
                    PrimaryAction::Resume(slug) => writeln!(f, "> Continue reading: {}", slug)?,
                    PrimaryAction::Start(slug) => writeln!(f, "> Start reading: {}", slug)?,
                    PrimaryAction::Unavailable => writeln!(f, "> No chapters yet")?,
                }
                if detail.bookmarked {
                    writeln!(f, "Bookmarked")?;
                }
                writeln!(f, "Chapters ({})", comic.chapters.len())?;
                for chapter in &comic.chapters {
                    let marker = if detail.last_read.as_deref() == Some(chapter.slug.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    writeln!(f, " {} {} ({})", marker, chapter.title, chapter.slug)?;
                }
                Ok(())
            }
            View::Reader(reader) => {
                writeln!(f, "{}", reader.header())?;
                for (i, image) in reader.images.iter().enumerate() {
                    writeln!(f, "  {:>03} {}", i + 1, image)?;
                }
                writeln!(
                    f,
                    "prev: {} | next: {} | {} chapters",
                    reader.prev.as_deref().unwrap_or("-"),
                    reader.next.as_deref().unwrap_or("-"),
                    reader.chapters.len()
                )
            }
            View::History(entries) => {
                writeln!(f, "Reading history")?;
                for entry in entries {
                    writeln!(
                        f,
                        "  {} ({}) - {}",
                        entry.title, entry.slug, entry.last_chapter_title
                    )?;
                }
                Ok(())
            }
            View::Bookmarks(entries) => {
                writeln!(f, "Bookmarks")?;
                for entry in entries {
                    writeln!(f, "  {} ({})", entry.title, entry.slug)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_header_joins_title_and_label() {
        let reader = ReaderView {
            chapter_slug: "op-5".into(),
            comic_slug: Some("one-piece".into()),
            comic_title: "One Piece".into(),
            chapter_label: "Chapter 5".into(),
            images: vec!["1.jpg".into()],
            prev: Some("op-4".into()),
            next: None,
            chapters: Vec::new(),
        };
        assert_eq!(reader.header(), "One Piece - Chapter 5");
        let text = View::Reader(reader).to_string();
        assert!(text.starts_with("One Piece - Chapter 5\n"));
        assert!(text.contains("  001 1.jpg"));
        assert!(text.contains("prev: op-4 | next: -"));
    }

    #[test]
    fn empty_listing_says_so() {
        let view = View::Listing(ListingView {
            heading: "Search results".into(),
            query: ListingQuery::Search {
                query: "zzz".into(),
                page: 1,
            },
            items: Vec::new(),
            pagination: None,
        });
        assert!(view.to_string().contains("No comics found."));
    }
}
