//! Provider JSON to the internal content model.
//!
//! Providers agree on listing and home shapes but name the chapter fields
//! differently. Each one gets a [`Shape`] listing the JSON pointers to try,
//! in order, relative to the payload's `data` object.

use serde_json::Value;

use super::{GatewayError, ProviderKind, Result};
use crate::models::{
    ChapterContent, ChapterRef, ComicCard, ComicDetail, Genre, HomeFeed, Listing, Pagination,
};

struct Shape {
    chapters: &'static [&'static str],
    parent_slug: &'static [&'static str],
    comic_title: &'static [&'static str],
    images: &'static [&'static str],
    prev: &'static [&'static str],
    next: &'static [&'static str],
}

const KOMIKCAST: Shape = Shape {
    chapters: &["/chapters"],
    parent_slug: &["/parent_slug"],
    comic_title: &["/comic_title"],
    images: &["/images"],
    prev: &["/navigation/prev"],
    next: &["/navigation/next"],
};

const KOMIKINDO: Shape = Shape {
    chapters: &["/chapter_list", "/chapters"],
    parent_slug: &["/comic_slug"],
    comic_title: &["/comic_title"],
    images: &["/images"],
    prev: &["/navigation/prev", "/prev"],
    next: &["/navigation/next", "/next"],
};

const KIRYUU: Shape = Shape {
    chapters: &["/chapters"],
    parent_slug: &["/relation/slug"],
    comic_title: &["/parent_title", "/relation/title"],
    images: &["/images", "/pages"],
    prev: &["/navigation/prev"],
    next: &["/navigation/next"],
};

fn shape(kind: ProviderKind) -> &'static Shape {
    match kind {
        ProviderKind::Komikcast => &KOMIKCAST,
        ProviderKind::Komikindo => &KOMIKINDO,
        ProviderKind::Kiryuu => &KIRYUU,
    }
}

/// Strips the `{success, result: {content}}` envelope.
///
/// The payload is `result.content` when present, else `result`, else the
/// body itself.
pub fn unwrap_envelope(body: Value) -> Result<Value> {
    if body.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(GatewayError::Unsuccessful);
    }
    let Value::Object(mut body) = body else {
        return Err(GatewayError::Missing("body"));
    };
    match body.remove("result") {
        Some(Value::Object(mut result)) => match result.remove("content") {
            Some(content) if !content.is_null() => Ok(content),
            _ => Ok(Value::Object(result)),
        },
        Some(other) if !other.is_null() => Ok(other),
        _ => Ok(Value::Object(body)),
    }
}

fn data(payload: &Value) -> Result<&Value> {
    match payload.get("data") {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(GatewayError::Missing("data")),
    }
}

/// First non-empty string (or number) found at any of `pointers`.
fn text(value: &Value, pointers: &[&str]) -> Option<String> {
    pointers.iter().find_map(|p| match value.pointer(p) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn array<'a>(value: &'a Value, pointers: &[&str]) -> &'a [Value] {
    pointers
        .iter()
        .find_map(|p| value.pointer(p).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn card(item: &Value) -> Option<ComicCard> {
    Some(ComicCard {
        slug: text(item, &["/slug"])?,
        title: text(item, &["/title"]).unwrap_or_default(),
        image: text(item, &["/image"]).unwrap_or_default(),
        kind: text(item, &["/type"]),
        latest_chapter: text(item, &["/latestChapter", "/chapter", "/chapters/0/title"]),
    })
}

fn cards(items: &[Value]) -> Vec<ComicCard> {
    items.iter().filter_map(card).collect()
}

fn chapter_refs(items: &[Value]) -> Vec<ChapterRef> {
    items
        .iter()
        .filter_map(|c| {
            let slug = text(c, &["/slug"])?;
            let title = text(c, &["/title"]).unwrap_or_else(|| slug.clone());
            Some(ChapterRef { slug, title })
        })
        .collect()
}

pub fn home(payload: &Value) -> Result<HomeFeed> {
    let data = data(payload)?;
    Ok(HomeFeed {
        hot: cards(array(data, &["/hotUpdates"])),
        latest: cards(array(data, &["/latestReleases"])),
        projects: cards(array(data, &["/projectUpdates"])),
    })
}

/// Listings tolerate a missing `data` field and come back empty.
pub fn listing(payload: &Value) -> Listing {
    let items = payload
        .get("data")
        .and_then(Value::as_array)
        .map(|items| cards(items))
        .unwrap_or_default();
    let pagination = payload.get("pagination").and_then(|p| {
        Some(Pagination {
            current_page: u32::try_from(p.get("currentPage")?.as_u64()?).ok()?,
            has_next_page: p.get("hasNextPage").and_then(Value::as_bool).unwrap_or(false),
        })
    });
    Listing { items, pagination }
}

pub fn detail(kind: ProviderKind, slug: &str, payload: &Value) -> Result<ComicDetail> {
    let data = data(payload)?;
    let genres = array(data, &["/genres"])
        .iter()
        .filter_map(|g| {
            Some(Genre {
                slug: text(g, &["/slug"])?,
                title: text(g, &["/title"]).unwrap_or_default(),
            })
        })
        .collect();

    Ok(ComicDetail {
        slug: slug.to_string(),
        title: text(data, &["/title"]).unwrap_or_default(),
        image: text(data, &["/image"]).unwrap_or_default(),
        synopsis: text(data, &["/synopsis"]),
        rating: text(data, &["/rating"]),
        status: text(data, &["/status"]),
        kind: text(data, &["/type"]),
        genres,
        chapters: chapter_refs(array(data, shape(kind).chapters)),
    })
}

pub fn chapter(kind: ProviderKind, slug: &str, payload: &Value) -> Result<ChapterContent> {
    let data = data(payload)?;
    let shape = shape(kind);
    let images = array(data, shape.images)
        .iter()
        .filter_map(|i| i.as_str().map(str::to_string))
        .collect();

    Ok(ChapterContent {
        slug: slug.to_string(),
        title: text(data, &["/title"]),
        comic_slug: text(data, shape.parent_slug),
        comic_title: text(data, shape.comic_title),
        images,
        prev: text(data, shape.prev),
        next: text(data, shape.next),
    })
}

pub fn genres(payload: &Value) -> Result<Vec<Genre>> {
    let mut genres: Vec<Genre> = array(data(payload)?, &[""])
        .iter()
        .filter_map(|g| {
            Some(Genre {
                slug: text(g, &["/slug"])?,
                title: text(g, &["/title"]).unwrap_or_default(),
            })
        })
        .collect();
    genres.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(genres)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_prefers_result_content() {
        let body = json!({"success": true, "result": {"content": {"data": [1]}, "other": 2}});
        assert_eq!(unwrap_envelope(body).unwrap(), json!({"data": [1]}));

        let body = json!({"success": true, "result": {"data": [1]}});
        assert_eq!(unwrap_envelope(body).unwrap(), json!({"data": [1]}));

        let body = json!({"success": true, "data": [1]});
        assert_eq!(
            unwrap_envelope(body).unwrap(),
            json!({"success": true, "data": [1]})
        );
    }

    #[test]
    fn envelope_requires_success() {
        assert!(matches!(
            unwrap_envelope(json!({"success": false, "data": []})),
            Err(GatewayError::Unsuccessful)
        ));
        assert!(matches!(
            unwrap_envelope(json!({"data": []})),
            Err(GatewayError::Unsuccessful)
        ));
    }

    #[test]
    fn listing_reads_cards_and_pagination() {
        let payload = json!({
            "data": [
                {"slug": "a", "title": "A", "image": "a.jpg", "type": "Manga", "latestChapter": "Ch 5"},
                {"slug": "b", "title": "B", "image": "b.jpg", "chapter": "Ch 1"},
                {"title": "no slug"}
            ],
            "pagination": {"currentPage": 2, "hasNextPage": true}
        });
        let listing = listing(&payload);
        assert_eq!(listing.items.len(), 2);
        assert_eq!(listing.items[0].latest_chapter.as_deref(), Some("Ch 5"));
        assert_eq!(listing.items[1].latest_chapter.as_deref(), Some("Ch 1"));
        assert_eq!(
            listing.pagination,
            Some(Pagination {
                current_page: 2,
                has_next_page: true
            })
        );
    }

    #[test]
    fn out_of_range_page_drops_pagination() {
        let payload = json!({
            "data": [],
            "pagination": {"currentPage": 4294967297u64, "hasNextPage": true}
        });
        assert_eq!(listing(&payload).pagination, None);

        let payload = json!({"data": [], "pagination": {"currentPage": -1}});
        assert_eq!(listing(&payload).pagination, None);
    }

    #[test]
    fn home_reads_three_sections() {
        let payload = json!({"data": {
            "hotUpdates": [{"slug": "h", "title": "H"}],
            "latestReleases": [{"slug": "l", "title": "L", "chapters": [{"title": "Ch 9"}]}],
            "projectUpdates": []
        }});
        let feed = home(&payload).unwrap();
        assert_eq!(feed.hot[0].slug, "h");
        assert_eq!(feed.latest[0].latest_chapter.as_deref(), Some("Ch 9"));
        assert!(feed.projects.is_empty());
        assert!(matches!(home(&json!({})), Err(GatewayError::Missing("data"))));
    }

    #[test]
    fn detail_uses_provider_chapter_field() {
        let payload = json!({"data": {
            "title": "One Piece",
            "image": "op.jpg",
            "rating": 9.1,
            "genres": [{"slug": "action", "title": "Action"}],
            "chapter_list": [{"slug": "op-2", "title": "Chapter 2"}, {"slug": "op-1"}]
        }});
        let d = detail(ProviderKind::Komikindo, "one-piece", &payload).unwrap();
        assert_eq!(d.title, "One Piece");
        assert_eq!(d.rating.as_deref(), Some("9.1"));
        assert_eq!(d.chapters.len(), 2);
        assert_eq!(d.chapters[1].title, "op-1");

        let d = detail(ProviderKind::Komikcast, "one-piece", &payload).unwrap();
        assert!(d.chapters.is_empty());
    }

    #[test]
    fn chapter_parent_slug_per_provider() {
        let komikcast = json!({"data": {
            "title": "Chapter 5", "parent_slug": "one-piece", "comic_title": "One Piece",
            "images": ["1.jpg", "2.jpg"], "navigation": {"prev": "ch-4", "next": null}
        }});
        let c = chapter(ProviderKind::Komikcast, "ch-5", &komikcast).unwrap();
        assert_eq!(c.comic_slug.as_deref(), Some("one-piece"));
        assert_eq!(c.comic_title.as_deref(), Some("One Piece"));
        assert_eq!(c.images.len(), 2);
        assert_eq!(c.prev.as_deref(), Some("ch-4"));
        assert_eq!(c.next, None);

        let komikindo = json!({"data": {"comic_slug": "naruto", "images": []}});
        let c = chapter(ProviderKind::Komikindo, "n-1", &komikindo).unwrap();
        assert_eq!(c.comic_slug.as_deref(), Some("naruto"));

        let kiryuu = json!({"data": {
            "relation": {"slug": "bleach", "title": "Bleach"}, "pages": ["p.jpg"]
        }});
        let c = chapter(ProviderKind::Kiryuu, "b-1", &kiryuu).unwrap();
        assert_eq!(c.comic_slug.as_deref(), Some("bleach"));
        assert_eq!(c.comic_title.as_deref(), Some("Bleach"));
        assert_eq!(c.images, vec!["p.jpg".to_string()]);
    }

    #[test]
    fn genres_sorted_by_title() {
        let payload = json!({"data": [
            {"slug": "romance", "title": "Romance"},
            {"slug": "action", "title": "Action"}
        ]});
        let g = genres(&payload).unwrap();
        assert_eq!(g[0].slug, "action");
        assert_eq!(g[1].slug, "romance");
    }
}
