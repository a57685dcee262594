use uuid::Uuid;

/// Client-visible URL paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Ongoing,
    Completed,
    History,
    Bookmarks,
    /// `/series/<id>`, where id is an opaque token or a raw slug.
    Series(String),
    /// `/chapter/<id>`, where id is an opaque token or a raw slug.
    Chapter(String),
}

impl Route {
    /// Unknown paths and id routes with an empty id fall back to home.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();

        if let Some(rest) = path.strip_prefix("/series/") {
            return id_route(rest, Route::Series);
        }
        if let Some(rest) = path.strip_prefix("/chapter/") {
            return id_route(rest, Route::Chapter);
        }

        match path.trim_end_matches('/') {
            "/ongoing" => Route::Ongoing,
            "/completed" => Route::Completed,
            "/history" => Route::History,
            "/bookmarks" => Route::Bookmarks,
            _ => Route::Home,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Ongoing => "/ongoing".to_string(),
            Route::Completed => "/completed".to_string(),
            Route::History => "/history".to_string(),
            Route::Bookmarks => "/bookmarks".to_string(),
            Route::Series(id) => format!("/series/{}", id),
            Route::Chapter(id) => format!("/chapter/{}", id),
        }
    }
}

fn id_route(rest: &str, make: fn(String) -> Route) -> Route {
    match rest.split('/').next() {
        Some(id) if !id.is_empty() => make(id.to_string()),
        _ => Route::Home,
    }
}

/// Whether `id` has the shape of an issued opaque token rather than a slug.
pub fn looks_like_token(id: &str) -> bool {
    id.len() == 36 && Uuid::try_parse(id).is_ok()
}

/// The browser's session history, reduced to what the router touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    entries: Vec<String>,
}

impl Location {
    pub fn new(path: &str) -> Self {
        Self {
            entries: vec![path.to_string()],
        }
    }

    pub fn current(&self) -> &str {
        self.entries.last().map(String::as_str).unwrap_or("/")
    }

    /// Adds an entry unless `path` is already current. Returns whether one was added.
    pub fn push(&mut self, path: &str) -> bool {
        if self.current() == path {
            return false;
        }
        self.entries.push(path.to_string());
        true
    }

    /// Back/forward and initial load land on `path` without a new entry.
    pub fn replace(&mut self, path: &str) {
        match self.entries.last_mut() {
            Some(current) => *current = path.to_string(),
            None => self.entries.push(path.to_string()),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_static_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/ongoing"), Route::Ongoing);
        assert_eq!(Route::parse("/completed/"), Route::Completed);
        assert_eq!(Route::parse("/history?x=1"), Route::History);
        assert_eq!(Route::parse("/bookmarks#top"), Route::Bookmarks);
        assert_eq!(Route::parse("/404.html"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
    }

    #[test]
    fn parses_id_paths() {
        assert_eq!(
            Route::parse("/series/one-piece"),
            Route::Series("one-piece".into())
        );
        assert_eq!(
            Route::parse("/chapter/abc/extra"),
            Route::Chapter("abc".into())
        );
        assert_eq!(Route::parse("/series/"), Route::Home);
        assert_eq!(Route::parse("/chapter/"), Route::Home);
    }

    #[test]
    fn path_roundtrips_through_parse() {
        for route in [
            Route::Home,
            Route::Ongoing,
            Route::Completed,
            Route::History,
            Route::Bookmarks,
            Route::Series("x".into()),
            Route::Chapter("y".into()),
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn token_shape() {
        assert!(looks_like_token("0b6a4f3e-6a8c-4f1b-9d59-2f1f4b7c2a10"));
        assert!(!looks_like_token("one-piece"));
        assert!(!looks_like_token("not-a-real-uuid"));
        assert!(!looks_like_token("one-piece-chapter-1100-bahasa-indonesia"));
    }

    #[test]
    fn push_skips_current_path() {
        let mut location = Location::new("/");
        assert!(!location.push("/"));
        assert!(location.push("/ongoing"));
        assert!(!location.push("/ongoing"));
        location.replace("/history");
        assert_eq!(location.entries(), ["/".to_string(), "/history".to_string()]);
        assert_eq!(location.current(), "/history");
    }
}
