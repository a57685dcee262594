use log::{debug, info, warn};
use std::cell::{Cell, Ref, RefCell};

use super::route::{looks_like_token, Location, Route};
use super::session::{adjacent, chapter_label, first_chapter, Session};
use super::view::{DetailView, ListingView, PrimaryAction, ReaderView, View};
use crate::gateway::{ComicStatus, ContentGateway, ListingQuery};
use crate::mapping::IdMapper;
use crate::models::{ChapterContent, ChapterRef, EntityKind, Genre};
use crate::storage::{BookmarkEntry, HistoryUpdate, KeyValueStore, LocalState};

const DEFAULT_COMIC_TITLE: &str = "Comic";

/// How a navigation request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rendered,
    NotFound,
    /// A chapter or detail load was already in flight; nothing happened.
    Busy,
    /// A newer navigation started before this one finished.
    Superseded,
    /// Nothing to do, e.g. "next" on the last chapter.
    Ignored,
}

/// Search and filter form input. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterForm {
    pub query: String,
    pub genre: String,
    pub kind: String,
    pub status: String,
}

/// Generation captured when a navigation starts.
struct Ticket(u64);

/// Navigation lock, released on drop.
///
/// Chapter loads only start when nothing holds it; detail loads always hold
/// it so chapter requests made meanwhile are rejected.
struct NavLock<'a> {
    holders: &'a Cell<u32>,
}

impl<'a> NavLock<'a> {
    fn acquire(holders: &'a Cell<u32>) -> Option<Self> {
        if holders.get() > 0 {
            return None;
        }
        Some(Self::hold(holders))
    }

    fn hold(holders: &'a Cell<u32>) -> Self {
        holders.set(holders.get() + 1);
        Self { holders }
    }
}

impl Drop for NavLock<'_> {
    fn drop(&mut self) {
        self.holders.set(self.holders.get().saturating_sub(1));
    }
}

/// Turns URLs and clicks into views.
///
/// Runs on a single thread: methods take `&self` so a new navigation can
/// start while an earlier one is still awaiting the network. No `RefCell`
/// borrow is held across an `.await`.
pub struct Controller<M, G, S> {
    mapper: M,
    gateway: G,
    local: LocalState<S>,
    session: RefCell<Session>,
    location: RefCell<Location>,
    screen: RefCell<View>,
    generation: Cell<u64>,
    navigating: Cell<u32>,
}

impl<M, G, S> Controller<M, G, S>
where
    M: IdMapper,
    G: ContentGateway,
    S: KeyValueStore,
{
    pub fn new(mapper: M, gateway: G, local: LocalState<S>) -> Self {
        Self {
            mapper,
            gateway,
            local,
            session: RefCell::new(Session::default()),
            location: RefCell::new(Location::new("/")),
            screen: RefCell::new(View::Loading),
            generation: Cell::new(0),
            navigating: Cell::new(0),
        }
    }

    pub fn with_session(self, session: Session) -> Self {
        self.session.replace(session);
        self
    }

    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn into_session(self) -> Session {
        self.session.into_inner()
    }

    pub fn view(&self) -> Ref<'_, View> {
        self.screen.borrow()
    }

    pub fn location(&self) -> Ref<'_, Location> {
        self.location.borrow()
    }

    pub fn local(&self) -> &LocalState<S> {
        &self.local
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn is_navigating(&self) -> bool {
        self.navigating.get() > 0
    }

    fn begin(&self) -> Ticket {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.screen.replace(View::Loading);
        Ticket(generation)
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        self.generation.get() == ticket.0
    }

    fn finish(&self, ticket: &Ticket, view: View) -> Outcome {
        if !self.is_current(ticket) {
            debug!("Dropping stale render from generation {}", ticket.0);
            return Outcome::Superseded;
        }
        let outcome = match view {
            View::NotFound => Outcome::NotFound,
            _ => Outcome::Rendered,
        };
        self.screen.replace(view);
        outcome
    }

    fn push_url(&self, path: &str) {
        if self.location.borrow_mut().push(path) {
            debug!("Pushed {}", path);
        }
    }

    /// Slug behind `id`, or `id` itself when it is not a known token.
    async fn resolve_slug(&self, id: &str) -> String {
        if !looks_like_token(id) {
            return id.to_string();
        }
        match self.mapper.resolve(id).await {
            Ok(Some(record)) => record.slug,
            Ok(None) => {
                debug!("Token {} is not mapped, using it as a slug", id);
                id.to_string()
            }
            Err(e) => {
                warn!("Unable to resolve {}: {}, using it as a slug", id, e);
                id.to_string()
            }
        }
    }

    /// URL token for `slug`, or the slug itself when the mapper is unreachable.
    async fn token_for(&self, slug: &str, kind: EntityKind) -> String {
        match self.mapper.get_or_create_id(slug, kind).await {
            Ok(uuid) => uuid,
            Err(e) => {
                warn!("Unable to map {} ({}): {}, using raw slug", slug, kind, e);
                slug.to_string()
            }
        }
    }

    /// Initial page load.
    pub async fn initial_load(&self, path: &str) -> Outcome {
        info!("Loading {}", path);
        self.location.borrow_mut().replace(path);
        self.route(Route::parse(path)).await
    }

    /// Browser back/forward landed on `path`.
    pub async fn pop_state(&self, path: &str) -> Outcome {
        debug!("History navigation to {}", path);
        self.location.borrow_mut().replace(path);
        self.route(Route::parse(path)).await
    }

    async fn route(&self, route: Route) -> Outcome {
        match route {
            Route::Home => self.show_home(false).await,
            Route::Ongoing => self.show_ongoing(1).await,
            Route::Completed => self.show_completed(1).await,
            Route::History => self.show_history(false),
            Route::Bookmarks => self.show_bookmarks(false),
            Route::Series(id) => self.show_detail(&id, false).await,
            Route::Chapter(id) => self.read_chapter(&id, None, false).await,
        }
    }

    pub async fn show_home(&self, push: bool) -> Outcome {
        let ticket = self.begin();
        if push {
            self.push_url(&Route::Home.path());
        }
        let view = match self.gateway.home().await {
            Ok(feed) if !feed.is_empty() => View::Home(feed),
            Ok(_) => View::NotFound,
            Err(e) => {
                warn!("Unable to load home: {}", e);
                View::NotFound
            }
        };
        self.finish(&ticket, view)
    }

    pub async fn show_ongoing(&self, page: u32) -> Outcome {
        self.show_listing(ListingQuery::Status {
            status: ComicStatus::Ongoing,
            page,
        })
        .await
    }

    pub async fn show_completed(&self, page: u32) -> Outcome {
        self.show_listing(ListingQuery::Status {
            status: ComicStatus::Completed,
            page,
        })
        .await
    }

    pub async fn show_genre(&self, slug: &str, page: u32) -> Outcome {
        self.show_listing(ListingQuery::Genre {
            slug: slug.to_string(),
            page,
        })
        .await
    }

    pub async fn apply_filter(&self, form: &FilterForm) -> Outcome {
        let set = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        if let Some(query) = set(&form.query) {
            return self.show_listing(ListingQuery::Search { query, page: 1 }).await;
        }
        if let Some(genre) = set(&form.genre) {
            return self.show_genre(&genre, 1).await;
        }
        self.show_listing(ListingQuery::Filter {
            kind: set(&form.kind),
            status: set(&form.status),
            page: 1,
        })
        .await
    }

    /// Status listings own a URL; genre, search and filter results do not.
    pub async fn show_listing(&self, query: ListingQuery) -> Outcome {
        let ticket = self.begin();
        let heading = match &query {
            ListingQuery::Status {
                status: ComicStatus::Ongoing,
                ..
            } => {
                self.push_url(&Route::Ongoing.path());
                "Popular ongoing comics".to_string()
            }
            ListingQuery::Status {
                status: ComicStatus::Completed,
                ..
            } => {
                self.push_url(&Route::Completed.path());
                "Completed comics".to_string()
            }
            ListingQuery::Genre { slug, .. } => format!("Genre: {}", slug.to_uppercase()),
            ListingQuery::Search { query, .. } => format!("Search results: \"{}\"", query),
            ListingQuery::Filter { .. } => "Filter results".to_string(),
        };

        let view = match self.gateway.listing(&query).await {
            Ok(listing)
                if listing.items.is_empty() && matches!(query, ListingQuery::Genre { .. }) =>
            {
                View::NotFound
            }
            Ok(listing) => View::Listing(ListingView {
                heading,
                query,
                items: listing.items,
                pagination: listing.pagination,
            }),
            Err(e) => {
                warn!("Unable to load listing {:?}: {}", query, e);
                View::NotFound
            }
        };
        self.finish(&ticket, view)
    }

    pub async fn next_page(&self) -> Outcome {
        let target = match &*self.screen.borrow() {
            View::Listing(ListingView {
                query,
                pagination: Some(p),
                ..
            }) if p.has_next_page => Some(query.with_page(p.current_page + 1)),
            _ => None,
        };
        match target {
            Some(query) => self.show_listing(query).await,
            None => Outcome::Ignored,
        }
    }

    pub async fn prev_page(&self) -> Outcome {
        let target = match &*self.screen.borrow() {
            View::Listing(ListingView {
                query,
                pagination: Some(p),
                ..
            }) if p.current_page > 1 => Some(query.with_page(p.current_page - 1)),
            _ => None,
        };
        match target {
            Some(query) => self.show_listing(query).await,
            None => Outcome::Ignored,
        }
    }

    /// Jumps the current listing to `page`.
    pub async fn goto_page(&self, page: u32) -> Outcome {
        let target = match &*self.screen.borrow() {
            View::Listing(ListingView { query, .. }) if page >= 1 && query.page() != page => {
                Some(query.with_page(page))
            }
            _ => None,
        };
        match target {
            Some(query) => self.show_listing(query).await,
            None => Outcome::Ignored,
        }
    }

    /// Genre list for the filter form; empty when the provider fails.
    pub async fn genres(&self) -> Vec<Genre> {
        self.gateway.genres().await.unwrap_or_else(|e| {
            warn!("Unable to load genres: {}", e);
            Vec::new()
        })
    }

    pub async fn show_detail(&self, id_or_slug: &str, push: bool) -> Outcome {
        let _lock = NavLock::hold(&self.navigating);
        let ticket = self.begin();
        let slug = self.resolve_slug(id_or_slug).await;
        if push {
            let token = self.token_for(&slug, EntityKind::Series).await;
            if !self.is_current(&ticket) {
                return Outcome::Superseded;
            }
            self.push_url(&Route::Series(token).path());
        }

        let detail = match self.gateway.detail(&slug).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!("Unable to load comic {}: {}", slug, e);
                return self.finish(&ticket, View::NotFound);
            }
        };
        if !self.is_current(&ticket) {
            return Outcome::Superseded;
        }

        self.session.borrow_mut().set_comic(&slug, &detail);

        let last_read = self
            .local
            .last_read(&slug)
            .and_then(|h| h.last_chapter_slug);
        let first = first_chapter(&detail.chapters, self.gateway.chapter_order());
        let primary = match (&last_read, first) {
            (Some(chapter), _) => PrimaryAction::Resume(chapter.clone()),
            (None, Some(first)) => PrimaryAction::Start(first.slug.clone()),
            (None, None) => PrimaryAction::Unavailable,
        };
        let bookmarked = self.local.is_bookmarked(&slug);
        self.local.save_history(HistoryUpdate::comic(
            &slug,
            Some(&detail.title),
            Some(&detail.image),
        ));

        self.finish(
            &ticket,
            View::Detail(DetailView {
                comic: detail,
                primary,
                last_read,
                bookmarked,
            }),
        )
    }

    /// Opens a chapter. A no-op returning [`Outcome::Busy`] while another
    /// chapter or detail load is in flight.
    ///
    /// When the comic's chapter list is not cached yet it is fetched after the
    /// reader renders and the lock is released.
    pub async fn read_chapter(
        &self,
        id_or_slug: &str,
        comic_slug: Option<&str>,
        push: bool,
    ) -> Outcome {
        let Some(lock) = NavLock::acquire(&self.navigating) else {
            debug!("Chapter load in flight, ignoring {}", id_or_slug);
            return Outcome::Busy;
        };
        let ticket = self.begin();
        let (outcome, backfill) = self.load_chapter(&ticket, id_or_slug, comic_slug, push).await;
        drop(lock);

        if let Some((comic, chapter)) = backfill {
            self.backfill_chapters(&ticket, &comic, &chapter).await;
        }
        outcome
    }

    async fn load_chapter(
        &self,
        ticket: &Ticket,
        id_or_slug: &str,
        comic_slug: Option<&str>,
        push: bool,
    ) -> (Outcome, Option<(String, String)>) {
        let chapter_slug = self.resolve_slug(id_or_slug).await;
        if push {
            let token = self.token_for(&chapter_slug, EntityKind::Chapter).await;
            if !self.is_current(ticket) {
                return (Outcome::Superseded, None);
            }
            self.push_url(&Route::Chapter(token).path());
        }

        let content = match self.gateway.chapter(&chapter_slug).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Unable to load chapter {}: {}", chapter_slug, e);
                return (self.finish(ticket, View::NotFound), None);
            }
        };
        if !self.is_current(ticket) {
            return (Outcome::Superseded, None);
        }

        let comic_slug = comic_slug
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| content.comic_slug.clone());
        let (context, chapters) = {
            let session = self.session.borrow();
            match comic_slug.as_deref() {
                Some(comic) => (
                    session.context_for(comic).cloned(),
                    session.chapters_for(comic).to_vec(),
                ),
                None => (None, Vec::new()),
            }
        };

        let label = chapter_label(content.title.as_deref().unwrap_or(&chapter_slug));
        let comic_title = context
            .as_ref()
            .and_then(|c| c.title.clone())
            .or_else(|| content.comic_title.clone());
        let (prev, next) = self.neighbours(&chapters, &content);

        if let Some(comic) = &comic_slug {
            let image = context.as_ref().and_then(|c| c.image.as_deref());
            self.local.save_history(
                HistoryUpdate::comic(comic, comic_title.as_deref(), image)
                    .chapter(&chapter_slug, Some(&label)),
            );
        }

        let backfill = match &comic_slug {
            Some(comic) if chapters.is_empty() => Some((comic.clone(), chapter_slug.clone())),
            _ => None,
        };

        let view = View::Reader(ReaderView {
            chapter_slug,
            comic_slug,
            comic_title: comic_title.unwrap_or_else(|| DEFAULT_COMIC_TITLE.to_string()),
            chapter_label: label,
            images: content.images,
            prev,
            next,
            chapters,
        });
        (self.finish(ticket, view), backfill)
    }

    /// Prev/next from the cached list when it contains the chapter, else from
    /// the provider's own navigation fields.
    fn neighbours(
        &self,
        chapters: &[ChapterRef],
        content: &ChapterContent,
    ) -> (Option<String>, Option<String>) {
        adjacent(chapters, &content.slug, self.gateway.chapter_order())
            .unwrap_or_else(|| (content.prev.clone(), content.next.clone()))
    }

    async fn backfill_chapters(&self, ticket: &Ticket, comic_slug: &str, chapter_slug: &str) {
        debug!("Backfilling chapter list for {}", comic_slug);
        let detail = match self.gateway.detail(comic_slug).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!("Unable to backfill chapters for {}: {}", comic_slug, e);
                return;
            }
        };
        if !self.is_current(ticket) {
            debug!("Reader moved on, dropping chapter list for {}", comic_slug);
            return;
        }

        self.session.borrow_mut().set_comic(comic_slug, &detail);
        self.local.save_history(
            HistoryUpdate::comic(comic_slug, Some(&detail.title), Some(&detail.image))
                .chapter(chapter_slug, None),
        );

        let order = self.gateway.chapter_order();
        if let View::Reader(reader) = &mut *self.screen.borrow_mut() {
            if reader.chapter_slug != chapter_slug {
                return;
            }
            if let Some((prev, next)) = adjacent(&detail.chapters, chapter_slug, order) {
                reader.prev = prev;
                reader.next = next;
            }
            if !detail.title.is_empty() {
                reader.comic_title = detail.title.clone();
            }
            reader.chapters = detail.chapters;
        }
    }

    fn reader_target(
        &self,
        pick: impl Fn(&ReaderView) -> Option<String>,
    ) -> Option<(String, Option<String>)> {
        match &*self.screen.borrow() {
            View::Reader(reader) => pick(reader).map(|slug| (slug, reader.comic_slug.clone())),
            _ => None,
        }
    }

    async fn read_from_reader(&self, pick: impl Fn(&ReaderView) -> Option<String>) -> Outcome {
        if self.is_navigating() {
            return Outcome::Busy;
        }
        match self.reader_target(pick) {
            Some((slug, comic)) => self.read_chapter(&slug, comic.as_deref(), true).await,
            None => Outcome::Ignored,
        }
    }

    pub async fn next_chapter(&self) -> Outcome {
        self.read_from_reader(|r| r.next.clone()).await
    }

    pub async fn prev_chapter(&self) -> Outcome {
        self.read_from_reader(|r| r.prev.clone()).await
    }

    /// Chapter switcher selection.
    pub async fn select_chapter(&self, chapter_slug: &str) -> Outcome {
        self.read_from_reader(|_| Some(chapter_slug.to_string())).await
    }

    /// Resume or start reading from the detail view's primary action.
    pub async fn start_reading(&self) -> Outcome {
        let target = match &*self.screen.borrow() {
            View::Detail(DetailView {
                primary: PrimaryAction::Resume(slug) | PrimaryAction::Start(slug),
                comic,
                ..
            }) => Some((slug.clone(), comic.slug.clone())),
            _ => None,
        };
        match target {
            Some((chapter, comic)) => self.read_chapter(&chapter, Some(&comic), true).await,
            None => Outcome::Ignored,
        }
    }

    pub fn show_history(&self, push: bool) -> Outcome {
        let ticket = self.begin();
        if push {
            self.push_url(&Route::History.path());
        }
        self.finish(&ticket, View::History(self.local.history()))
    }

    pub fn show_bookmarks(&self, push: bool) -> Outcome {
        let ticket = self.begin();
        if push {
            self.push_url(&Route::Bookmarks.path());
        }
        self.finish(&ticket, View::Bookmarks(self.local.bookmarks()))
    }

    /// Returns whether the comic is bookmarked afterwards.
    pub fn toggle_bookmark(&self, slug: &str, title: &str, image: &str) -> bool {
        let bookmarked = self.local.toggle_bookmark(BookmarkEntry {
            slug: slug.to_string(),
            title: title.to_string(),
            image: image.to_string(),
        });
        if let View::Detail(detail) = &mut *self.screen.borrow_mut() {
            if detail.comic.slug == slug {
                detail.bookmarked = bookmarked;
            }
        }
        info!(
            "{} {}",
            if bookmarked { "Bookmarked" } else { "Removed bookmark" },
            slug
        );
        bookmarked
    }
}
