use serde::Deserialize;
use url::Url;

use super::{GatewayError, ListingQuery, Result};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Komikcast,
    Komikindo,
    Kiryuu,
}

/// Which end of a provider's chapter list holds the first chapter.
///
/// Providers list newest first; `OldestFirst` is only reached through
/// configuration.
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChapterOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl ProviderKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Komikcast => "https://www.sankavollerei.com/comic/komikcast",
            ProviderKind::Komikindo => "https://www.sankavollerei.com/comic/komikindo",
            ProviderKind::Kiryuu => "https://www.sankavollerei.com/comic/kiryuu",
        }
    }
}

pub enum Endpoint<'a> {
    Home,
    Listing(&'a ListingQuery),
    Detail(&'a str),
    Chapter(&'a str),
    Genres,
}

#[derive(Debug, Clone)]
pub struct Provider {
    pub kind: ProviderKind,
    base_url: Url,
    proxy: Option<Url>,
    chapter_order: ChapterOrder,
}

impl Provider {
    pub fn new(kind: ProviderKind, base_url: Option<&str>, proxy: Option<&str>) -> Result<Self> {
        let base_url = Url::parse(base_url.unwrap_or(kind.default_base_url()))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        let proxy = proxy.map(Url::parse).transpose()?;
        Ok(Self {
            kind,
            base_url,
            proxy,
            chapter_order: ChapterOrder::default(),
        })
    }

    pub fn with_chapter_order(mut self, order: ChapterOrder) -> Self {
        self.chapter_order = order;
        self
    }

    pub fn chapter_order(&self) -> ChapterOrder {
        self.chapter_order
    }

    /// Full request URL, routed through the proxy when one is configured.
    pub fn url(&self, endpoint: Endpoint<'_>) -> Result<Url> {
        let target = self.target(endpoint)?;
        Ok(match &self.proxy {
            Some(proxy) => {
                let mut url = proxy.clone();
                url.query_pairs_mut().append_pair("url", target.as_str());
                url
            }
            None => target,
        })
    }

    fn target(&self, endpoint: Endpoint<'_>) -> Result<Url> {
        let page_str;
        let segments: Vec<&str> = match &endpoint {
            Endpoint::Home => vec!["home"],
            Endpoint::Genres => vec!["genres"],
            Endpoint::Detail(slug) => vec!["detail", *slug],
            Endpoint::Chapter(slug) => vec!["chapter", *slug],
            Endpoint::Listing(ListingQuery::Genre { slug, page }) => {
                page_str = page.to_string();
                vec!["genre", slug.as_str(), page_str.as_str()]
            }
            Endpoint::Listing(ListingQuery::Search { query, page }) => {
                page_str = page.to_string();
                vec!["search", query.as_str(), page_str.as_str()]
            }
            Endpoint::Listing(_) => vec!["list"],
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);

        match endpoint {
            Endpoint::Listing(ListingQuery::Status { status, page }) => {
                url.query_pairs_mut()
                    .append_pair("status", status.as_str())
                    .append_pair("orderby", "popular")
                    .append_pair("page", &page.to_string());
            }
            Endpoint::Listing(ListingQuery::Filter { kind, status, page }) => {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("page", &page.to_string());
                if let Some(kind) = kind {
                    pairs.append_pair("type", kind);
                }
                if let Some(status) = status {
                    pairs.append_pair("status", status);
                }
                pairs.append_pair("orderby", "popular");
            }
            _ => {}
        }
        Ok(url)
    }
}
