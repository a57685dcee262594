//! Upstream comic content, one provider at a time.

pub mod normalize;
mod provider;

use async_trait::async_trait;
use log::debug;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde_json::Value;
use thiserror::Error;

use crate::models::{ChapterContent, ComicDetail, Genre, HomeFeed, Listing};

pub use provider::{ChapterOrder, Endpoint, Provider, ProviderKind};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider reported failure")]
    Unsuccessful,

    #[error("Response missing {0}")]
    Missing(&'static str),

    #[error("Invalid url: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComicStatus {
    Ongoing,
    Completed,
}

impl ComicStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComicStatus::Ongoing => "Ongoing",
            ComicStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingQuery {
    Status { status: ComicStatus, page: u32 },
    Genre { slug: String, page: u32 },
    Search { query: String, page: u32 },
    Filter {
        kind: Option<String>,
        status: Option<String>,
        page: u32,
    },
}

impl ListingQuery {
    pub fn page(&self) -> u32 {
        match self {
            ListingQuery::Status { page, .. }
            | ListingQuery::Genre { page, .. }
            | ListingQuery::Search { page, .. }
            | ListingQuery::Filter { page, .. } => *page,
        }
    }

    pub fn with_page(&self, page: u32) -> Self {
        let mut query = self.clone();
        match &mut query {
            ListingQuery::Status { page: p, .. }
            | ListingQuery::Genre { page: p, .. }
            | ListingQuery::Search { page: p, .. }
            | ListingQuery::Filter { page: p, .. } => *p = page,
        }
        query
    }
}

#[async_trait(?Send)]
pub trait ContentGateway {
    async fn home(&self) -> Result<HomeFeed>;
    async fn listing(&self, query: &ListingQuery) -> Result<Listing>;
    async fn detail(&self, slug: &str) -> Result<ComicDetail>;
    async fn chapter(&self, slug: &str) -> Result<ChapterContent>;
    async fn genres(&self) -> Result<Vec<Genre>>;

    fn chapter_order(&self) -> ChapterOrder;
}

/// Outbound HTTP client shared by every remote call the reader makes.
pub fn retrying_client() -> ClientWithMiddleware {
    // Retry up to 3 times with increasing intervals between attempts.
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
    ClientBuilder::new(reqwest::Client::new())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

/// HTTP gateway for one configured provider.
pub struct GatewayClient {
    provider: Provider,
    http: ClientWithMiddleware,
}

impl GatewayClient {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            http: retrying_client(),
        }
    }

    async fn fetch(&self, endpoint: Endpoint<'_>) -> Result<Value> {
        let url = self.provider.url(endpoint)?;
        debug!("Fetching {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        normalize::unwrap_envelope(body)
    }
}

#[async_trait(?Send)]
impl ContentGateway for GatewayClient {
    async fn home(&self) -> Result<HomeFeed> {
        normalize::home(&self.fetch(Endpoint::Home).await?)
    }

    async fn listing(&self, query: &ListingQuery) -> Result<Listing> {
        Ok(normalize::listing(&self.fetch(Endpoint::Listing(query)).await?))
    }

    async fn detail(&self, slug: &str) -> Result<ComicDetail> {
        let payload = self.fetch(Endpoint::Detail(slug)).await?;
        normalize::detail(self.provider.kind, slug, &payload)
    }

    async fn chapter(&self, slug: &str) -> Result<ChapterContent> {
        let payload = self.fetch(Endpoint::Chapter(slug)).await?;
        normalize::chapter(self.provider.kind, slug, &payload)
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        normalize::genres(&self.fetch(Endpoint::Genres).await?)
    }

    fn chapter_order(&self) -> ChapterOrder {
        self.provider.chapter_order()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_page_keeps_query() {
        let q = ListingQuery::Genre {
            slug: "action".into(),
            page: 1,
        };
        let next = q.with_page(2);
        assert_eq!(next.page(), 2);
        assert_eq!(
            next,
            ListingQuery::Genre {
                slug: "action".into(),
                page: 2
            }
        );
    }

    #[tokio::test]
    async fn unreachable_provider_is_request_error() {
        let provider = Provider::new(ProviderKind::Komikcast, Some("http://127.0.0.1:9/api"), None)
            .unwrap();
        let gateway = GatewayClient {
            provider,
            http: ClientBuilder::new(reqwest::Client::new()).build(),
        };
        assert!(matches!(
            gateway.detail("one-piece").await,
            Err(GatewayError::Request(_))
        ));
    }
}
