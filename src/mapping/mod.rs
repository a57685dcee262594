//! Slug to opaque-id mapping.
//!
//! [`MappingService`] owns the persistent table and is what the HTTP surface
//! serves. [`MappingClient`] talks to that surface from the reader side. Both
//! implement [`IdMapper`], the seam the router resolves ids through.

mod client;
mod store;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{EntityKind, MappingRecord};

pub use client::MappingClient;
pub use store::{DatabaseLocation, MappingStore};

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Mapping service unreachable: {0}")]
    Transport(String),
}

impl From<rusqlite::Error> for MappingError {
    fn from(e: rusqlite::Error) -> Self {
        MappingError::Persistence(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MappingError>;

#[async_trait(?Send)]
pub trait IdMapper {
    /// Stable opaque id for `(slug, kind)`.
    async fn get_or_create_id(&self, slug: &str, kind: EntityKind) -> Result<String>;

    /// Record behind `uuid`, or `None` when it was never issued.
    async fn resolve(&self, uuid: &str) -> Result<Option<MappingRecord>>;
}

#[derive(Clone)]
pub struct MappingService {
    store: MappingStore,
}

impl MappingService {
    pub fn new(location: DatabaseLocation) -> Self {
        Self {
            store: MappingStore::new(location),
        }
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    /// Validates the raw request fields, then issues or looks up the id.
    pub async fn get_or_create_id(&self, slug: &str, kind: &str) -> Result<String> {
        let kind = validate(slug, kind)?;
        let store = self.store.clone();
        let slug = slug.to_string();
        run_blocking(move || store.get_or_create(&slug, kind)).await
    }

    pub async fn resolve(&self, uuid: &str) -> Result<Option<MappingRecord>> {
        let store = self.store.clone();
        let uuid = uuid.to_string();
        run_blocking(move || store.find(&uuid)).await
    }

    pub async fn health(&self) -> Result<()> {
        let store = self.store.clone();
        run_blocking(move || store.ping()).await
    }
}

#[async_trait(?Send)]
impl IdMapper for MappingService {
    async fn get_or_create_id(&self, slug: &str, kind: EntityKind) -> Result<String> {
        MappingService::get_or_create_id(self, slug, kind.as_str()).await
    }

    async fn resolve(&self, uuid: &str) -> Result<Option<MappingRecord>> {
        MappingService::resolve(self, uuid).await
    }
}

fn validate(slug: &str, kind: &str) -> Result<EntityKind> {
    if slug.trim().is_empty() || kind.trim().is_empty() {
        return Err(MappingError::InvalidInput(
            "slug and type are required".to_string(),
        ));
    }
    kind.parse::<EntityKind>()
        .map_err(|e| MappingError::InvalidInput(e.to_string()))
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| MappingError::Persistence(e.to_string()))?
}
