use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{IdMapper, MappingError, Result};
use crate::gateway::retrying_client;
use crate::models::{EntityKind, MappingRecord};

#[derive(Serialize)]
struct GetIdRequest<'a> {
    slug: &'a str,
    #[serde(rename = "type")]
    kind: EntityKind,
}

#[derive(Deserialize)]
struct GetIdResponse {
    uuid: String,
}

/// HTTP client for a remote mapping service.
#[derive(Clone)]
pub struct MappingClient {
    base_url: String,
    http: ClientWithMiddleware,
}

impl MappingClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: retrying_client(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(e: impl fmt::Display) -> MappingError {
    MappingError::Transport(e.to_string())
}

#[async_trait(?Send)]
impl IdMapper for MappingClient {
    async fn get_or_create_id(&self, slug: &str, kind: EntityKind) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint("/api/get-id"))
            .json(&GetIdRequest { slug, kind })
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(MappingError::Transport(format!("get-id returned {}", status)));
        }
        let body: GetIdResponse = response.json().await.map_err(transport)?;
        debug!("Mapped {} ({}) to {}", slug, kind, body.uuid);
        Ok(body.uuid)
    }

    async fn resolve(&self, uuid: &str) -> Result<Option<MappingRecord>> {
        let response = self
            .http
            .get(self.endpoint(&format!("/api/get-slug/{}", uuid)))
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json().await.map(Some).map_err(transport)
            }
            status => Err(MappingError::Transport(format!(
                "get-slug returned {}",
                status
            ))),
        }
    }
}
