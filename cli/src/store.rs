//! [`ShapeStore`] over the floor-plan REST API.

use async_trait::async_trait;
use canvas::scene::DurableId;
use canvas::sync::{PersistedShape, ShapeFields, ShapePatch, ShapeStore, StoreError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

pub struct HttpShapeStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpShapeStore {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.trim_end_matches('/').to_owned() }
    }

    pub(crate) fn tables_url(&self, floor_id: Uuid) -> String {
        format!("{}/api/floors/{floor_id}/tables", self.base_url)
    }

    pub(crate) fn table_url(&self, floor_id: Uuid, id: DurableId) -> String {
        format!("{}/{id}", self.tables_url(floor_id))
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

/// Map a non-success response. A 404 on a specific table becomes `NotFound`.
pub(crate) fn status_error(code: u16, body: String, target: Option<DurableId>) -> StoreError {
    match (code, target) {
        (404, Some(id)) => StoreError::NotFound(id),
        _ => StoreError::Status { code, message: body },
    }
}

pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, StoreError> {
    serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))
}

async fn read_response<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    target: Option<DurableId>,
) -> Result<T, StoreError> {
    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    let body = response.text().await.map_err(transport)?;
    if !status.is_success() {
        return Err(status_error(status.as_u16(), body, target));
    }
    decode_body(&body)
}

#[async_trait]
impl ShapeStore for HttpShapeStore {
    async fn list(&self, floor_id: Uuid) -> Result<Vec<PersistedShape>, StoreError> {
        debug!(%floor_id, "listing tables");
        read_response(self.client.get(self.tables_url(floor_id)), None).await
    }

    async fn create(&self, floor_id: Uuid, fields: &ShapeFields) -> Result<PersistedShape, StoreError> {
        debug!(%floor_id, kind = fields.kind.as_str(), "creating table");
        read_response(self.client.post(self.tables_url(floor_id)).json(fields), None).await
    }

    async fn update(&self, floor_id: Uuid, id: DurableId, patch: &ShapePatch) -> Result<PersistedShape, StoreError> {
        debug!(%floor_id, %id, "updating table");
        read_response(self.client.patch(self.table_url(floor_id, id)).json(patch), Some(id)).await
    }

    async fn delete(&self, floor_id: Uuid, id: DurableId) -> Result<(), StoreError> {
        debug!(%floor_id, %id, "deleting table");
        read_response::<Value>(self.client.delete(self.table_url(floor_id, id)), Some(id))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
