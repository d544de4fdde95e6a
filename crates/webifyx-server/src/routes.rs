//! Site CRUD handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use webifyx_core::element::validate_elements;
use webifyx_core::{Site, SiteContent, StorageError};

use crate::AppState;
use crate::error::ApiResult;
use crate::response::ApiResponse;

/// Body of `PUT /api/sites/{id}`. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSiteRequest {
    pub name: Option<String>,
    pub content: Option<SiteContent>,
    pub is_published: Option<bool>,
    /// Version the client last saw. When present, a stale version is
    /// rejected with 409; when absent the update overwrites.
    pub version: Option<u64>,
}

impl UpdateSiteRequest {
    /// Reject content the editor could not load back.
    fn validate(&self) -> Result<(), StorageError> {
        match &self.content {
            Some(content) => Ok(validate_elements(&content.elements)?),
            None => Ok(()),
        }
    }

    fn apply_to(self, site: &mut Site) {
        if let Some(name) = self.name {
            site.name = name;
        }
        if let Some(content) = self.content {
            site.content = content;
        }
        if let Some(is_published) = self.is_published {
            site.is_published = is_published;
        }
        if let Some(version) = self.version {
            site.version = version;
        }
    }
}

/// Routes under `/api/sites`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sites", get(list_sites))
        .route(
            "/api/sites/{id}",
            get(get_site).put(update_site).delete(delete_site),
        )
}

async fn list_sites(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<String>>>> {
    let ids = state.storage.list().await?;
    Ok(Json(ApiResponse::data(ids)))
}

async fn get_site(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Site>>> {
    let site = state.storage.load(&id).await?;
    Ok(Json(ApiResponse::data(site)))
}

async fn update_site(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateSiteRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Site>>> {
    let Json(body) = body?;
    body.validate().inspect_err(|err| {
        tracing::warn!(site = %id, error = %err, "Rejected site update");
    })?;

    let mut site = state.storage.load(&id).await?;
    body.apply_to(&mut site);

    let saved = state.storage.save(&id, &site).await?;
    tracing::info!(site = %id, version = saved.version, "Site updated");
    Ok(Json(ApiResponse::data(saved)))
}

async fn delete_site(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.storage.delete(&id).await?;
    tracing::info!(site = %id, "Site deleted");
    Ok(Json(ApiResponse::message("Site deleted successfully")))
}
