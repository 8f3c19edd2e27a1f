//! Route handlers.

use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use estate_core::{
    CancellationToken, EstateError, PageResult, PropertyDto, SearchParams, SortBy, SortDir,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Query string of the listing endpoint. Missing values fall back to the
/// search defaults; out-of-range paging is clamped by the core.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub name: Option<String>,
    pub address: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl ListQuery {
    fn into_params(self) -> SearchParams {
        let defaults = SearchParams::default();
        SearchParams {
            name: self.name,
            address: self.address,
            min_price: self.min_price,
            max_price: self.max_price,
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
            sort_by: self.sort_by.as_deref().map(SortBy::parse).unwrap_or_default(),
            sort_dir: self.sort_dir.as_deref().map(SortDir::parse).unwrap_or_default(),
        }
    }
}

/// Error body sent to clients.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.to_string(),
        }
    }
}

impl From<EstateError> for ApiError {
    fn from(err: EstateError) -> Self {
        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", err);
        } else {
            warn!("Request rejected: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

/// `GET /api/v1/properties`
///
/// Nothing cancels this token. When the client goes away the handler future
/// is dropped and the store aborts the statement in flight on its own.
pub async fn handle_list_properties(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResult<PropertyDto>>, ApiError> {
    let params = query.into_params();
    debug!("Listing properties: {:?}", params);

    let cancel = CancellationToken::new();
    let page = state.api.search(&params, &cancel).await?;
    Ok(Json(page.into_page_result()))
}

/// `GET /api/v1/properties/{id}`
pub async fn handle_get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PropertyDto>, ApiError> {
    let cancel = CancellationToken::new();
    match state.api.get_by_id(&id, &cancel).await? {
        Some(property) => Ok(Json(PropertyDto::from(property))),
        None => Err(ApiError::not_found("Property not found")),
    }
}
