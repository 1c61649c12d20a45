use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::query_engine::QueryEngine;
use crate::query_params::SearchQuery;

use super::errors::ApiError;
use super::models::SearchResponse;

/// Results tolerate brief staleness.
pub const CACHE_CONTROL: &str = "max-age=15, s-maxage=30";

pub async fn search_handler(
    State(query_engine): State<Arc<QueryEngine>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let query = SearchQuery::from_params(&params).inspect_err(|e| {
        tracing::debug!("rejected search request: {}", e);
    })?;

    let page = query_engine.search(&query).await?;

    Ok((
        [(header::CACHE_CONTROL, CACHE_CONTROL)],
        Json(SearchResponse::from(page)),
    ))
}
