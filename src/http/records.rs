//! Protected record endpoints. Reached only through an admission pipeline.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::http::extract::{parse_json_body, Identity};
use crate::http::server::AppState;
use crate::store::{Record, RecordInput};

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("invalid record id"))
}

fn parse_input(body: &[u8]) -> Result<RecordInput, ApiError> {
    let input: RecordInput = parse_json_body(body)?;
    if !input.is_valid() {
        return Err(ApiError::bad_request(
            "all fields (title, author, price) are required",
        ));
    }
    Ok(input)
}

fn not_found() -> ApiError {
    ApiError::NotFound("no data found by given id".into())
}

pub async fn list_records(
    State(state): State<AppState>,
    Identity(_claims): Identity,
) -> Result<Json<Vec<Record>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

pub async fn create_record(
    State(state): State<AppState>,
    Identity(claims): Identity,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let input = parse_input(&body)?;
    let record = state.store.insert(input).await?;
    tracing::info!(username = %claims.username, id = %record.id, "Record created");
    Ok(Json(record))
}

pub async fn update_record(
    State(state): State<AppState>,
    Identity(claims): Identity,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let id = parse_id(&id)?;
    let input = parse_input(&body)?;
    let record = state.store.update(id, input).await?.ok_or_else(not_found)?;
    tracing::info!(username = %claims.username, id = %id, "Record updated");
    Ok(Json(record))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Identity(claims): Identity,
    Path(id): Path<String>,
) -> Result<Json<&'static str>, ApiError> {
    let id = parse_id(&id)?;
    if !state.store.delete(id).await? {
        return Err(not_found());
    }
    tracing::info!(username = %claims.username, id = %id, "Record deleted");
    Ok(Json("Data deleted successfully"))
}

pub async fn delete_all_records(
    State(state): State<AppState>,
    Identity(claims): Identity,
) -> Result<Json<&'static str>, ApiError> {
    let removed = state.store.delete_all().await?;
    tracing::info!(username = %claims.username, removed, "All records deleted");
    Ok(Json("all records deleted successfully"))
}
