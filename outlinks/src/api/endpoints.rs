use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Deserializer};

use crate::{
    api::errors::ApiError,
    router::AppState,
    types::{ErrorBody, MessageBody, OutLink, OutLinkInput},
};

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE";
pub const RECORD_ALLOWED_METHODS: &str = "GET";

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<String>,
}

/// `?id=` is treated the same as no `id` at all.
fn empty_string_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(de)?;
    Ok(opt.filter(|s| !s.is_empty()))
}

fn body(payload: Result<Json<OutLinkInput>, JsonRejection>) -> Result<OutLinkInput, ApiError> {
    payload.map(|Json(input)| input).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected outlink body");
        match rejection {
            JsonRejection::BytesRejection(inner)
                if inner.status() == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                ApiError::PayloadTooLarge
            }
            _ => ApiError::BadRequest("Invalid JSON body".to_string()),
        }
    })
}

fn id_param(query: Result<Query<IdQuery>, QueryRejection>) -> Result<Option<String>, ApiError> {
    query
        .map(|Query(query)| query.id)
        .map_err(|_| ApiError::BadRequest("Invalid query string".to_string()))
}

pub async fn list_outlinks(State(state): State<AppState>) -> Result<Json<Vec<OutLink>>, ApiError> {
    let outlinks = state.service.list().await?;
    tracing::debug!(count = outlinks.len(), "Listing outlinks");
    Ok(Json(outlinks))
}

pub async fn get_outlink(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OutLink>, ApiError> {
    Ok(Json(state.service.get(&id).await?))
}

pub async fn create_outlink(
    State(state): State<AppState>,
    payload: Result<Json<OutLinkInput>, JsonRejection>,
) -> Result<(StatusCode, Json<OutLink>), ApiError> {
    let input = body(payload)?;
    let created = state.service.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_outlink(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
    payload: Result<Json<OutLinkInput>, JsonRejection>,
) -> Result<Json<OutLink>, ApiError> {
    let id = id_param(query)?;
    let input = body(payload)?;
    let updated = state.service.update(id.as_deref(), input).await?;
    Ok(Json(updated))
}

pub async fn delete_outlink(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = id_param(query)?;
    state.service.delete(id.as_deref()).await?;
    Ok(Json(MessageBody {
        message: "Outlink deleted successfully".to_string(),
    }))
}

pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                "GET, POST, PUT, DELETE, OPTIONS",
            ),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

fn not_allowed(allow: &'static str) -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, allow)],
        Json(ErrorBody {
            error: "Method not allowed".to_string(),
        }),
    )
}

pub async fn method_not_allowed() -> impl IntoResponse {
    not_allowed(ALLOWED_METHODS)
}

/// Single records are read-only; changes go through the collection route.
pub async fn record_method_not_allowed() -> impl IntoResponse {
    not_allowed(RECORD_ALLOWED_METHODS)
}
