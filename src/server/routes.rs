use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    Json,
    http::StatusCode,
};
use serde::Serialize;
use crate::model::{Contact, ContactPayload, Entity, NewContact, NewTemplate, Template, TemplatePayload};
use crate::server::AppState;
use crate::Error;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of every successful mutation.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl StatusResponse {
    fn success() -> Self {
        Self { status: "success", id: None }
    }

    fn created(id: i64) -> Self {
        Self { status: "success", id: Some(id) }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        Error::ConstraintViolation(_) => StatusCode::CONFLICT,
        Error::StorageUnavailable(_) | Error::NotInitialized(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(err: Error) -> ApiError {
    let status = status_for(&err);
    if err.is_client_error() {
        tracing::warn!("Request rejected ({}): {}", status, err);
    } else {
        tracing::error!("Request failed ({}): {}", status, err);
    }
    (status, Json(ErrorResponse { error: err.to_string() }))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(payload)| payload)
        .map_err(|e| api_error(Error::BadRequest(e.body_text())))
}

fn path_id(id: Result<Path<u64>, PathRejection>) -> ApiResult<u64> {
    id.map(|Path(id)| id)
        .map_err(|e| api_error(Error::BadRequest(e.body_text())))
}

async fn list<E: Entity>(state: &AppState) -> ApiResult<Json<Vec<E>>> {
    let records = state.store.list_all::<E>().await.map_err(api_error)?;
    tracing::debug!("Listed {} {}", records.len(), E::TABLE);
    Ok(Json(records))
}

async fn create<E: Entity>(state: &AppState, draft: E::Draft) -> ApiResult<(StatusCode, Json<StatusResponse>)> {
    let id = state.store.insert::<E>(draft).await.map_err(api_error)?;
    tracing::info!("Created {} row {}", E::TABLE, id);
    Ok((StatusCode::CREATED, Json(StatusResponse::created(id))))
}

async fn remove<E: Entity>(state: &AppState, id: u64) -> ApiResult<Json<StatusResponse>> {
    let removed = state.store.delete_by_id::<E>(id).await.map_err(api_error)?;
    tracing::info!("Deleted {} row {} ({} removed)", E::TABLE, id, removed);
    Ok(Json(StatusResponse::success()))
}

// ========== Contacts ==========

pub async fn list_contacts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Contact>>> {
    list::<Contact>(&state).await
}

pub async fn add_contact(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ContactPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StatusResponse>)> {
    let draft = NewContact::try_from(json_body(body)?).map_err(api_error)?;
    create::<Contact>(&state, draft).await
}

pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<StatusResponse>> {
    remove::<Contact>(&state, path_id(id)?).await
}

// ========== Templates ==========

pub async fn list_templates(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Template>>> {
    list::<Template>(&state).await
}

pub async fn add_template(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TemplatePayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StatusResponse>)> {
    let draft = NewTemplate::try_from(json_body(body)?).map_err(api_error)?;
    create::<Template>(&state, draft).await
}

pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<StatusResponse>> {
    remove::<Template>(&state, path_id(id)?).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&Error::BadRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&Error::ConstraintViolation("x".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&Error::StorageUnavailable("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&Error::NotInitialized("sqlite:data.db".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_for(&Error::Internal("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_response_shape() {
        let created = serde_json::to_value(StatusResponse::created(4)).unwrap();
        assert_eq!(created, serde_json::json!({"status": "success", "id": 4}));

        let deleted = serde_json::to_value(StatusResponse::success()).unwrap();
        assert_eq!(deleted, serde_json::json!({"status": "success"}));
    }
}
