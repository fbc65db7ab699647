use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;

use wsd_controller::CreateWorkspaceRequest;

use crate::dto::{Envelope, EventDto, MessageEnvelope, WorkspaceDto};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/workspaces",
            get(list_workspaces).post(create_workspace),
        )
        .route(
            "/api/v1/workspaces/{id}",
            get(get_workspace).delete(delete_workspace),
        )
        .route("/api/v1/workspaces/{id}/start", post(start_workspace))
        .route("/api/v1/workspaces/{id}/stop", post(stop_workspace))
        .route("/api/v1/workspaces/{id}/events", get(get_events))
}

async fn create_workspace(
    State(state): State<AppState>,
    payload: Result<Json<CreateWorkspaceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<WorkspaceDto>>)> {
    let Json(req) =
        payload.map_err(|e| ApiError::BadRequest(format!("invalid request: {e}")))?;

    let ws = state.controller.create(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(WorkspaceDto::from_workspace(ws))),
    ))
}

async fn list_workspaces(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<WorkspaceDto>>>> {
    let workspaces = state.controller.list().await?;

    let dtos = workspaces
        .into_iter()
        .map(WorkspaceDto::from_workspace)
        .collect();

    Ok(Json(Envelope::data(dtos)))
}

async fn get_workspace(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<WorkspaceDto>>> {
    let (ws, observed) = state.controller.get(&id).await?;

    Ok(Json(Envelope::data(WorkspaceDto::with_status(ws, observed))))
}

async fn delete_workspace(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageEnvelope>> {
    let ws = state.controller.delete(&id).await?;

    Ok(Json(MessageEnvelope {
        message: format!("Workspace {} deleted", ws.id),
        error: None,
    }))
}

async fn start_workspace(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<WorkspaceDto>>> {
    let ws = state.controller.start(&id).await?;

    Ok(Json(Envelope::data(WorkspaceDto::from_workspace(ws))))
}

async fn stop_workspace(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<WorkspaceDto>>> {
    let ws = state.controller.stop(&id).await?;

    Ok(Json(Envelope::data(WorkspaceDto::from_workspace(ws))))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EventsQuery {
    /// Maximum number of events to return (default 50, capped at 100).
    limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}/events",
    params(
        ("id" = String, Path, description = "Workspace ID"),
        EventsQuery
    ),
    responses(
        (status = 200, description = "Workspace events, newest first", body = Vec<EventDto>),
        (status = 404, description = "Unknown workspace")
    )
)]
pub async fn get_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<EventsQuery>, QueryRejection>,
) -> ApiResult<Json<Envelope<Vec<EventDto>>>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(format!("invalid query: {e}")))?;

    let events = state.controller.events(&id, query.limit).await?;

    let dtos = events.into_iter().map(EventDto::from_event).collect();
    Ok(Json(Envelope::data(dtos)))
}
