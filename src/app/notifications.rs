use crate::app::ErrorResponse;
use crate::config::DEFAULT_LIST_LIMIT;
use crate::state;
use crate::types::{BulkReadRequest, Notification, NotificationId, UnreadCount};

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    limit: Option<usize>,
}

pub(crate) async fn list(
    State(state): State<state::AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Notification>>, (StatusCode, Json<ErrorResponse>)> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    if limit == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "limit must be greater than 0.",
            }),
        ));
    }
    Ok(Json(state.store.list(limit)))
}

pub(crate) async fn unread_count(State(state): State<state::AppState>) -> Json<UnreadCount> {
    Json(UnreadCount {
        count: state.store.unread_count(),
    })
}

pub(crate) async fn mark_read(
    State(state): State<state::AppState>,
    Path(id): Path<String>,
) -> StatusCode {
    let id = NotificationId::from(id);
    let flipped = state.store.mark_read(&id);
    tracing::debug!(id = %id, flipped, "mark read");
    StatusCode::NO_CONTENT
}

pub(crate) async fn bulk_mark_read(
    State(state): State<state::AppState>,
    Json(request): Json<BulkReadRequest>,
) -> StatusCode {
    let flipped = state.store.bulk_mark_read(&request.ids);
    tracing::debug!(requested = request.ids.len(), flipped, "bulk mark read");
    StatusCode::NO_CONTENT
}

pub(crate) async fn mark_all_read(State(state): State<state::AppState>) -> StatusCode {
    let flipped = state.store.mark_all_read();
    tracing::debug!(flipped, "mark all read");
    StatusCode::NO_CONTENT
}

pub(crate) async fn delete(
    State(state): State<state::AppState>,
    Path(id): Path<String>,
) -> StatusCode {
    let id = NotificationId::from(id);
    let removed = state.store.delete(&id);
    tracing::debug!(id = %id, removed, "delete notification");
    StatusCode::NO_CONTENT
}

pub(crate) async fn delete_all(State(state): State<state::AppState>) -> StatusCode {
    let removed = state.store.delete_all();
    tracing::debug!(removed, "delete all notifications");
    StatusCode::NO_CONTENT
}
