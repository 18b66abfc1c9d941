use crate::adapters::SESSION_COOKIE;
use crate::app::ErrorResponse;
use crate::state;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

pub(crate) async fn session_middleware(
    State(state): State<state::AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let expected = match state.session_token.as_deref() {
        Some(token) => token,
        None => return next.run(req).await,
    };

    if !req.uri().path().starts_with("/api/") {
        return next.run(req).await;
    }

    if session_cookie(req.headers(), SESSION_COOKIE) == Some(expected) {
        return next.run(req).await;
    }

    tracing::debug!(path = req.uri().path(), "rejected request without session");
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "unauthorized",
        }),
    )
        .into_response()
}

fn session_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    for header in headers.get_all(COOKIE).iter() {
        if let Ok(raw) = header.to_str()
            && let Some(value) = cookie_from_header(raw, name)
        {
            return Some(value);
        }
    }
    None
}

fn cookie_from_header<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|part| {
        let (cookie_name, cookie_value) = part.trim().split_once('=')?;
        (cookie_name == name).then_some(cookie_value)
    })
}
