// src/routes/mod.rs

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::session::SessionId;

pub mod auth;
pub mod dashboard;
pub mod health;

pub const SESSION_COOKIE: &str = "branch_report_session";

// Common error mapper
pub fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}"))
}

/// Sends a rendered page with `status`; a template failure becomes a 500.
pub fn html_page(status: StatusCode, page: askama::Result<String>) -> Response {
    match page {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "page render failed");
            internal_error(e).into_response()
        }
    }
}

/// Session id carried by the request, if any.
pub fn session_id(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE).and_then(|c| SessionId::parse_str(c.value()).ok())
}
