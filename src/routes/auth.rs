// src/routes/auth.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use super::{html_page, session_id, SESSION_COOKIE};
use crate::{render::pages, AppState};

#[derive(Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

/// GET /login
pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    if session_id(&jar).is_some_and(|id| state.sessions.is_authenticated(id)) {
        return Redirect::to("/dashboard").into_response();
    }
    html_page(StatusCode::OK, pages::login_page(None, ""))
}

/// POST /login
pub async fn login(State(state): State<AppState>, jar: CookieJar, Form(b): Form<LoginBody>) -> Response {
    match state.sessions.login(&b.username, &b.password) {
        Some(id) => {
            // a new login always starts from a clean slate
            if let Some(old) = session_id(&jar) {
                state.sessions.logout(old);
            }
            tracing::info!(user = %b.username, "login succeeded");
            let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            (jar.add(cookie), Redirect::to("/dashboard")).into_response()
        }
        None => {
            tracing::warn!(user = %b.username, "login rejected");
            html_page(
                StatusCode::UNAUTHORIZED,
                pages::login_page(Some("Invalid username or password"), &b.username),
            )
        }
    }
}

/// POST /logout
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(id) = session_id(&jar) {
        if state.sessions.logout(id) {
            tracing::info!("logged out, report discarded");
        }
    }
    (jar.remove(Cookie::build(SESSION_COOKIE).path("/")), Redirect::to("/login")).into_response()
}
