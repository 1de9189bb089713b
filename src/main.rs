// src/main.rs

use std::sync::Arc;

use axum::{
    response::Redirect,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{services::ServeFile, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

mod config;
mod editor;
mod export;
mod models;
mod render;
mod routes;
mod session;

use config::Config;
use session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: SessionStore,
    /// TrueType bytes for PDF export, loaded once at startup.
    pub pdf_font: Option<Arc<[u8]>>,
}

pub fn app(state: AppState) -> Router {
    let logo = ServeFile::new(&state.config.logo_path);

    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/health", get(routes::health::health))
        // session gate
        .route("/login", get(routes::auth::login_page).post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        // editor + report
        .route("/dashboard", get(routes::dashboard::show))
        .route("/dashboard/form", post(routes::dashboard::post_form))
        .route("/dashboard/edit", post(routes::dashboard::edit))
        .route("/dashboard/print", get(routes::dashboard::print))
        .route("/dashboard/export", get(routes::dashboard::export))
        .route("/dashboard/report.json", get(routes::dashboard::report_json))
        // static
        .route_service("/logo.png", logo)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    if config.default_password {
        tracing::warn!(user = %config.username, "no REPORT_PASSWORD set, using the default password");
    }

    let pdf_font = config.load_pdf_font()?;
    if pdf_font.is_none() {
        tracing::info!("no PDF_FONT_PATH set, PDF export is limited to Latin text");
    }

    let sessions = SessionStore::new(Arc::new(config.credentials())).with_idle_timeout(config.session_idle);
    let port = config.port;
    let state = AppState { config: Arc::new(config), sessions, pdf_font };

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "branch report listening on http://127.0.0.1:{port}");

    axum::serve(listener, app(state).into_make_service()).await?;
    Ok(())
}
