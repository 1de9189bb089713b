// src/routes/dashboard.rs

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Local;
use serde::Deserialize;

use super::{html_page, internal_error, session_id};
use crate::{
    editor::FormAction,
    export::{export_pdf, EXPORT_FILENAME},
    models::{ReportData, ReportView},
    render::{
        pages::{self, DashboardView},
        render_report, RenderMode,
    },
    session::SessionId,
    AppState,
};

#[derive(Deserialize)]
pub struct DashboardQ {
    pub export: Option<String>,
}

fn authed(state: &AppState, jar: &CookieJar) -> Option<SessionId> {
    session_id(jar).filter(|id| state.sessions.is_authenticated(*id))
}

fn to_login() -> Response {
    Redirect::to("/login").into_response()
}

fn submitted_report(state: &AppState, id: SessionId) -> Option<Option<ReportData>> {
    state.sessions.with_workspace(id, |ws| ws.submitted.clone())
}

/// GET /dashboard
pub async fn show(State(state): State<AppState>, jar: CookieJar, Query(q): Query<DashboardQ>) -> Response {
    let Some(id) = authed(&state, &jar) else { return to_login() };
    let export_failed = q.export.as_deref() == Some("failed");
    let today = Local::now().date_naive();

    let page = state.sessions.with_workspace(id, |ws| match (&ws.submitted, ws.shows_form()) {
        (Some(report), false) => {
            let html = render_report(report, RenderMode::Screen, today);
            pages::dashboard_page(DashboardView::Report { html: &html, export_failed })
        }
        _ => pages::form_page(ws.editor.draft(), &[]),
    });

    match page {
        Some(page) => html_page(StatusCode::OK, page),
        None => to_login(),
    }
}

/// POST /dashboard/form
///
/// Applies every posted field to the working copy, then the requested action.
pub async fn post_form(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let Some(id) = authed(&state, &jar) else { return to_login() };

    let outcome = state.sessions.with_workspace(id, |ws| {
        if !ws.shows_form() {
            return None;
        }
        let mut action = None;
        for (name, value) in &fields {
            if name == "action" {
                action = FormAction::parse(value);
            } else {
                ws.editor.apply_field(name, value);
            }
        }

        match action {
            Some(FormAction::Submit) => match ws.editor.submit() {
                Ok(report) => {
                    tracing::info!(
                        activities = report.activities.len(),
                        performances = report.performances.len(),
                        "report submitted"
                    );
                    ws.accept(report);
                    None
                }
                Err(errors) => Some(pages::form_page(ws.editor.draft(), &errors)),
            },
            Some(a) => {
                a.apply(&mut ws.editor);
                None
            }
            None => None,
        }
    });

    match outcome {
        None => to_login(),
        Some(Some(invalid)) => html_page(StatusCode::UNPROCESSABLE_ENTITY, invalid),
        Some(None) => Redirect::to("/dashboard").into_response(),
    }
}

/// POST /dashboard/edit
pub async fn edit(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(id) = authed(&state, &jar) else { return to_login() };
    match state.sessions.with_workspace(id, |ws| ws.begin_edit()) {
        Some(()) => Redirect::to("/dashboard").into_response(),
        None => to_login(),
    }
}

/// GET /dashboard/print
pub async fn print(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(id) = authed(&state, &jar) else { return to_login() };
    match submitted_report(&state, id) {
        None => to_login(),
        Some(None) => Redirect::to("/dashboard").into_response(),
        Some(Some(report)) => {
            let html = render_report(&report, RenderMode::Export, Local::now().date_naive());
            html_page(StatusCode::OK, pages::print_page(&report.title(), &html))
        }
    }
}

/// GET /dashboard/export
///
/// Failures keep the user on the report view with a retry notice.
pub async fn export(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(id) = authed(&state, &jar) else { return to_login() };
    let report = match submitted_report(&state, id) {
        None => return to_login(),
        Some(None) => return Redirect::to("/dashboard").into_response(),
        Some(Some(report)) => report,
    };

    let today = Local::now().date_naive();
    let font = state.pdf_font.clone();
    let result = tokio::task::spawn_blocking(move || export_pdf(&report, today, font.as_deref())).await;

    match result {
        Ok(Ok(bytes)) => {
            tracing::info!(bytes = bytes.len(), "pdf exported");
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{EXPORT_FILENAME}\"")),
                ],
                bytes,
            )
                .into_response()
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "pdf export failed");
            Redirect::to("/dashboard?export=failed").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "pdf export task aborted");
            Redirect::to("/dashboard?export=failed").into_response()
        }
    }
}

/// GET /dashboard/report.json
pub async fn report_json(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, (StatusCode, String)> {
    let Some(id) = authed(&state, &jar) else { return Ok(to_login()) };
    match submitted_report(&state, id) {
        None => Ok(to_login()),
        Some(None) => Ok(Redirect::to("/dashboard").into_response()),
        Some(Some(report)) => {
            let body = serde_json::to_value(ReportView::from(&report)).map_err(internal_error)?;
            Ok(Json(body).into_response())
        }
    }
}
