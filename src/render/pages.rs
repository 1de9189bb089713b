// src/render/pages.rs
//
// Full HTML documents: login, dashboard (form or report), and the
// print-friendly standalone report. Markup lives in `templates/`.

use askama::Template;

use super::{form::render_form, INSTITUTION_NAME, INSTITUTION_TAGLINE, LOGO_URL};
use crate::editor::ValidationError;
use crate::models::ReportData;

/// Branding shared by every page.
pub struct PageContext {
    pub institution: &'static str,
    pub tagline: &'static str,
    pub logo_url: &'static str,
}

impl Default for PageContext {
    fn default() -> Self {
        Self { institution: INSTITUTION_NAME, tagline: INSTITUTION_TAGLINE, logo_url: LOGO_URL }
    }
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate<'a> {
    ctx: PageContext,
    error: Option<&'a str>,
    username: &'a str,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate<'a> {
    ctx: PageContext,
    /// Rendered editor form; shown when there is no report.
    form: &'a str,
    /// Rendered report fragment.
    report: Option<&'a str>,
    export_failed: bool,
}

#[derive(Template)]
#[template(path = "print.html")]
struct PrintTemplate<'a> {
    ctx: PageContext,
    title: &'a str,
    report: &'a str,
}

pub fn login_page(error: Option<&str>, username: &str) -> askama::Result<String> {
    LoginTemplate { ctx: PageContext::default(), error, username }.render()
}

/// What the dashboard body shows.
pub enum DashboardView<'a> {
    /// Editor form markup.
    Form(&'a str),
    /// Rendered report markup, plus whether the last export failed.
    Report { html: &'a str, export_failed: bool },
}

pub fn dashboard_page(view: DashboardView<'_>) -> askama::Result<String> {
    let ctx = PageContext::default();
    let page = match view {
        DashboardView::Form(form) => DashboardTemplate { ctx, form, report: None, export_failed: false },
        DashboardView::Report { html, export_failed } => {
            DashboardTemplate { ctx, form: "", report: Some(html), export_failed }
        }
    };
    page.render()
}

/// Dashboard showing the editor for `draft`, listing `errors` above it.
pub fn form_page(draft: &ReportData, errors: &[ValidationError]) -> askama::Result<String> {
    let form = render_form(draft, errors)?;
    dashboard_page(DashboardView::Form(&form))
}

/// Standalone document for printing or saving as PDF from the browser.
pub fn print_page(title: &str, report_html: &str) -> askama::Result<String> {
    PrintTemplate { ctx: PageContext::default(), title, report: report_html }.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_page_shows_error_and_keeps_username() {
        let html = login_page(Some("Invalid username or password"), "adm<in").unwrap();
        assert!(html.contains("Invalid username or password"));
        assert!(html.contains(r#"value="adm&lt;in""#));
        assert!(html.contains(r#"action="/login""#));
    }

    #[test]
    fn dashboard_form_view_has_no_download() {
        let html = dashboard_page(DashboardView::Form("<form></form>")).unwrap();
        assert!(html.contains("<form></form>"));
        assert!(!html.contains("Download PDF"));
        assert!(html.contains(r#"action="/logout""#));
    }

    #[test]
    fn dashboard_report_view_offers_export_and_retry_notice() {
        let html = dashboard_page(DashboardView::Report { html: "<div class=\"report\"></div>", export_failed: true }).unwrap();
        assert!(html.contains(r#"<div class="report"></div>"#));
        assert_eq!(html.matches("Download PDF").count(), 2);
        assert!(html.contains("Edit Report"));
        assert!(html.contains("could not be generated"));

        let html = dashboard_page(DashboardView::Report { html: "", export_failed: false }).unwrap();
        assert!(!html.contains("could not be generated"));
    }

    #[test]
    fn print_page_sets_page_margin() {
        let html = print_page("Monthly Report - March 2024", "<div class=\"report\"></div>").unwrap();
        assert!(html.contains("@page { margin: 20mm; }"));
        assert!(html.contains("<title>Monthly Report - March 2024 - Ijtimaulkheir Madresa</title>"));
        assert!(html.contains(r#"<div class="report"></div>"#));
    }

    #[test]
    fn form_page_wraps_editor_with_errors() {
        let draft = ReportData::default();
        let html = form_page(&draft, &[ValidationError::Required("Period")]).unwrap();
        assert!(html.contains("Period is required"));
        assert!(html.contains("Generate Report"));
        assert!(html.contains(r#"action="/logout""#));
        assert!(!html.contains("Download PDF"));
    }
}
