//! HTML rendering for the report and the surrounding pages.
//!
//! Everything here is a pure function from data to markup. The generation
//! date is passed in so output is deterministic.

use chrono::NaiveDate;

use crate::models::{Activity, Performance, ReportData};

pub mod chart;
pub mod form;
pub mod pages;

pub const INSTITUTION_NAME: &str = "Ijtimaulkheir Madresa";
pub const INSTITUTION_TAGLINE: &str = "Islamic Learning Center";
pub const LOGO_URL: &str = "/logo.png";

/// Screen and export renders carry the same content in the same order;
/// export adds page-break hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Screen,
    Export,
}

impl RenderMode {
    fn avoid_break(self) -> &'static str {
        match self {
            RenderMode::Screen => "",
            RenderMode::Export => " avoid-break",
        }
    }

    fn break_before(self) -> &'static str {
        match self {
            RenderMode::Screen => "",
            RenderMode::Export => " page-break-before",
        }
    }
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn format_generated_on(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

fn logo(size_class: &str) -> String {
    format!(r#"<img class="logo {size_class}" src="{LOGO_URL}" alt="{INSTITUTION_NAME} Logo">"#)
}

/// Render a submitted report as an HTML fragment
pub fn render_report(data: &ReportData, mode: RenderMode, generated_on: NaiveDate) -> String {
    format!(
        r#"<div class="report">
{header}
{panels}
{chart}
{activities}
{performances}
{feedback}
{footer}
</div>"#,
        header = render_header(data, mode),
        panels = render_panels(data, mode),
        chart = render_distribution(data, mode),
        activities = render_activities(&data.activities, mode),
        performances = render_performances(&data.performances, mode),
        feedback = render_feedback(&data.feedback, mode),
        footer = render_footer(data, mode, generated_on),
    )
}

fn render_header(data: &ReportData, mode: RenderMode) -> String {
    format!(
        r#"<header class="report-header{avoid}">
    {logo}
    <div class="report-heading">
        <h1>{INSTITUTION_NAME}</h1>
        <p class="tagline">{INSTITUTION_TAGLINE}</p>
        <p class="report-title">{title}</p>
        <p class="muted">{location}</p>
    </div>
</header>"#,
        avoid = mode.avoid_break(),
        logo = logo("logo-md"),
        title = html_escape(&data.title()),
        location = html_escape(&data.branch.location),
    )
}

fn render_panels(data: &ReportData, mode: RenderMode) -> String {
    let stats = &data.statistics;
    format!(
        r#"<div class="panels{avoid}">
    <section class="panel">
        <h2>Branch Information</h2>
        <p>Name: {name}</p>
        <p>Location: {location}</p>
    </section>
    <section class="panel">
        <h2>Key Statistics</h2>
        <p>Total Students: {total}</p>
        <p>Teachers: {teachers}</p>
        <p>Attendance: {attendance}%</p>
    </section>
</div>"#,
        avoid = mode.avoid_break(),
        name = html_escape(&data.branch.name),
        location = html_escape(&data.branch.location),
        total = stats.total_students(),
        teachers = stats.teachers,
        attendance = stats.attendance_percentage,
    )
}

fn render_distribution(data: &ReportData, mode: RenderMode) -> String {
    format!(
        r#"<section class="panel distribution{avoid}">
    <h2>Student Distribution</h2>
    {svg}
</section>"#,
        avoid = mode.avoid_break(),
        svg = chart::render_bar_chart(&data.statistics.students_per_level),
    )
}

fn render_activities(activities: &[Activity], mode: RenderMode) -> String {
    let blocks: String = activities
        .iter()
        .map(|a| {
            format!(
                r#"<article class="block{avoid}">
            <span class="muted">{date}</span>
            <h3>{title}</h3>
            <p class="prewrap">{description}</p>
        </article>"#,
                avoid = mode.avoid_break(),
                date = a.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
                title = html_escape(&a.title),
                description = html_escape(&a.description),
            )
        })
        .collect();

    format!(
        r#"<section class="section activities{brk}">
    <h2>Activities &amp; Achievements</h2>
    {blocks}
</section>"#,
        brk = mode.break_before(),
    )
}

fn render_performances(performances: &[Performance], mode: RenderMode) -> String {
    let blocks: String = performances
        .iter()
        .map(|p| {
            format!(
                r#"<article class="block{avoid}">
            <h3>{name}</h3>
            <p class="muted">Rating: {rating}/5</p>
            <p class="muted">Students: {students}</p>
            <p class="prewrap">{feedback}</p>
        </article>"#,
                avoid = mode.avoid_break(),
                name = html_escape(&p.teacher_name),
                rating = p.rating,
                students = p.students_handled,
                feedback = html_escape(&p.feedback),
            )
        })
        .collect();

    format!(
        r#"<section class="section performances{brk}">
    <h2>Teacher Performance</h2>
    {blocks}
</section>"#,
        brk = mode.break_before(),
    )
}

/// Omitted entirely when there is no feedback.
fn render_feedback(feedback: &str, mode: RenderMode) -> String {
    if feedback.is_empty() {
        return String::new();
    }
    format!(
        r#"<section class="section additional-feedback{avoid}">
    <h2>Additional Feedback</h2>
    <div class="panel"><p class="prewrap">{text}</p></div>
</section>"#,
        avoid = mode.avoid_break(),
        text = html_escape(feedback),
    )
}

fn render_footer(data: &ReportData, mode: RenderMode, generated_on: NaiveDate) -> String {
    format!(
        r#"<footer class="report-footer{avoid}">
    {logo}
    <p class="brand">{INSTITUTION_NAME}</p>
    <p>Generated on {date}</p>
    <p class="small">{INSTITUTION_TAGLINE} - {location}</p>
</footer>"#,
        avoid = mode.avoid_break(),
        logo = logo("logo-sm"),
        date = format_generated_on(generated_on),
        location = html_escape(&data.branch.location),
    )
}
