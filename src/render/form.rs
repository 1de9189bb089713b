// src/render/form.rs
//
// The report editor form. Every structural button posts the whole form back
// with an `action` value, so typed values survive adding and removing rows.

use askama::Template;
use uuid::Uuid;

use crate::editor::ValidationError;
use crate::models::{ReportData, ReportType, StudentLevel};

struct LevelInput {
    label: &'static str,
    key: &'static str,
    value: u32,
}

struct ActivityRow<'a> {
    id: Uuid,
    title: &'a str,
    date: String,
    description: &'a str,
}

struct PerformanceRow<'a> {
    id: Uuid,
    teacher_name: &'a str,
    rating: String,
    students_handled: u32,
    feedback: &'a str,
}

struct TypeOption {
    key: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Template)]
#[template(path = "form.html")]
struct FormTemplate<'a> {
    errors: Vec<String>,
    branch_name: &'a str,
    branch_location: &'a str,
    levels: Vec<LevelInput>,
    teachers: u32,
    attendance: i32,
    activities: Vec<ActivityRow<'a>>,
    performances: Vec<PerformanceRow<'a>>,
    report_types: Vec<TypeOption>,
    period: &'a str,
    placeholder: &'static str,
    feedback: &'a str,
}

impl<'a> FormTemplate<'a> {
    fn new(d: &'a ReportData, errors: &[ValidationError]) -> Self {
        let stats = &d.statistics;
        Self {
            errors: errors.iter().map(ToString::to_string).collect(),
            branch_name: &d.branch.name,
            branch_location: &d.branch.location,
            levels: StudentLevel::ALL
                .iter()
                .map(|level| LevelInput {
                    label: level.label(),
                    key: level.key(),
                    value: stats.students_per_level.get(*level),
                })
                .collect(),
            teachers: stats.teachers,
            attendance: stats.attendance_percentage,
            activities: d
                .activities
                .iter()
                .map(|a| ActivityRow {
                    id: a.id,
                    title: &a.title,
                    date: a.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
                    description: &a.description,
                })
                .collect(),
            performances: d
                .performances
                .iter()
                .map(|p| PerformanceRow {
                    id: p.id,
                    teacher_name: &p.teacher_name,
                    // A fresh row has rating 0; show it blank so the placeholder reads.
                    rating: if p.rating == 0 { String::new() } else { p.rating.to_string() },
                    students_handled: p.students_handled,
                    feedback: &p.feedback,
                })
                .collect(),
            report_types: ReportType::ALL
                .iter()
                .map(|t| TypeOption { key: t.key(), label: t.label(), selected: *t == d.report_type })
                .collect(),
            period: &d.period,
            placeholder: d.report_type.period_placeholder(),
            feedback: &d.feedback,
        }
    }
}

pub fn render_form(draft: &ReportData, errors: &[ValidationError]) -> askama::Result<String> {
    FormTemplate::new(draft, errors).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::FormEditor;

    #[test]
    fn carries_native_constraints() {
        let mut e = FormEditor::new();
        e.add_performance();
        let html = render_form(e.draft(), &[]).unwrap();
        assert!(html.contains(r#"name="attendance" required min="0" max="100""#));
        assert!(html.contains(r#"required min="1" max="5""#));
        assert!(html.contains(r#"name="branch_name" required"#));
        assert!(html.contains(r#"name="period" required"#));
        assert_eq!(html.matches(r#"required min="0" value"#).count(), 5);
    }

    #[test]
    fn structural_buttons_skip_validation() {
        let mut e = FormEditor::new();
        let a = e.add_activity();
        let html = render_form(e.draft(), &[]).unwrap();
        assert!(html.contains(r#"value="add_activity" formnovalidate"#));
        assert!(html.contains(&format!(r#"value="remove_activity:{a}" formnovalidate"#)));
        assert!(html.contains(r#"value="add_performance" formnovalidate"#));
    }

    #[test]
    fn placeholder_follows_report_type() {
        let mut e = FormEditor::new();
        e.apply_field("report_type", "quarterly");
        let html = render_form(e.draft(), &[]).unwrap();
        assert!(html.contains(r#"placeholder="Q1 2024""#));
        assert!(html.contains(r#"<option value="quarterly" selected>Quarterly</option>"#));
    }

    #[test]
    fn errors_are_listed_and_values_kept() {
        let mut e = FormEditor::new();
        e.apply_field("branch_name", "O'Neil \"East\"");
        let errors = e.validate();
        let html = render_form(e.draft(), &errors).unwrap();
        assert!(html.contains("Location is required"));
        assert!(html.contains("&quot;East&quot;"));
        assert!(!html.contains(r#"O'Neil "East""#));
    }

    #[test]
    fn typed_markup_is_escaped() {
        let mut e = FormEditor::new();
        let id = e.add_activity();
        e.apply_field(&format!("activity.{id}.description"), "</textarea><script>x()</script>");
        e.apply_field("feedback", "<b>bold</b>");
        let html = render_form(e.draft(), &[]).unwrap();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>bold</b>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
