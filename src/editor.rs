// src/editor.rs

use std::fmt;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Activity, Performance, ReportData, ReportType, StudentLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchField {
    Name,
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Required(&'static str),
    OutOfRange { field: String, min: i64, max: i64, value: i64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Required(field) => write!(f, "{field} is required"),
            ValidationError::OutOfRange { field, min, max, value } => {
                write!(f, "{field} must be between {min} and {max} (got {value})")
            }
        }
    }
}

/// Non-negative count; anything unparseable (or negative) becomes 0.
pub fn parse_count(input: &str) -> u32 {
    input.trim().parse::<u32>().unwrap_or(0)
}

/// Signed integer; anything unparseable becomes 0.
pub fn parse_int(input: &str) -> i32 {
    input.trim().parse::<i32>().unwrap_or(0)
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

/// Holds the working copy of one report while the user edits it.
#[derive(Debug, Clone, Default)]
pub struct FormEditor {
    draft: ReportData,
}

impl FormEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_report(report: ReportData) -> Self {
        Self { draft: report }
    }

    pub fn draft(&self) -> &ReportData {
        &self.draft
    }

    pub fn update_branch_field(&mut self, field: BranchField, value: &str) {
        match field {
            BranchField::Name => self.draft.branch.name = value.to_string(),
            BranchField::Location => self.draft.branch.location = value.to_string(),
        }
    }

    pub fn update_level_count(&mut self, level: StudentLevel, value: &str) {
        self.draft.statistics.students_per_level.set(level, parse_count(value));
    }

    pub fn update_teachers(&mut self, value: &str) {
        self.draft.statistics.teachers = parse_count(value);
    }

    pub fn update_attendance(&mut self, value: &str) {
        self.draft.statistics.attendance_percentage = parse_int(value);
    }

    pub fn update_report_type(&mut self, report_type: ReportType) {
        self.draft.report_type = report_type;
    }

    pub fn update_period(&mut self, value: &str) {
        self.draft.period = value.to_string();
    }

    pub fn update_feedback(&mut self, value: &str) {
        self.draft.feedback = value.to_string();
    }

    // ── activities ────────────────────────

    pub fn add_activity(&mut self) -> Uuid {
        let activity = Activity::empty();
        let id = activity.id;
        self.draft.activities.push(activity);
        id
    }

    /// Out-of-range indices are ignored.
    pub fn remove_activity(&mut self, index: usize) -> Option<Activity> {
        (index < self.draft.activities.len()).then(|| self.draft.activities.remove(index))
    }

    pub fn activity_index(&self, id: Uuid) -> Option<usize> {
        self.draft.activities.iter().position(|a| a.id == id)
    }

    fn activity_mut(&mut self, id: Uuid) -> Option<&mut Activity> {
        self.draft.activities.iter_mut().find(|a| a.id == id)
    }

    // ── performances ──────────────────────

    pub fn add_performance(&mut self) -> Uuid {
        let performance = Performance::empty();
        let id = performance.id;
        self.draft.performances.push(performance);
        id
    }

    /// Out-of-range indices are ignored.
    pub fn remove_performance(&mut self, index: usize) -> Option<Performance> {
        (index < self.draft.performances.len()).then(|| self.draft.performances.remove(index))
    }

    pub fn performance_index(&self, id: Uuid) -> Option<usize> {
        self.draft.performances.iter().position(|p| p.id == id)
    }

    fn performance_mut(&mut self, id: Uuid) -> Option<&mut Performance> {
        self.draft.performances.iter_mut().find(|p| p.id == id)
    }

    /// Maps one posted form field onto the matching update. Unknown names and
    /// ids that no longer exist are ignored.
    pub fn apply_field(&mut self, name: &str, value: &str) {
        match name {
            "branch_name" => self.update_branch_field(BranchField::Name, value),
            "branch_location" => self.update_branch_field(BranchField::Location, value),
            "teachers" => self.update_teachers(value),
            "attendance" => self.update_attendance(value),
            "period" => self.update_period(value),
            "feedback" => self.update_feedback(value),
            "report_type" => {
                if let Some(t) = ReportType::from_key(value) {
                    self.update_report_type(t);
                }
            }
            _ => self.apply_nested_field(name, value),
        }
    }

    fn apply_nested_field(&mut self, name: &str, value: &str) {
        if let Some(level) = name.strip_prefix("level_").and_then(StudentLevel::from_key) {
            self.update_level_count(level, value);
            return;
        }

        // activity.<uuid>.<field> / performance.<uuid>.<field>
        let mut parts = name.splitn(3, '.');
        let (Some(kind), Some(id), Some(field)) = (parts.next(), parts.next(), parts.next()) else {
            return;
        };
        let Ok(id) = Uuid::parse_str(id) else { return };

        match kind {
            "activity" => {
                let Some(a) = self.activity_mut(id) else { return };
                match field {
                    "title" => a.title = value.to_string(),
                    "date" => a.date = parse_date(value),
                    "description" => a.description = value.to_string(),
                    _ => {}
                }
            }
            "performance" => {
                let Some(p) = self.performance_mut(id) else { return };
                match field {
                    "teacher_name" => p.teacher_name = value.to_string(),
                    "rating" => p.rating = parse_int(value),
                    "students_handled" => p.students_handled = parse_count(value),
                    "feedback" => p.feedback = value.to_string(),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    /// Checks the constraints the form declares (required fields and numeric
    /// ranges). No cross-field checks.
    pub fn validate(&self) -> Vec<ValidationError> {
        let d = &self.draft;
        let mut errors = Vec::new();

        if d.branch.name.trim().is_empty() {
            errors.push(ValidationError::Required("Branch name"));
        }
        if d.branch.location.trim().is_empty() {
            errors.push(ValidationError::Required("Location"));
        }
        if d.period.trim().is_empty() {
            errors.push(ValidationError::Required("Period"));
        }

        let attendance = d.statistics.attendance_percentage;
        if !(0..=100).contains(&attendance) {
            errors.push(ValidationError::OutOfRange {
                field: "Attendance %".into(),
                min: 0,
                max: 100,
                value: attendance.into(),
            });
        }

        for (i, p) in d.performances.iter().enumerate() {
            if !(1..=5).contains(&p.rating) {
                errors.push(ValidationError::OutOfRange {
                    field: format!("Rating for teacher #{}", i + 1),
                    min: 1,
                    max: 5,
                    value: p.rating.into(),
                });
            }
        }

        errors
    }

    /// Returns a frozen copy of the draft when it passes validation.
    pub fn submit(&self) -> Result<ReportData, Vec<ValidationError>> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self.draft.clone())
        } else {
            Err(errors)
        }
    }
}

/// Structural action posted alongside the form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    AddActivity,
    RemoveActivity(Uuid),
    AddPerformance,
    RemovePerformance(Uuid),
    Submit,
}

impl FormAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "add_activity" => return Some(FormAction::AddActivity),
            "add_performance" => return Some(FormAction::AddPerformance),
            "submit" => return Some(FormAction::Submit),
            _ => {}
        }
        let (verb, id) = raw.split_once(':')?;
        let id = Uuid::parse_str(id).ok()?;
        match verb {
            "remove_activity" => Some(FormAction::RemoveActivity(id)),
            "remove_performance" => Some(FormAction::RemovePerformance(id)),
            _ => None,
        }
    }

    /// Applies a structural action. `Submit` is handled by the caller.
    pub fn apply(self, editor: &mut FormEditor) {
        match self {
            FormAction::AddActivity => {
                editor.add_activity();
            }
            FormAction::RemoveActivity(id) => {
                if let Some(i) = editor.activity_index(id) {
                    editor.remove_activity(i);
                }
            }
            FormAction::AddPerformance => {
                editor.add_performance();
            }
            FormAction::RemovePerformance(id) => {
                if let Some(i) = editor.performance_index(id) {
                    editor.remove_performance(i);
                }
            }
            FormAction::Submit => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_editor() -> FormEditor {
        let mut e = FormEditor::new();
        e.update_branch_field(BranchField::Name, "North");
        e.update_branch_field(BranchField::Location, "Mombasa");
        e.update_period("March 2024");
        e.update_attendance("90");
        e
    }

    #[test]
    fn new_editor_is_all_defaults() {
        let e = FormEditor::new();
        let d = e.draft();
        assert!(d.branch.name.is_empty());
        assert_eq!(d.statistics.total_students(), 0);
        assert!(d.activities.is_empty());
        assert!(d.performances.is_empty());
        assert_eq!(d.report_type, ReportType::Monthly);
    }

    #[test]
    fn malformed_counts_coerce_to_zero() {
        let mut e = FormEditor::new();
        e.update_level_count(StudentLevel::Qaida, "12");
        assert_eq!(e.draft().statistics.students_per_level.qaida, 12);
        for bad in ["", "abc", "-4", "3.5", "  "] {
            e.update_level_count(StudentLevel::Qaida, bad);
            assert_eq!(e.draft().statistics.students_per_level.qaida, 0, "input {bad:?}");
        }
    }

    #[test]
    fn add_then_remove_restores_activities() {
        let mut e = FormEditor::new();
        e.add_activity();
        e.add_activity();
        let before = e.draft().activities.clone();

        e.add_activity();
        let last = e.draft().activities.len() - 1;
        e.remove_activity(last);
        assert_eq!(e.draft().activities, before);
    }

    #[test]
    fn remove_shifts_following_entries_down() {
        let mut e = FormEditor::new();
        let ids: Vec<Uuid> = (0..4).map(|_| e.add_activity()).collect();
        e.remove_activity(1);

        let remaining: Vec<Uuid> = e.draft().activities.iter().map(|a| a.id).collect();
        assert_eq!(remaining, vec![ids[0], ids[2], ids[3]]);
    }

    #[test]
    fn remove_performance_shifts_following_entries_down() {
        let mut e = FormEditor::new();
        let ids: Vec<Uuid> = (0..3).map(|_| e.add_performance()).collect();
        e.apply_field(&format!("performance.{}.teacher_name", ids[2]), "Ustadha Maryam");

        let removed = e.remove_performance(0).unwrap();
        assert_eq!(removed.id, ids[0]);

        let remaining: Vec<Uuid> = e.draft().performances.iter().map(|p| p.id).collect();
        assert_eq!(remaining, vec![ids[1], ids[2]]);
        assert_eq!(e.performance_index(ids[2]), Some(1));
        assert_eq!(e.draft().performances[1].teacher_name, "Ustadha Maryam");
    }

    #[test]
    fn out_of_range_remove_is_noop() {
        let mut e = FormEditor::new();
        e.add_performance();
        assert!(e.remove_performance(5).is_none());
        assert!(e.remove_activity(0).is_none());
        assert_eq!(e.draft().performances.len(), 1);
    }

    #[test]
    fn attendance_range_is_enforced_on_submit() {
        let mut e = valid_editor();
        e.update_attendance("101");
        let errs = e.submit().unwrap_err();
        assert!(matches!(&errs[..], [ValidationError::OutOfRange { value: 101, .. }]));

        e.update_attendance("100");
        assert!(e.submit().is_ok());
    }

    #[test]
    fn rating_range_is_enforced_on_submit() {
        let mut e = valid_editor();
        let id = e.add_performance();
        e.apply_field(&format!("performance.{id}.rating"), "0");
        assert!(e.submit().is_err());

        e.apply_field(&format!("performance.{id}.rating"), "1");
        assert!(e.submit().is_ok());
    }

    #[test]
    fn required_fields_block_submit() {
        let e = FormEditor::new();
        let errs = e.submit().unwrap_err();
        assert!(errs.contains(&ValidationError::Required("Branch name")));
        assert!(errs.contains(&ValidationError::Required("Location")));
        assert!(errs.contains(&ValidationError::Required("Period")));
    }

    #[test]
    fn apply_field_routes_nested_names() {
        let mut e = FormEditor::new();
        let a = e.add_activity();
        let p = e.add_performance();

        e.apply_field("level_QuranAndKitab", "6");
        e.apply_field("report_type", "yearly");
        e.apply_field(&format!("activity.{a}.title"), "Sports day");
        e.apply_field(&format!("activity.{a}.date"), "2024-03-15");
        e.apply_field(&format!("performance.{p}.teacher_name"), "Amina");
        e.apply_field(&format!("performance.{p}.students_handled"), "x");

        let d = e.draft();
        assert_eq!(d.statistics.students_per_level.quran_and_kitab, 6);
        assert_eq!(d.report_type, ReportType::Yearly);
        assert_eq!(d.activities[0].title, "Sports day");
        assert_eq!(d.activities[0].date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(d.performances[0].teacher_name, "Amina");
        assert_eq!(d.performances[0].students_handled, 0);
    }

    #[test]
    fn stale_ids_and_unknown_fields_are_ignored() {
        let mut e = FormEditor::new();
        let before = e.draft().clone();
        e.apply_field(&format!("activity.{}.title", Uuid::new_v4()), "ghost");
        e.apply_field("activity.not-a-uuid.title", "ghost");
        e.apply_field("nonsense", "1");
        e.apply_field("report_type", "weekly");
        assert_eq!(e.draft(), &before);
    }

    #[test]
    fn actions_parse_and_apply() {
        let mut e = FormEditor::new();
        FormAction::parse("add_activity").unwrap().apply(&mut e);
        let id = e.draft().activities[0].id;

        let action = FormAction::parse(&format!("remove_activity:{id}")).unwrap();
        assert_eq!(action, FormAction::RemoveActivity(id));
        action.apply(&mut e);
        assert!(e.draft().activities.is_empty());

        assert_eq!(FormAction::parse("submit"), Some(FormAction::Submit));
        assert_eq!(FormAction::parse("remove_activity:7"), None);
        assert_eq!(FormAction::parse("explode"), None);
    }
}
