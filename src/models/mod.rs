// src/models/mod.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ───────────────────────────────────────
// Levels & report types
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudentLevel {
    Qaida,
    Quran,
    QuranAndKitab,
    Hifz,
}

impl StudentLevel {
    pub const ALL: [StudentLevel; 4] = [
        StudentLevel::Qaida,
        StudentLevel::Quran,
        StudentLevel::QuranAndKitab,
        StudentLevel::Hifz,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StudentLevel::Qaida => "Qaida",
            StudentLevel::Quran => "Quran",
            StudentLevel::QuranAndKitab => "Quran and Kitab",
            StudentLevel::Hifz => "Hifz",
        }
    }

    /// Stable identifier used in form field names.
    pub fn key(self) -> &'static str {
        match self {
            StudentLevel::Qaida => "Qaida",
            StudentLevel::Quran => "Quran",
            StudentLevel::QuranAndKitab => "QuranAndKitab",
            StudentLevel::Hifz => "Hifz",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl ReportType {
    pub const ALL: [ReportType; 3] = [ReportType::Monthly, ReportType::Quarterly, ReportType::Yearly];

    pub fn key(self) -> &'static str {
        match self {
            ReportType::Monthly => "monthly",
            ReportType::Quarterly => "quarterly",
            ReportType::Yearly => "yearly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportType::Monthly => "Monthly",
            ReportType::Quarterly => "Quarterly",
            ReportType::Yearly => "Yearly",
        }
    }

    /// Example period for the form placeholder.
    pub fn period_placeholder(self) -> &'static str {
        match self {
            ReportType::Monthly => "March 2024",
            ReportType::Quarterly => "Q1 2024",
            ReportType::Yearly => "2024",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

// ───────────────────────────────────────
// Report aggregate
// ───────────────────────────────────────
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchDetails {
    pub name: String,
    pub location: String,
}

/// One count per level. Every level always has an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LevelCounts {
    pub qaida: u32,
    pub quran: u32,
    pub quran_and_kitab: u32,
    pub hifz: u32,
}

impl LevelCounts {
    pub fn get(&self, level: StudentLevel) -> u32 {
        match level {
            StudentLevel::Qaida => self.qaida,
            StudentLevel::Quran => self.quran,
            StudentLevel::QuranAndKitab => self.quran_and_kitab,
            StudentLevel::Hifz => self.hifz,
        }
    }

    pub fn set(&mut self, level: StudentLevel, count: u32) {
        match level {
            StudentLevel::Qaida => self.qaida = count,
            StudentLevel::Quran => self.quran = count,
            StudentLevel::QuranAndKitab => self.quran_and_kitab = count,
            StudentLevel::Hifz => self.hifz = count,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StudentLevel, u32)> + '_ {
        StudentLevel::ALL.into_iter().map(move |l| (l, self.get(l)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub students_per_level: LevelCounts,
    pub teachers: u32,
    pub attendance_percentage: i32, // 0..=100 enforced on submit
}

impl Statistics {
    /// Sum over every level. Always computed, never stored.
    pub fn total_students(&self) -> u64 {
        self.students_per_level.iter().map(|(_, n)| u64::from(n)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(skip_serializing, default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub description: String,
}

impl Activity {
    pub fn empty() -> Self {
        Self { id: Uuid::new_v4(), title: String::new(), date: None, description: String::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    #[serde(skip_serializing, default = "Uuid::new_v4")]
    pub id: Uuid,
    pub teacher_name: String,
    pub rating: i32, // 1..=5 enforced on submit
    pub feedback: String,
    pub students_handled: u32,
}

impl Performance {
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            teacher_name: String::new(),
            rating: 0,
            feedback: String::new(),
            students_handled: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub branch: BranchDetails,
    pub statistics: Statistics,
    pub activities: Vec<Activity>,
    pub performances: Vec<Performance>,
    pub feedback: String, // empty means no additional feedback
    pub report_type: ReportType,
    pub period: String,
}

impl ReportData {
    pub fn has_feedback(&self) -> bool {
        !self.feedback.is_empty()
    }

    /// "Quarterly Report - Q1 2024"
    pub fn title(&self) -> String {
        format!("{} Report - {}", self.report_type.label(), self.period)
    }
}

// ───────────────────────────────────────
// JSON view with the derived total
// ───────────────────────────────────────
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsView<'a> {
    pub total_students: u64,
    #[serde(flatten)]
    pub inner: &'a Statistics,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView<'a> {
    pub branch: &'a BranchDetails,
    pub statistics: StatisticsView<'a>,
    pub activities: &'a [Activity],
    pub performances: &'a [Performance],
    pub feedback: &'a str,
    pub report_type: ReportType,
    pub period: &'a str,
}

impl<'a> From<&'a ReportData> for ReportView<'a> {
    fn from(r: &'a ReportData) -> Self {
        ReportView {
            branch: &r.branch,
            statistics: StatisticsView { total_students: r.statistics.total_students(), inner: &r.statistics },
            activities: &r.activities,
            performances: &r.performances,
            feedback: &r.feedback,
            report_type: r.report_type,
            period: &r.period,
        }
    }
}
