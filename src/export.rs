// src/export.rs
//
// PDF export of a submitted report. Layout mirrors the export-mode HTML:
// same sections in the same order, Activities and Teacher Performance start
// on a fresh page, and blocks never split across pages.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use printpdf::lopdf::Document;
use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Rect, Rgb};

use crate::models::ReportData;
use crate::render::{format_generated_on, INSTITUTION_NAME, INSTITUTION_TAGLINE};

pub const EXPORT_FILENAME: &str = "ijtimaulkheir-report.pdf";

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_FACTOR: f32 = 0.45; // mm of line height per pt of font size
const CHART_H: f32 = 60.0;

const GREEN: (f32, f32, f32) = (0.016, 0.471, 0.341);
const BAR: (f32, f32, f32) = (0.020, 0.588, 0.412);
const TEXT: (f32, f32, f32) = (0.067, 0.094, 0.153);
const MUTED: (f32, f32, f32) = (0.420, 0.447, 0.502);
const RULE: (f32, f32, f32) = (0.898, 0.906, 0.922);

fn rgb((r, g, b): (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

/// Greedy word wrap by character budget. Built-in fonts carry no metrics we
/// can query, so width is approximated from the font size.
fn wrap(text: &str, size: f32, width_mm: f32) -> Vec<String> {
    let max_chars = ((width_mm / (size * 0.19)).floor() as usize).max(8);
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            while word.chars().count() > max_chars {
                if !line.is_empty() {
                    out.push(std::mem::take(&mut line));
                }
                let head: String = word.chars().take(max_chars).collect();
                word = word.chars().skip(max_chars).collect();
                out.push(head);
            }
            let needed = if line.is_empty() { word.chars().count() } else { line.chars().count() + 1 + word.chars().count() };
            if needed > max_chars && !line.is_empty() {
                out.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        out.push(line);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

/// Built-in fonts only cover WinAnsi; anything else is silently dropped by
/// the encoder, so check before drawing.
fn win_ansi_encodable(text: &str) -> bool {
    Document::encode_text(Some("WinAnsiEncoding"), text).len() == text.chars().count()
}

/// Cursor-based page writer; `y` runs top-down in mm from the top edge.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    builtin: bool,
    /// Set once any line could not be encoded in the built-in font.
    lost_glyphs: bool,
    y: f32,
    pages: usize,
}

impl PageWriter {
    /// Uses `font` (TrueType bytes) for all text when given, Helvetica otherwise.
    fn new(title: &str, font: Option<&[u8]>) -> anyhow::Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let (regular, bold) = match font {
            Some(bytes) => {
                let f = doc.add_external_font(bytes).context("load embedded font")?;
                (f.clone(), f)
            }
            None => (
                doc.add_builtin_font(BuiltinFont::Helvetica).context("load Helvetica")?,
                doc.add_builtin_font(BuiltinFont::HelveticaBold).context("load Helvetica-Bold")?,
            ),
        };
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self { doc, layer, regular, bold, builtin: font.is_none(), lost_glyphs: false, y: MARGIN, pages: 1 })
    }

    fn content_width(&self) -> f32 {
        PAGE_W - 2.0 * MARGIN
    }

    fn remaining(&self) -> f32 {
        PAGE_H - MARGIN - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = MARGIN;
        self.pages += 1;
    }

    /// Moves to a new page unless `height` mm still fit on this one.
    fn ensure(&mut self, height: f32) {
        if height > self.remaining() && self.y > MARGIN {
            self.new_page();
        }
    }

    fn line_height(size: f32) -> f32 {
        size * LINE_FACTOR
    }

    fn text_at(&mut self, text: &str, size: f32, x: f32, y_top: f32, bold: bool, color: (f32, f32, f32)) {
        if self.builtin && !win_ansi_encodable(text) {
            self.lost_glyphs = true;
        }
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.set_fill_color(rgb(color));
        // baseline sits roughly 80% down the line box
        let baseline = PAGE_H - (y_top + Self::line_height(size) * 0.8);
        self.layer.use_text(text, size, Mm(x), Mm(baseline), font);
    }

    fn text_centered(&mut self, text: &str, size: f32, bold: bool, color: (f32, f32, f32)) {
        for line in wrap(text, size, self.content_width()) {
            let approx_w = line.chars().count() as f32 * size * 0.19;
            let x = MARGIN + ((self.content_width() - approx_w) / 2.0).max(0.0);
            self.ensure(Self::line_height(size));
            self.text_at(&line, size, x, self.y, bold, color);
            self.y += Self::line_height(size);
        }
    }

    fn paragraph(&mut self, text: &str, size: f32, indent: f32, bold: bool, color: (f32, f32, f32)) {
        for line in wrap(text, size, self.content_width() - indent) {
            self.ensure(Self::line_height(size));
            self.text_at(&line, size, MARGIN + indent, self.y, bold, color);
            self.y += Self::line_height(size);
        }
    }

    fn rect(&self, x: f32, y_top: f32, w: f32, h: f32, color: (f32, f32, f32)) {
        self.layer.set_fill_color(rgb(color));
        self.layer.add_rect(Rect::new(Mm(x), Mm(PAGE_H - y_top - h), Mm(x + w), Mm(PAGE_H - y_top)));
    }

    fn rule(&mut self) {
        self.rect(MARGIN, self.y, self.content_width(), 0.3, RULE);
        self.y += 3.0;
    }

    fn gap(&mut self, mm: f32) {
        self.y += mm;
    }

    fn heading(&mut self, text: &str) {
        self.ensure(Self::line_height(14.0) + 10.0);
        self.paragraph(text, 14.0, 0.0, true, GREEN);
        self.gap(2.0);
    }

    fn finish(self) -> anyhow::Result<Vec<u8>> {
        self.doc.save_to_bytes().context("serialize pdf")
    }
}

/// Estimated height of a wrapped paragraph, for keep-together checks.
fn paragraph_height(text: &str, size: f32, width: f32) -> f32 {
    wrap(text, size, width).len() as f32 * PageWriter::line_height(size)
}

/// Renders the report as PDF bytes. `font` is an optional TrueType font used
/// for every line; without it, text the built-in font cannot show is an error
/// rather than a silently incomplete document.
pub fn export_pdf(report: &ReportData, generated_on: NaiveDate, font: Option<&[u8]>) -> anyhow::Result<Vec<u8>> {
    let w = lay_out(report, generated_on, font)?;
    if w.lost_glyphs {
        bail!("report text has characters the built-in PDF font cannot show; set PDF_FONT_PATH to a Unicode TrueType font");
    }
    tracing::debug!(pages = w.pages, "pdf laid out");
    w.finish()
}

fn lay_out(report: &ReportData, generated_on: NaiveDate, font: Option<&[u8]>) -> anyhow::Result<PageWriter> {
    let title = report.title();
    let mut w = PageWriter::new(&title, font)?;

    // header
    w.text_centered(INSTITUTION_NAME, 16.0, true, TEXT);
    w.text_centered(INSTITUTION_TAGLINE, 10.0, false, MUTED);
    w.text_centered(&title, 13.0, false, GREEN);
    w.text_centered(&report.branch.location, 10.0, false, MUTED);
    w.gap(2.0);
    w.rule();

    // branch information + key statistics
    w.heading("Branch Information");
    w.paragraph(&format!("Name: {}", report.branch.name), 11.0, 0.0, false, TEXT);
    w.paragraph(&format!("Location: {}", report.branch.location), 11.0, 0.0, false, TEXT);
    w.gap(4.0);

    let stats = &report.statistics;
    w.heading("Key Statistics");
    w.paragraph(&format!("Total Students: {}", stats.total_students()), 11.0, 0.0, false, TEXT);
    w.paragraph(&format!("Teachers: {}", stats.teachers), 11.0, 0.0, false, TEXT);
    w.paragraph(&format!("Attendance: {}%", stats.attendance_percentage), 11.0, 0.0, false, TEXT);
    w.gap(4.0);

    // student distribution
    w.ensure(CHART_H + 25.0);
    w.heading("Student Distribution");
    draw_chart(&mut w, report);
    w.gap(6.0);

    // activities
    w.new_page();
    w.heading("Activities & Achievements");
    for a in &report.activities {
        let width = w.content_width() - 4.0;
        let date = a.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        let h = PageWriter::line_height(9.0)
            + paragraph_height(&a.title, 12.0, width)
            + paragraph_height(&a.description, 10.0, width)
            + 6.0;
        w.ensure(h);
        w.paragraph(&date, 9.0, 4.0, false, MUTED);
        w.paragraph(&a.title, 12.0, 4.0, true, TEXT);
        w.paragraph(&a.description, 10.0, 4.0, false, TEXT);
        w.gap(2.0);
        w.rule();
    }

    // teacher performance
    w.new_page();
    w.heading("Teacher Performance");
    for p in &report.performances {
        let width = w.content_width() - 4.0;
        let h = paragraph_height(&p.teacher_name, 12.0, width)
            + 2.0 * PageWriter::line_height(10.0)
            + paragraph_height(&p.feedback, 10.0, width)
            + 6.0;
        w.ensure(h);
        w.paragraph(&p.teacher_name, 12.0, 4.0, true, TEXT);
        w.paragraph(&format!("Rating: {}/5", p.rating), 10.0, 4.0, false, MUTED);
        w.paragraph(&format!("Students: {}", p.students_handled), 10.0, 4.0, false, MUTED);
        w.paragraph(&p.feedback, 10.0, 4.0, false, TEXT);
        w.gap(2.0);
        w.rule();
    }

    if report.has_feedback() {
        let h = paragraph_height(&report.feedback, 10.0, w.content_width()) + 14.0;
        w.ensure(h);
        w.gap(4.0);
        w.heading("Additional Feedback");
        w.paragraph(&report.feedback, 10.0, 0.0, false, TEXT);
    }

    // footer
    w.ensure(25.0);
    w.gap(8.0);
    w.rule();
    w.text_centered(INSTITUTION_NAME, 10.0, true, GREEN);
    w.text_centered(&format!("Generated on {}", format_generated_on(generated_on)), 9.0, false, MUTED);
    w.text_centered(&format!("{INSTITUTION_TAGLINE} - {}", report.branch.location), 8.0, false, MUTED);

    Ok(w)
}

fn draw_chart(w: &mut PageWriter, report: &ReportData) {
    let counts: Vec<_> = report.statistics.students_per_level.iter().collect();
    let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1);
    let slot = w.content_width() / counts.len() as f32;
    let bar_w = slot * 0.6;
    let top = w.y;
    let baseline = top + CHART_H;

    for (i, (level, count)) in counts.iter().enumerate() {
        let h = CHART_H * (*count as f32) / max as f32;
        let x = MARGIN + slot * i as f32 + (slot - bar_w) / 2.0;
        if h > 0.0 {
            w.rect(x, baseline - h, bar_w, h, BAR);
        }
        let value = count.to_string();
        w.text_at(&value, 9.0, x + bar_w / 2.0 - value.len() as f32 * 0.9, baseline - h - 5.0, false, TEXT);
        let label = level.label();
        let lx = MARGIN + slot * i as f32 + ((slot - label.len() as f32 * 1.8) / 2.0).max(0.0);
        w.text_at(label, 9.0, lx, baseline + 1.5, false, MUTED);
    }
    w.rect(MARGIN, baseline, w.content_width(), 0.3, RULE);
    w.y = baseline + 8.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, Performance, StudentLevel};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
    }

    #[test]
    fn wrap_respects_budget_and_paragraphs() {
        let lines = wrap("alpha beta gamma delta epsilon", 10.0, 20.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "alpha beta gamma delta epsilon");

        assert_eq!(wrap("a\nb", 10.0, 170.0), vec!["a", "b"]);
        assert_eq!(wrap("", 10.0, 170.0), vec![""]);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let word = "x".repeat(30);
        let lines = wrap(&word, 10.0, 20.0);
        assert_eq!(lines.concat(), word);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn produces_a_pdf_document() {
        let mut r = ReportData::default();
        r.branch.name = "Central".into();
        r.branch.location = "Nairobi".into();
        r.period = "March 2024".into();
        r.statistics.students_per_level.set(StudentLevel::Quran, 9);
        r.feedback = "Well done".into();
        let bytes = export_pdf(&r, day(), None).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn latin1_text_fits_the_builtin_font() {
        assert!(win_ansi_encodable("Café – “Nairobi” €5"));
        assert!(!win_ansi_encodable("مدرسة النور"));

        let mut r = ReportData::default();
        r.branch.name = "Café Süd".into();
        assert!(export_pdf(&r, day(), None).is_ok());
    }

    #[test]
    fn non_latin_text_without_a_font_is_an_error() {
        let mut r = ReportData::default();
        r.branch.name = "مدرسة النور".into();
        r.period = "March 2024".into();
        assert!(export_pdf(&r, day(), None).is_err());

        let mut r = ReportData::default();
        let mut p = Performance::empty();
        p.teacher_name = "Ustadh Ali".into();
        p.feedback = "ممتاز".into();
        r.performances = vec![p];
        assert!(export_pdf(&r, day(), None).is_err());
    }

    #[test]
    fn embedded_font_carries_non_latin_text() {
        // any Unicode TrueType font will do; skip where none is installed
        let Ok(font) = std::fs::read("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf") else {
            return;
        };
        let mut r = ReportData::default();
        r.branch.name = "مدرسة النور".into();
        let w = lay_out(&r, day(), Some(font.as_slice())).unwrap();
        assert!(!w.lost_glyphs);
        let bytes = export_pdf(&r, day(), Some(font.as_slice())).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn centered_lines_wrap_to_the_page() {
        let mut w = PageWriter::new("t", None).unwrap();
        let start = w.y;
        w.text_centered("Short", 10.0, false, TEXT);
        assert!((w.y - start - PageWriter::line_height(10.0)).abs() < 1e-3);

        let start = w.y;
        w.text_centered(&"Very long branch location ".repeat(10), 10.0, false, TEXT);
        let lines = ((w.y - start) / PageWriter::line_height(10.0)).round() as usize;
        assert!(lines > 1, "{lines}");
    }

    #[test]
    fn long_lists_spill_onto_more_pages() {
        let mut r = ReportData::default();
        r.activities = (0..40)
            .map(|i| {
                let mut a = Activity::empty();
                a.title = format!("Activity {i}");
                a.description = "Line of description text. ".repeat(8);
                a
            })
            .collect();
        r.performances = vec![Performance::empty()];
        let small = lay_out(&ReportData::default(), day(), None).unwrap();
        let large = lay_out(&r, day(), None).unwrap();
        // header page, activities page, performance page
        assert_eq!(small.pages, 3);
        assert!(large.pages > small.pages);
    }
}
