//! Page margin check
//!
//! The content extent of a page is the union of every non-blank text span
//! and every graphic object, minus the printed page number (a footer number
//! sits inside the bottom margin by design and must not count as content).
//! Distances from the page edges to that union are compared against the
//! required margins of the reading orientation.
//!
//! Left and top must match their requirement within tolerance in both
//! directions. Right and bottom only fail when too narrow: a short last line
//! or a half-empty page leaves a wide right/bottom margin legitimately.

use super::page_numbers::candidate_boxes;
use super::{page_mut, place_annotation, CheckKind, CheckOutcome, Checker, SERVICE_TITLE};
use crate::config::{ComplianceConfig, MarginConfig, PageNumberConfig};
use crate::document::{DocumentModel, Orientation, PageModel};
use crate::error::CheckError;
use crate::layout::reading_side;
use crate::patterns::{format_pages, plural_ru};
use crate::units::{pt_to_cm, round2};
use shared_types::{
    AnnotationRequest, ComplianceReport, Geometry, MarginSide, Point, Rect, Violation,
    ViolationKind,
};

const PAGE_LOCATIVE_FORMS: (&str, &str, &str) = ("странице", "страницах", "страницах");

/// One side of one page, measured and judged
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideMeasurement {
    /// Side in reading orientation
    pub side: MarginSide,
    pub actual_pt: f64,
    pub required_pt: f64,
    pub ok: bool,
}

pub struct MarginChecker {
    margins: MarginConfig,
    page_numbers: PageNumberConfig,
}

impl MarginChecker {
    pub fn new(config: &ComplianceConfig) -> Self {
        Self {
            margins: config.margins.clone(),
            page_numbers: config.page_numbers.clone(),
        }
    }

    /// Union of all content boxes, page number excluded
    pub fn content_extent(&self, page: &dyn PageModel) -> Option<Rect> {
        let numbers = candidate_boxes(page, &self.page_numbers);
        let mut boxes: Vec<Rect> = page
            .spans()
            .into_iter()
            .filter(|s| !s.is_blank())
            .map(|s| s.bbox)
            .filter(|b| !numbers.contains(b))
            .collect();
        boxes.extend(page.image_boxes());
        boxes.extend(page.drawing_boxes());
        Rect::union_all(&boxes)
    }

    /// Measure the four margins of `extent` in reading orientation
    pub fn measure(&self, page: &dyn PageModel, extent: &Rect) -> Vec<SideMeasurement> {
        let orientation = page.orientation();
        let physical = [
            (MarginSide::Left, extent.x0),
            (MarginSide::Right, page.width() - extent.x1),
            (MarginSide::Top, extent.y0),
            (MarginSide::Bottom, page.height() - extent.y1),
        ];

        let mut measured: Vec<SideMeasurement> = physical
            .iter()
            .map(|(side, actual)| {
                let side = reading_side(orientation, *side);
                let required = self.margins.required_pt(side);
                let tolerance = self.margins.tolerance_pt;
                let ok = match side {
                    MarginSide::Left | MarginSide::Top => (actual - required).abs() <= tolerance,
                    MarginSide::Right | MarginSide::Bottom => *actual >= required - tolerance,
                };
                SideMeasurement {
                    side,
                    actual_pt: *actual,
                    required_pt: required,
                    ok,
                }
            })
            .collect();
        measured.sort_by_key(|m| MarginSide::ALL.iter().position(|s| *s == m.side));
        measured
    }
}

impl Checker for MarginChecker {
    fn kind(&self) -> CheckKind {
        CheckKind::Margins
    }

    fn check(&self, document: &mut dyn DocumentModel) -> Result<CheckOutcome, CheckError> {
        let mut violations = Vec::new();
        let mut admin_lines = Vec::new();
        let mut landscape_pages = Vec::new();
        let mut error_pages = Vec::new();

        for index in 0..document.page_count() {
            let page_no = (index + 1) as u32;
            let page = page_mut(document, index)?;

            if page.orientation() == Orientation::Landscape {
                landscape_pages.push(page_no);
                let anchor = Point::new(40.0, 40.0);
                place_annotation(
                    page,
                    page_no,
                    AnnotationRequest::new(anchor, SERVICE_TITLE, "Неверная ориентация страницы"),
                    anchor,
                );
                violations.push(Violation {
                    kind: ViolationKind::LandscapeOrientation,
                    page: page_no,
                    geometry: Geometry::Point(anchor),
                    user_message: "Альбомная ориентация страницы".to_string(),
                    admin_message: format!(
                        "page_{}: альбомная ориентация ({:.1}×{:.1} pt)",
                        page_no,
                        page.width(),
                        page.height()
                    ),
                });
            }

            let Some(extent) = self.content_extent(&*page) else {
                admin_lines.push(format!("page_{}: Нет содержимого для анализа.", page_no));
                continue;
            };

            let measurements = self.measure(&*page, &extent);
            for m in &measurements {
                admin_lines.push(format!(
                    "page_{}, {}: {} см (норма: {} см) — {}",
                    page_no,
                    m.side.key(),
                    round2(pt_to_cm(m.actual_pt)),
                    round2(pt_to_cm(m.required_pt)),
                    if m.ok { "OK" } else { "FAIL" }
                ));
            }

            let failing: Vec<&SideMeasurement> = measurements.iter().filter(|m| !m.ok).collect();
            if failing.is_empty() {
                continue;
            }
            error_pages.push(page_no);

            let mut body = String::from("Поля оформлены неверно:");
            for m in &failing {
                let actual_cm = round2(pt_to_cm(m.actual_pt));
                let required_cm = round2(pt_to_cm(m.required_pt));
                body.push_str(&format!(
                    "\n{}: {} см (норма: {} см)",
                    m.side.label_ru(),
                    actual_cm,
                    required_cm
                ));
                violations.push(Violation {
                    kind: ViolationKind::Margin {
                        side: m.side,
                        actual_cm,
                        required_cm,
                    },
                    page: page_no,
                    geometry: Geometry::Box(extent),
                    user_message: format!(
                        "Поле {} {} см, требуется {} см",
                        m.side.label_ru(),
                        actual_cm,
                        required_cm
                    ),
                    admin_message: format!(
                        "page_{}, {}: {} см (норма: {} см) — FAIL",
                        page_no,
                        m.side.key(),
                        actual_cm,
                        required_cm
                    ),
                });
            }

            let anchor = Point::new(40.0, 80.0);
            place_annotation(
                page,
                page_no,
                AnnotationRequest::new(anchor, SERVICE_TITLE, body),
                anchor,
            );
        }

        tracing::info!(
            pages_with_errors = error_pages.len(),
            landscape = landscape_pages.len(),
            "margin check finished"
        );

        Ok(CheckOutcome {
            report: ComplianceReport::new(
                user_summary(&error_pages, &landscape_pages),
                admin_lines.join("\n"),
            ),
            violations,
        })
    }
}

fn user_summary(error_pages: &[u32], landscape_pages: &[u32]) -> String {
    if error_pages.is_empty() && landscape_pages.is_empty() {
        return "✅ Все поля на всех страницах соответствуют требованиям.".to_string();
    }

    let mut lines = Vec::new();
    if !error_pages.is_empty() {
        let n = error_pages.len();
        lines.push(format!(
            "⚠️ Требования к полям нарушены на {} {}: {}.",
            n,
            plural_ru(n, PAGE_LOCATIVE_FORMS),
            format_pages(error_pages)
        ));
    }
    if !landscape_pages.is_empty() {
        let failed: Vec<u32> = landscape_pages
            .iter()
            .copied()
            .filter(|p| error_pages.contains(p))
            .collect();
        let note = if failed.is_empty() {
            "поля на них соответствуют требованиям".to_string()
        } else {
            format!("из них с нарушением полей: {}", format_pages(&failed))
        };
        lines.push(format!(
            "⚠️ Обнаружены альбомные страницы: {} ({}).",
            format_pages(landscape_pages),
            note
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::rules::test_support::{a4, a4_landscape, body_span, page_number_span, times};
    use crate::units::{cm_to_pt, mm_to_pt};
    use pretty_assertions::assert_eq;

    fn checker() -> MarginChecker {
        MarginChecker::new(&ComplianceConfig::default())
    }

    fn margin_sides(outcome: &CheckOutcome) -> Vec<MarginSide> {
        outcome
            .violations
            .iter()
            .filter_map(|v| match v.kind {
                ViolationKind::Margin { side, .. } => Some(side),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_exact_margins_pass() {
        let mut doc = MemoryDocument::new(vec![a4().with_line(vec![body_span("Текст")])]);
        let outcome = checker().check(&mut doc).unwrap();
        assert!(outcome.violations.is_empty());
        assert!(doc.pages[0].annotations.is_empty());
        assert!(outcome.report.user_summary.starts_with("✅"));
    }

    #[test]
    fn test_shift_left_fails_only_left() {
        let mut span = body_span("Текст");
        span.bbox.x0 -= mm_to_pt(5.0);
        span.bbox.x1 -= mm_to_pt(5.0);
        let mut doc = MemoryDocument::new(vec![a4().with_line(vec![span])]);
        let outcome = checker().check(&mut doc).unwrap();
        assert_eq!(margin_sides(&outcome), vec![MarginSide::Left]);
        assert_eq!(doc.pages[0].annotations.len(), 1);
        assert!(doc.pages[0].annotations[0].body.contains("левое: 2.5 см"));
    }

    #[test]
    fn test_wide_right_and_bottom_margins_are_accepted() {
        let mut span = body_span("Короткая страница");
        span.bbox.x1 -= cm_to_pt(5.0);
        span.bbox.y1 -= cm_to_pt(10.0);
        let mut doc = MemoryDocument::new(vec![a4().with_line(vec![span])]);
        let outcome = checker().check(&mut doc).unwrap();
        assert!(outcome.violations.is_empty());
    }

    #[test]
    fn test_wide_left_margin_fails() {
        let mut span = body_span("Текст");
        span.bbox.x0 += cm_to_pt(1.0);
        let mut doc = MemoryDocument::new(vec![a4().with_line(vec![span])]);
        let outcome = checker().check(&mut doc).unwrap();
        assert_eq!(margin_sides(&outcome), vec![MarginSide::Left]);
    }

    #[test]
    fn test_page_number_does_not_count_as_content() {
        let mut doc = MemoryDocument::new(vec![
            a4(),
            a4().with_line(vec![body_span("Текст")])
                .with_line(vec![page_number_span("2", 0.0)]),
        ]);
        let outcome = checker().check(&mut doc).unwrap();
        assert!(outcome.violations.is_empty());
        assert!(outcome.report.admin_details.contains("page_1: Нет содержимого"));
    }

    #[test]
    fn test_blank_spans_are_ignored() {
        let stray = times("   ", Rect::new(5.0, 5.0, 20.0, 15.0));
        let mut doc = MemoryDocument::new(vec![a4()
            .with_line(vec![body_span("Текст")])
            .with_line(vec![stray])]);
        let outcome = checker().check(&mut doc).unwrap();
        assert!(outcome.violations.is_empty());
    }

    #[test]
    fn test_image_extends_content() {
        let mut doc = MemoryDocument::new(vec![a4()
            .with_line(vec![body_span("Текст")])
            .with_image(Rect::new(10.0, 300.0, 200.0, 400.0))]);
        let outcome = checker().check(&mut doc).unwrap();
        assert_eq!(margin_sides(&outcome), vec![MarginSide::Left]);
    }

    #[test]
    fn test_landscape_page_remaps_and_is_reported() {
        // content placed to satisfy the rotated margins
        let page = a4_landscape();
        let (w, h) = (page.width, page.height);
        let span = times(
            "Таблица",
            Rect::new(cm_to_pt(2.0), cm_to_pt(3.0), w - cm_to_pt(2.0), h - cm_to_pt(1.5)),
        );
        let mut doc = MemoryDocument::new(vec![page.with_line(vec![span])]);
        let outcome = checker().check(&mut doc).unwrap();
        assert_eq!(margin_sides(&outcome), Vec::<MarginSide>::new());
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].kind, ViolationKind::LandscapeOrientation);
        assert!(outcome
            .report
            .user_summary
            .contains("альбомные страницы: 1 (поля на них соответствуют требованиям)"));
    }

    #[test]
    fn test_landscape_page_with_portrait_margins_fails() {
        // portrait-style placement measured on a landscape sheet
        let page = a4_landscape();
        let (w, h) = (page.width, page.height);
        let span = times(
            "Текст",
            Rect::new(cm_to_pt(3.0), cm_to_pt(2.0), w - cm_to_pt(1.5), h - cm_to_pt(2.0)),
        );
        let mut doc = MemoryDocument::new(vec![page.with_line(vec![span])]);
        let outcome = checker().check(&mut doc).unwrap();
        let sides = margin_sides(&outcome);
        assert!(sides.contains(&MarginSide::Left));
        assert!(sides.contains(&MarginSide::Top));
        assert!(outcome.report.user_summary.contains("из них с нарушением полей: 1"));
    }

    #[test]
    fn test_summary_agrees_in_number() {
        assert_eq!(
            user_summary(&[1, 2, 3, 4, 5], &[]),
            "⚠️ Требования к полям нарушены на 5 страницах: 1, 2, 3, 4, 5."
        );
        assert_eq!(
            user_summary(&[7], &[]),
            "⚠️ Требования к полям нарушены на 1 странице: 7."
        );
    }
}
