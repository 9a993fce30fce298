//! Formatting rules checked against a paginated document
//!
//! Each checker walks every page once, places markers on the pages it finds
//! at fault and returns its findings. Checkers are independent; the engine
//! runs them in [`CheckKind::ORDER`].

pub mod double_spaces;
pub mod graphics;
pub mod margins;
pub mod page_numbers;
pub mod quotes;
pub mod tables;

pub use double_spaces::DoubleSpaceChecker;
pub use graphics::GraphicsChecker;
pub use margins::MarginChecker;
pub use page_numbers::PageNumberChecker;
pub use quotes::QuoteChecker;
pub use tables::{LayoutTables, TableChecker, TableDetector};

use crate::document::{DocumentModel, PageModel};
use crate::error::{CheckError, ModelError};
use crate::patterns::{count_phrase, format_pages, VIOLATION_FORMS};
use serde::{Deserialize, Serialize};
use shared_types::{AnnotationRequest, ComplianceReport, Point, Violation};

/// Title used for every marker that is not quote-specific
pub const SERVICE_TITLE: &str = "Сервис нормоконтроля";

/// The six checks, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Quotes,
    Margins,
    PageNumbers,
    DoubleSpaces,
    Graphics,
    Tables,
}

impl CheckKind {
    pub const ORDER: [CheckKind; 6] = [
        CheckKind::Quotes,
        CheckKind::Margins,
        CheckKind::PageNumbers,
        CheckKind::DoubleSpaces,
        CheckKind::Graphics,
        CheckKind::Tables,
    ];

    /// Section title in both digests
    pub fn title(self) -> &'static str {
        match self {
            CheckKind::Quotes => "Кавычки",
            CheckKind::Margins => "Поля",
            CheckKind::PageNumbers => "Нумерация страниц",
            CheckKind::DoubleSpaces => "Двойные пробелы",
            CheckKind::Graphics => "Изображения",
            CheckKind::Tables => "Таблицы",
        }
    }
}

/// Findings of one checker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub report: ComplianceReport,
    pub violations: Vec<Violation>,
}

impl CheckOutcome {
    /// Sorted, deduplicated pages with at least one violation
    pub fn affected_pages(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self.violations.iter().map(|v| v.page).collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }
}

/// A single formatting rule
pub trait Checker {
    fn kind(&self) -> CheckKind;

    /// Inspect every page, annotate violations, report findings
    fn check(&self, document: &mut dyn DocumentModel) -> Result<CheckOutcome, CheckError>;
}

pub(crate) fn page_mut(
    document: &mut dyn DocumentModel,
    index: usize,
) -> Result<&mut dyn PageModel, CheckError> {
    document
        .page_mut(index)
        .ok_or(CheckError::Model(ModelError::PageOutOfRange(index + 1)))
}

/// Deterministic spot near the top-right corner used when a violation
/// cannot be located precisely. `slot` spreads markers vertically.
pub(crate) fn fallback_anchor(page: &dyn PageModel, slot: usize) -> Point {
    Point::new(page.width() - 100.0, 50.0 + (slot % 10) as f64 * 20.0)
}

/// Place a marker, retrying at `fallback` if the engine rejects the anchor
///
/// Returns the point the marker ended up at, or `None` if both placements
/// failed. The violation itself is kept by the caller either way.
pub(crate) fn place_annotation(
    page: &mut dyn PageModel,
    page_no: u32,
    request: AnnotationRequest,
    fallback: Point,
) -> Option<Point> {
    let anchor = request.anchor;
    let retry = AnnotationRequest {
        anchor: fallback,
        ..request.clone()
    };
    match page.annotate(request) {
        Ok(()) => Some(anchor),
        Err(e) => {
            tracing::warn!(page = page_no, error = %e, "annotation rejected, using fallback marker");
            match page.annotate(retry) {
                Ok(()) => Some(fallback),
                Err(e) => {
                    let failure = CheckError::Annotation {
                        page: page_no,
                        reason: e.to_string(),
                    };
                    tracing::error!(error = %failure, "fallback annotation failed, violation kept unmarked");
                    None
                }
            }
        }
    }
}

/// One-line user summary: a check mark when clean, counts and pages otherwise
pub(crate) fn summary_line(clean: &str, subject: &str, violations: &[Violation]) -> String {
    if violations.is_empty() {
        return format!("✅ {}", clean);
    }
    let mut pages: Vec<u32> = violations.iter().map(|v| v.page).collect();
    pages.sort_unstable();
    pages.dedup();
    format!(
        "⚠️ {}: обнаружено {} на страницах: {}.",
        subject,
        count_phrase(violations.len(), VIOLATION_FORMS),
        format_pages(&pages)
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::document::{MemoryPage, TextSpan};
    use crate::units::cm_to_pt;
    use shared_types::Rect;

    pub const A4_WIDTH: f64 = 595.28;
    pub const A4_HEIGHT: f64 = 841.89;

    pub fn a4() -> MemoryPage {
        MemoryPage::new(A4_WIDTH, A4_HEIGHT)
    }

    pub fn a4_landscape() -> MemoryPage {
        MemoryPage::new(A4_HEIGHT, A4_WIDTH)
    }

    pub fn times(text: &str, bbox: Rect) -> TextSpan {
        TextSpan::new(text, bbox, "TimesNewRomanPSMT", 12.0)
    }

    /// Body span exactly filling the portrait working area
    pub fn body_span(text: &str) -> TextSpan {
        times(
            text,
            Rect::new(
                cm_to_pt(3.0),
                cm_to_pt(2.0),
                A4_WIDTH - cm_to_pt(1.5),
                A4_HEIGHT - cm_to_pt(2.0),
            ),
        )
    }

    /// Page number span centered on the portrait working area, in the bottom zone
    pub fn page_number_span(text: &str, shift_pt: f64) -> TextSpan {
        let center = cm_to_pt(3.0) + (A4_WIDTH - cm_to_pt(4.5)) / 2.0 + shift_pt;
        times(
            text,
            Rect::new(center - 3.0, A4_HEIGHT - 40.0, center + 3.0, A4_HEIGHT - 28.0),
        )
    }
}
