//! Placement of tables
//!
//! Table discovery is not done here: boxes come from a [`TableDetector`]
//! supplied by the caller and get the same containment and centering checks
//! as images, with a small overhang allowance for ruled borders.

use super::graphics::{placement_violations, report_object};
use super::{page_mut, summary_line, CheckKind, CheckOutcome, Checker};
use crate::config::{ComplianceConfig, GraphicsConfig, MarginConfig};
use crate::document::{DocumentModel, MemoryDocument, PageModel};
use crate::error::{CheckError, ModelError};
use crate::layout::working_area;
use shared_types::{ComplianceReport, GraphicKind, Rect};
use std::collections::BTreeMap;
use std::time::Instant;

/// Finds table bounding boxes on a page
pub trait TableDetector {
    /// `page_index` is 0-based
    fn detect(&self, page_index: usize, page: &dyn PageModel) -> Result<Vec<Rect>, CheckError>;
}

/// Tables listed ahead of time in the page layout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutTables {
    pages: Vec<Vec<Rect>>,
}

impl LayoutTables {
    pub fn new(pages: Vec<Vec<Rect>>) -> Self {
        Self { pages }
    }

    pub fn from_document(document: &MemoryDocument) -> Self {
        Self::new(document.pages.iter().map(|p| p.tables.clone()).collect())
    }
}

impl TableDetector for LayoutTables {
    fn detect(&self, page_index: usize, _page: &dyn PageModel) -> Result<Vec<Rect>, CheckError> {
        Ok(self.pages.get(page_index).cloned().unwrap_or_default())
    }
}

pub struct TableChecker<'a> {
    detector: Option<&'a dyn TableDetector>,
    graphics: GraphicsConfig,
    margins: MarginConfig,
}

impl<'a> TableChecker<'a> {
    pub fn new(config: &ComplianceConfig, detector: Option<&'a dyn TableDetector>) -> Self {
        Self {
            detector,
            graphics: config.graphics.clone(),
            margins: config.margins.clone(),
        }
    }
}

impl Checker for TableChecker<'_> {
    fn kind(&self) -> CheckKind {
        CheckKind::Tables
    }

    fn check(&self, document: &mut dyn DocumentModel) -> Result<CheckOutcome, CheckError> {
        let detector = self.detector.ok_or(CheckError::MissingTableDetector)?;
        let started = Instant::now();

        let mut violations = Vec::new();
        let mut per_page: BTreeMap<u32, usize> = BTreeMap::new();
        let mut admin_lines = Vec::new();

        // every page is detected before any marker is placed, so a detector
        // failure leaves the document untouched
        let mut detected = Vec::with_capacity(document.page_count());
        for index in 0..document.page_count() {
            let page = document
                .page(index)
                .ok_or(CheckError::Model(ModelError::PageOutOfRange(index + 1)))?;
            detected.push(detector.detect(index, page)?);
        }

        for (index, tables) in detected.into_iter().enumerate() {
            if tables.is_empty() {
                continue;
            }
            let page_no = (index + 1) as u32;
            per_page.insert(page_no, tables.len());

            let page = page_mut(document, index)?;
            let area = working_area(&*page, &self.margins);
            for (slot, bbox) in tables.into_iter().enumerate() {
                let kinds = placement_violations(
                    GraphicKind::Table,
                    &bbox,
                    &area,
                    self.graphics.table_margin_tolerance_pt,
                    self.graphics.center_tolerance_pt,
                );
                if kinds.is_empty() {
                    admin_lines.push(format!(
                        "[page_{}] bbox=[{:.2}, {:.2}, {:.2}, {:.2}] | ✅ Таблица корректно расположена",
                        page_no, bbox.x0, bbox.y0, bbox.x1, bbox.y1
                    ));
                    continue;
                }
                admin_lines.push(report_object(page, page_no, slot, bbox, kinds, &mut violations));
            }
        }

        let total: usize = per_page.values().sum();
        let elapsed = started.elapsed();
        tracing::info!(tables = total, violations = violations.len(), ?elapsed, "table check finished");

        let mut admin = format!("Найдено таблиц в документе: {}", total);
        for (page, count) in &per_page {
            admin.push_str(&format!("\nСтраница {}: таблиц {}", page, count));
        }
        admin.push_str("\n\n");
        if admin_lines.is_empty() {
            admin.push_str("Нарушений по таблицам не найдено.");
        } else {
            admin.push_str(&admin_lines.join("\n"));
        }
        admin.push_str(&format!(
            "\n\n⏱ Время анализа таблиц: {:.2} сек.",
            elapsed.as_secs_f64()
        ));

        Ok(CheckOutcome {
            report: ComplianceReport::new(
                summary_line("Нарушений по таблицам не найдено.", "Таблицы", &violations),
                admin,
            ),
            violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{a4, A4_WIDTH};
    use crate::units::cm_to_pt;
    use pretty_assertions::assert_eq;
    use shared_types::ViolationKind;

    fn centered_table() -> Rect {
        let center = cm_to_pt(3.0) + (A4_WIDTH - cm_to_pt(4.5)) / 2.0;
        Rect::new(center - 150.0, 300.0, center + 150.0, 450.0)
    }

    #[test]
    fn test_missing_detector_fails_the_check() {
        let mut doc = MemoryDocument::new(vec![a4()]);
        let checker = TableChecker::new(&ComplianceConfig::default(), None);
        assert!(matches!(
            checker.check(&mut doc),
            Err(CheckError::MissingTableDetector)
        ));
    }

    #[test]
    fn test_layout_tables_are_validated() {
        let mut doc = MemoryDocument::new(vec![
            a4().with_table(centered_table()),
            a4().with_table(Rect::new(20.0, 300.0, 400.0, 450.0)),
        ]);
        let detector = LayoutTables::from_document(&doc);
        let checker = TableChecker::new(&ComplianceConfig::default(), Some(&detector));
        let outcome = checker.check(&mut doc).unwrap();

        assert_eq!(outcome.affected_pages(), vec![2]);
        assert!(outcome
            .violations
            .iter()
            .all(|v| matches!(
                v.kind,
                ViolationKind::GraphicOutsideMargins { graphic: GraphicKind::Table }
                    | ViolationKind::GraphicNotCentered { graphic: GraphicKind::Table, .. }
            )));
        assert!(doc.pages[0].annotations.is_empty());
        assert_eq!(doc.pages[1].annotations.len(), 1);
        assert!(outcome.report.admin_details.starts_with("Найдено таблиц в документе: 2"));
        assert!(outcome.report.admin_details.contains("Время анализа таблиц"));
    }

    #[test]
    fn test_border_overhang_within_tolerance() {
        let area_left = cm_to_pt(3.0);
        let right = A4_WIDTH - cm_to_pt(1.5);
        // ruled border pokes 1pt out on both sides, still centered
        let bbox = Rect::new(area_left - 1.0, 300.0, right + 1.0, 450.0);
        let mut doc = MemoryDocument::new(vec![a4().with_table(bbox)]);
        let detector = LayoutTables::from_document(&doc);
        let outcome = TableChecker::new(&ComplianceConfig::default(), Some(&detector))
            .check(&mut doc)
            .unwrap();
        assert!(outcome.violations.is_empty());
    }

    struct FailingDetector;

    impl TableDetector for FailingDetector {
        fn detect(&self, page_index: usize, _page: &dyn PageModel) -> Result<Vec<Rect>, CheckError> {
            Err(CheckError::TableDetection {
                page: page_index as u32 + 1,
                reason: "lattice not found".to_string(),
            })
        }
    }

    #[test]
    fn test_detector_error_propagates() {
        let mut doc = MemoryDocument::new(vec![a4()]);
        let result = TableChecker::new(&ComplianceConfig::default(), Some(&FailingDetector))
            .check(&mut doc);
        assert!(matches!(result, Err(CheckError::TableDetection { page: 1, .. })));
    }

    /// Misplaced table on the first page, detection error on the second
    struct FailsOnSecondPage;

    impl TableDetector for FailsOnSecondPage {
        fn detect(&self, page_index: usize, _page: &dyn PageModel) -> Result<Vec<Rect>, CheckError> {
            match page_index {
                0 => Ok(vec![Rect::new(20.0, 300.0, 400.0, 450.0)]),
                _ => Err(CheckError::TableDetection {
                    page: page_index as u32 + 1,
                    reason: "lattice not found".to_string(),
                }),
            }
        }
    }

    #[test]
    fn test_detector_error_leaves_no_markers() {
        let mut doc = MemoryDocument::new(vec![a4(), a4()]);
        let result = TableChecker::new(&ComplianceConfig::default(), Some(&FailsOnSecondPage))
            .check(&mut doc);
        assert!(matches!(result, Err(CheckError::TableDetection { page: 2, .. })));
        assert!(doc.pages.iter().all(|p| p.annotations.is_empty()));
    }
}
