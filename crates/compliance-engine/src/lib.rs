//! Manuscript formatting checks for paginated documents
//!
//! The engine runs six independent checkers against a document model:
//! quotation marks, margins, page numbering, double spaces, image and vector
//! placement, and table placement. Each checker marks the pages it finds at
//! fault and reports a user summary plus an admin log. One checker failing
//! never stops the others.

pub mod config;
pub mod document;
pub mod error;
pub mod extractors;
pub mod layout;
pub mod patterns;
pub mod report;
pub mod rules;
pub mod units;

pub use config::ComplianceConfig;
pub use document::{DocumentModel, MemoryDocument, MemoryPage, PageModel};
pub use error::{CheckError, ComplianceError, ModelError};
pub use report::{aggregate, checked_copy_name, ComplianceRun, SectionReport};
pub use rules::{CheckKind, CheckOutcome, Checker, LayoutTables, TableDetector};

use rules::{
    DoubleSpaceChecker, GraphicsChecker, MarginChecker, PageNumberChecker, QuoteChecker,
    TableChecker,
};

/// Runs every checker over a document and assembles the digests
pub struct ComplianceEngine {
    config: ComplianceConfig,
    table_detector: Option<Box<dyn TableDetector>>,
}

impl ComplianceEngine {
    pub fn new(config: ComplianceConfig) -> Self {
        Self {
            config,
            table_detector: None,
        }
    }

    /// Supply table boxes for the table placement check
    pub fn with_table_detector(mut self, detector: impl TableDetector + 'static) -> Self {
        self.table_detector = Some(Box::new(detector));
        self
    }

    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    fn checkers(&self) -> Vec<Box<dyn Checker + '_>> {
        vec![
            Box::new(QuoteChecker::new(&self.config.quotes)),
            Box::new(MarginChecker::new(&self.config)),
            Box::new(PageNumberChecker::new(&self.config)),
            Box::new(DoubleSpaceChecker::new()),
            Box::new(GraphicsChecker::new(&self.config)),
            Box::new(TableChecker::new(&self.config, self.table_detector.as_deref())),
        ]
    }

    /// Check the document, annotating it in place
    ///
    /// # Errors
    ///
    /// Fails only when the configuration is invalid or the document has no
    /// pages to check. Individual checker failures end up in the report.
    pub fn run(&self, document: &mut dyn DocumentModel) -> Result<ComplianceRun, ComplianceError> {
        self.config.validate()?;
        if document.page_count() == 0 {
            return Err(ComplianceError::FatalDecode(
                "document has no pages".to_string(),
            ));
        }

        let mut sections = Vec::with_capacity(CheckKind::ORDER.len());
        for checker in self.checkers() {
            let kind = checker.kind();
            let _span = tracing::info_span!("check", kind = ?kind).entered();
            match checker.check(document) {
                Ok(outcome) => {
                    tracing::debug!(violations = outcome.violations.len(), "check completed");
                    sections.push(SectionReport::completed(kind, outcome));
                }
                Err(e) => {
                    tracing::error!(error = %e, "check failed");
                    sections.push(SectionReport::failed(kind, e.to_string()));
                }
            }
        }

        let violations = sections
            .iter()
            .flat_map(|s| s.violations().iter().cloned())
            .collect();

        Ok(ComplianceRun {
            report: aggregate(&sections),
            sections,
            violations,
            checked_at: chrono::Utc::now(),
        })
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new(ComplianceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_is_fatal() {
        let mut doc = MemoryDocument::new(Vec::new());
        let result = ComplianceEngine::default().run(&mut doc);
        assert!(matches!(result, Err(ComplianceError::FatalDecode(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ComplianceConfig::default();
        config.margins.tolerance_pt = -1.0;
        let mut doc = MemoryDocument::new(vec![MemoryPage::new(595.0, 842.0)]);
        let result = ComplianceEngine::new(config).run(&mut doc);
        assert!(matches!(result, Err(ComplianceError::Config(_))));
    }

    #[test]
    fn test_missing_detector_does_not_abort_run() {
        let mut doc = MemoryDocument::new(vec![MemoryPage::new(595.0, 842.0)]);
        let run = ComplianceEngine::default().run(&mut doc).unwrap();
        let kinds: Vec<CheckKind> = run.sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, CheckKind::ORDER.to_vec());
        let tables = run.section(CheckKind::Tables).unwrap();
        assert!(tables.outcome.is_none());
        assert!(run
            .report
            .user_summary
            .ends_with("Не удалось выполнить проверку: Таблицы."));
        assert!(run.report.admin_details.contains("[Таблицы]\nОшибка при проверке"));
        assert!(!run.is_clean());
    }

    #[test]
    fn test_blank_document_with_detector_is_clean() {
        let mut doc = MemoryDocument::new(vec![MemoryPage::new(595.0, 842.0)]);
        let detector = LayoutTables::from_document(&doc);
        let run = ComplianceEngine::default()
            .with_table_detector(detector)
            .run(&mut doc)
            .unwrap();
        assert!(run.is_clean());
        assert_eq!(run.report.user_summary.lines().count(), 6);
    }
}
