//! Run results and digest assembly

use crate::rules::{CheckKind, CheckOutcome};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{ComplianceReport, Violation};

/// Result of one checker within a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionReport {
    pub kind: CheckKind,
    /// Present when the checker completed
    pub outcome: Option<CheckOutcome>,
    /// Failure text when it did not
    pub error: Option<String>,
}

impl SectionReport {
    pub fn completed(kind: CheckKind, outcome: CheckOutcome) -> Self {
        Self {
            kind,
            outcome: Some(outcome),
            error: None,
        }
    }

    pub fn failed(kind: CheckKind, error: impl Into<String>) -> Self {
        Self {
            kind,
            outcome: None,
            error: Some(error.into()),
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn violations(&self) -> &[Violation] {
        self.outcome
            .as_ref()
            .map(|o| o.violations.as_slice())
            .unwrap_or_default()
    }

    fn user_line(&self) -> String {
        match &self.outcome {
            Some(outcome) => outcome.report.user_summary.clone(),
            None => format!("Не удалось выполнить проверку: {}.", self.title()),
        }
    }

    fn admin_block(&self) -> String {
        let body = match (&self.outcome, &self.error) {
            (Some(outcome), _) => outcome.report.admin_details.clone(),
            (None, Some(error)) => format!("Ошибка при проверке «{}»: {}", self.title(), error),
            (None, None) => String::new(),
        };
        format!("[{}]\n{}", self.title(), body)
    }
}

/// Everything one engine run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRun {
    /// One entry per checker, in run order
    pub sections: Vec<SectionReport>,
    /// Combined user and admin digests
    pub report: ComplianceReport,
    /// All violations in section order
    pub violations: Vec<Violation>,
    pub checked_at: DateTime<Utc>,
}

impl ComplianceRun {
    pub fn section(&self, kind: CheckKind) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// True when every checker completed without findings
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.sections.iter().all(|s| s.error.is_none())
    }
}

/// Build both digests from the section results
pub fn aggregate(sections: &[SectionReport]) -> ComplianceReport {
    let user = sections
        .iter()
        .map(SectionReport::user_line)
        .collect::<Vec<_>>()
        .join("\n");
    let admin = sections
        .iter()
        .map(SectionReport::admin_block)
        .collect::<Vec<_>>()
        .join("\n\n");
    ComplianceReport::new(user, admin)
}

/// File name for the annotated copy: `<stem>_Проверено_<DD.MM.YYYY>_в_<HH-MM>.pdf`
pub fn checked_copy_name(stem: &str, at: &NaiveDateTime) -> String {
    format!(
        "{}_Проверено_{}_в_{}.pdf",
        stem,
        at.format("%d.%m.%Y"),
        at.format("%H-%M")
    )
}
