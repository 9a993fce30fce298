//! Double spaces inside text lines

use super::{
    fallback_anchor, page_mut, place_annotation, summary_line, CheckKind, CheckOutcome, Checker,
    SERVICE_TITLE,
};
use crate::document::{DocumentModel, PageModel, TextLine};
use crate::error::CheckError;
use shared_types::{AnnotationRequest, ComplianceReport, Geometry, Point, Violation, ViolationKind};

const DOUBLE_SPACE: &str = "  ";

#[derive(Debug, Default)]
pub struct DoubleSpaceChecker;

impl DoubleSpaceChecker {
    pub fn new() -> Self {
        Self
    }
}

/// Left edge of the span holding byte offset `offset` of the line text
fn span_anchor(line: &TextLine, offset: usize) -> Option<Point> {
    let mut start = 0;
    for span in &line.spans {
        let end = start + span.text.len();
        if (start..end).contains(&offset) {
            return Some(span.bbox.top_left());
        }
        start = end;
    }
    None
}

/// Every span of the document, one line each
fn span_dump(document: &dyn DocumentModel) -> String {
    let mut out = Vec::new();
    for index in 0..document.page_count() {
        let Some(page) = document.page(index) else {
            continue;
        };
        let page_no = index + 1;
        out.push(format!("===== Страница {} =====", page_no));
        for (b, block) in page.blocks().iter().enumerate() {
            for (l, line) in block.lines.iter().enumerate() {
                for (s, span) in line.spans.iter().enumerate() {
                    out.push(format!(
                        "[page {}] block {} line {} span {}: text='{}' bbox=[{:.2}, {:.2}, {:.2}, {:.2}] font='{}' size={}",
                        page_no,
                        b,
                        l,
                        s,
                        span.text,
                        span.bbox.x0,
                        span.bbox.y0,
                        span.bbox.x1,
                        span.bbox.y1,
                        span.font,
                        span.size
                    ));
                }
            }
        }
    }
    out.join("\n")
}

impl Checker for DoubleSpaceChecker {
    fn kind(&self) -> CheckKind {
        CheckKind::DoubleSpaces
    }

    fn check(&self, document: &mut dyn DocumentModel) -> Result<CheckOutcome, CheckError> {
        let mut violations = Vec::new();
        let mut admin_lines = Vec::new();

        for index in 0..document.page_count() {
            let page_no = (index + 1) as u32;
            let page = page_mut(document, index)?;

            let found: Vec<(String, Option<Point>)> = page
                .blocks()
                .iter()
                .flat_map(|b| b.lines.iter())
                .filter_map(|line| {
                    let text = line.text();
                    let offset = text.find(DOUBLE_SPACE)?;
                    Some((text, span_anchor(line, offset)))
                })
                .collect();

            for (slot, (text, anchor)) in found.into_iter().enumerate() {
                let fallback = fallback_anchor(&*page, slot);
                let anchor = anchor.unwrap_or(fallback);
                let line_text = text.trim();
                admin_lines.push(format!(
                    "[page_{}] Двойной пробел в строке: «{}»",
                    page_no, text
                ));
                place_annotation(
                    page,
                    page_no,
                    AnnotationRequest::new(
                        anchor,
                        SERVICE_TITLE,
                        format!("В этом месте строки найден двойной пробел: «{}»", line_text),
                    ),
                    fallback,
                );
                violations.push(Violation {
                    kind: ViolationKind::DoubleSpace,
                    page: page_no,
                    geometry: Geometry::Point(anchor),
                    user_message: format!("Двойной пробел в строке «{}»", line_text),
                    admin_message: format!("[page_{}] «{}»", page_no, text),
                });
            }
        }

        tracing::info!(lines = violations.len(), "double space check finished");

        let mut admin = if admin_lines.is_empty() {
            "Двойных пробелов не найдено.".to_string()
        } else {
            admin_lines.join("\n")
        };
        admin.push_str("\n\n==== Все спаны ====\n");
        admin.push_str(&span_dump(&*document));

        Ok(CheckOutcome {
            report: ComplianceReport::new(
                summary_line("Двойные пробелы не обнаружены.", "Двойные пробелы", &violations),
                admin,
            ),
            violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::rules::test_support::{a4, times};
    use pretty_assertions::assert_eq;
    use shared_types::Rect;

    fn span(text: &str, x0: f64, y0: f64) -> crate::document::TextSpan {
        times(text, Rect::new(x0, y0, x0 + 60.0, y0 + 12.0))
    }

    #[test]
    fn test_one_violation_per_line() {
        let mut doc = MemoryDocument::new(vec![
            a4().with_line(vec![span("Обычная строка", 90.0, 100.0)]),
            a4().with_line(vec![span("Два  пробела  дважды", 90.0, 100.0)])
                .with_line(vec![span("и  ещё", 90.0, 120.0)]),
        ]);
        let outcome = DoubleSpaceChecker::new().check(&mut doc).unwrap();
        assert_eq!(outcome.violations.len(), 2);
        assert_eq!(outcome.affected_pages(), vec![2]);
        assert_eq!(doc.pages[1].annotations.len(), 2);
        assert_eq!(
            outcome.report.user_summary,
            "⚠️ Двойные пробелы: обнаружено 2 нарушения на страницах: 2."
        );
    }

    #[test]
    fn test_double_space_across_span_boundary() {
        let mut doc = MemoryDocument::new(vec![a4().with_line(vec![
            span("конец ", 90.0, 100.0),
            span(" начало", 150.0, 100.0),
        ])]);
        let outcome = DoubleSpaceChecker::new().check(&mut doc).unwrap();
        assert_eq!(outcome.violations.len(), 1);
        // offset of the pair falls on the trailing space of the first span
        assert_eq!(doc.pages[0].annotations[0].anchor, Point::new(90.0, 100.0));
        assert!(doc.pages[0].annotations[0].body.contains("«конец  начало»"));
    }

    #[test]
    fn test_anchor_is_left_edge_of_owning_span() {
        let mut doc = MemoryDocument::new(vec![a4().with_line(vec![
            span("без ошибок", 90.0, 100.0),
            span("тут  ошибка", 160.0, 100.0),
        ])]);
        DoubleSpaceChecker::new().check(&mut doc).unwrap();
        assert_eq!(doc.pages[0].annotations[0].anchor, Point::new(160.0, 100.0));
    }

    #[test]
    fn test_clean_document_and_span_dump() {
        let mut doc = MemoryDocument::new(vec![a4().with_line(vec![span("Текст", 90.0, 100.0)])]);
        let outcome = DoubleSpaceChecker::new().check(&mut doc).unwrap();
        assert!(outcome.violations.is_empty());
        assert_eq!(outcome.report.user_summary, "✅ Двойные пробелы не обнаружены.");
        assert!(outcome
            .report
            .admin_details
            .contains("[page 1] block 0 line 0 span 0: text='Текст'"));
    }
}
