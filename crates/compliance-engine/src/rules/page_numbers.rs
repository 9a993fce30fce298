//! Footer page numbering
//!
//! A page number is a 1-3 digit span whose bottom edge lies in the bottom
//! zone. The title page must carry none; every other page must carry its own
//! index, centered on the working area, set in Times 12-14pt.

use super::{
    fallback_anchor, page_mut, place_annotation, summary_line, CheckKind, CheckOutcome, Checker,
    SERVICE_TITLE,
};
use crate::config::{ComplianceConfig, MarginConfig, PageNumberConfig};
use crate::document::{DocumentModel, PageModel, TextLine, TextSpan};
use crate::error::CheckError;
use crate::layout::working_area;
use crate::patterns::is_page_number_text;
use crate::units::{pt_to_mm, round2};
use shared_types::{
    AnnotationRequest, ComplianceReport, Geometry, Point, Rect, Violation, ViolationKind,
};

/// A numeric span that may be the printed page number
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub span: &'a TextSpan,
    /// Index of the owning line in page order
    line: usize,
}

fn page_lines(page: &dyn PageModel) -> Vec<&TextLine> {
    page.blocks().iter().flat_map(|b| b.lines.iter()).collect()
}

fn in_bottom_zone(page: &dyn PageModel, bbox: &Rect, config: &PageNumberConfig) -> bool {
    page.height() - bbox.y1 <= config.bottom_zone_pt()
}

/// All page-number candidates of a page, in page order
pub fn candidates<'a>(page: &'a dyn PageModel, config: &PageNumberConfig) -> Vec<Candidate<'a>> {
    page_lines(page)
        .into_iter()
        .enumerate()
        .flat_map(|(line, l)| l.spans.iter().map(move |span| Candidate { span, line }))
        .filter(|c| is_page_number_text(&c.span.text) && in_bottom_zone(page, &c.span.bbox, config))
        .collect()
}

/// Boxes of all page-number candidates, excluded from content by the margin check
pub fn candidate_boxes(page: &dyn PageModel, config: &PageNumberConfig) -> Vec<Rect> {
    candidates(page, config).iter().map(|c| c.span.bbox).collect()
}

pub struct PageNumberChecker {
    page_numbers: PageNumberConfig,
    margins: MarginConfig,
}

impl PageNumberChecker {
    pub fn new(config: &ComplianceConfig) -> Self {
        Self {
            page_numbers: config.page_numbers.clone(),
            margins: config.margins.clone(),
        }
    }

    fn font_ok(&self, span: &TextSpan) -> bool {
        let pattern = self.page_numbers.font_pattern.to_lowercase();
        span.font.to_lowercase().contains(&pattern)
            && span.size >= self.page_numbers.min_font_size
            && span.size <= self.page_numbers.max_font_size
    }

    /// True when the line right after the number sits in the bottom zone and is blank
    fn blank_line_after(&self, page: &dyn PageModel, line: usize) -> bool {
        let lines = page_lines(page);
        let Some(next) = lines.get(line + 1) else {
            return false;
        };
        let Some(bbox) = next.bbox() else {
            return false;
        };
        in_bottom_zone(page, &bbox, &self.page_numbers)
            && !next.spans.is_empty()
            && next.spans.iter().all(TextSpan::is_blank)
    }

    /// Validate the chosen number of a non-title page
    ///
    /// Returns the violation kinds and the box of the chosen span.
    fn validate(&self, page: &dyn PageModel, page_no: u32) -> Option<(Rect, Vec<ViolationKind>)> {
        let found = candidates(page, &self.page_numbers);
        let center = working_area(page, &self.margins).center_x();
        let best = found.iter().min_by(|a, b| {
            (a.span.bbox.center_x() - center)
                .abs()
                .total_cmp(&(b.span.bbox.center_x() - center).abs())
        })?;

        let mut kinds = Vec::new();
        let value = best.span.text.trim();
        if value != page_no.to_string() {
            kinds.push(ViolationKind::PageNumberMismatch {
                expected: page_no,
                found: value.to_string(),
            });
        }
        let deviation = (best.span.bbox.center_x() - center).abs();
        if deviation > self.page_numbers.center_tolerance_pt() {
            kinds.push(ViolationKind::PageNumberNotCentered {
                deviation_mm: round2(pt_to_mm(deviation)),
            });
        }
        if !self.font_ok(best.span) {
            kinds.push(ViolationKind::PageNumberFont {
                font: best.span.font.clone(),
                size: best.span.size,
            });
        }
        if found.len() > 1 {
            kinds.push(ViolationKind::MultiplePageNumberCandidates { count: found.len() });
        }
        if self.blank_line_after(page, best.line) {
            kinds.push(ViolationKind::BlankLineAfterPageNumber);
        }
        Some((best.span.bbox, kinds))
    }

    fn missing_anchor(&self, page: &dyn PageModel) -> Point {
        Point::new(page.width() - 100.0, page.height() - self.page_numbers.bottom_zone_pt())
    }
}

fn describe(kind: &ViolationKind) -> String {
    match kind {
        ViolationKind::PageNumberOnTitlePage => {
            "Номер страницы не должен быть на титульном листе".to_string()
        }
        ViolationKind::PageNumberMissing => "Не найден номер страницы в нижней части".to_string(),
        ViolationKind::NoPaginationAnywhere => {
            "В документе отсутствует нумерация страниц".to_string()
        }
        ViolationKind::PageNumberMismatch { expected, found } => {
            format!("Найден номер '{}', ожидается '{}'", found, expected)
        }
        ViolationKind::PageNumberNotCentered { deviation_mm } => {
            format!("Номер страницы не по центру (отклонение {} мм)", deviation_mm)
        }
        ViolationKind::PageNumberFont { font, size } => format!(
            "Номер страницы набран шрифтом '{}' {} pt, требуется Times New Roman 12-14 pt",
            font, size
        ),
        ViolationKind::MultiplePageNumberCandidates { count } => {
            format!("Найдено несколько цифровых блоков внизу страницы ({})", count)
        }
        ViolationKind::BlankLineAfterPageNumber => {
            "После номера страницы следует пустая строка".to_string()
        }
        other => format!("{:?}", other),
    }
}

fn violation(kind: ViolationKind, page_no: u32, geometry: Geometry) -> Violation {
    let text = describe(&kind);
    Violation {
        admin_message: format!("page_{}: {}", page_no, text),
        user_message: text,
        kind,
        page: page_no,
        geometry,
    }
}

impl Checker for PageNumberChecker {
    fn kind(&self) -> CheckKind {
        CheckKind::PageNumbers
    }

    fn check(&self, document: &mut dyn DocumentModel) -> Result<CheckOutcome, CheckError> {
        let mut violations = Vec::new();
        let mut missing = Vec::new();
        let page_count = document.page_count();

        for index in 0..page_count {
            let page_no = (index + 1) as u32;
            let page = page_mut(document, index)?;

            if page_no == 1 {
                let boxes = candidate_boxes(&*page, &self.page_numbers);
                let Some(first) = boxes.first() else {
                    continue;
                };
                violations.push(violation(
                    ViolationKind::PageNumberOnTitlePage,
                    page_no,
                    Geometry::Box(*first),
                ));
                for (slot, bbox) in boxes.iter().enumerate() {
                    let request = AnnotationRequest::new(
                        bbox.top_left(),
                        SERVICE_TITLE,
                        describe(&ViolationKind::PageNumberOnTitlePage),
                    );
                    let fallback = fallback_anchor(&*page, slot);
                    place_annotation(page, page_no, request, fallback);
                }
                continue;
            }

            let Some((bbox, kinds)) = self.validate(&*page, page_no) else {
                missing.push(index);
                continue;
            };
            if kinds.is_empty() {
                continue;
            }

            let body = kinds.iter().map(describe).collect::<Vec<_>>().join("\n");
            let fallback = fallback_anchor(&*page, 0);
            place_annotation(
                page,
                page_no,
                AnnotationRequest::new(bbox.top_left(), SERVICE_TITLE, body),
                fallback,
            );
            violations.extend(
                kinds
                    .into_iter()
                    .map(|kind| violation(kind, page_no, Geometry::Box(bbox))),
            );
        }

        let non_title_pages = page_count.saturating_sub(1);
        if non_title_pages > 0 && missing.len() == non_title_pages {
            tracing::info!(pages = page_count, "document carries no page numbers");
            let page = page_mut(document, 1)?;
            let anchor = self.missing_anchor(&*page);
            let kind = ViolationKind::NoPaginationAnywhere;
            place_annotation(
                page,
                2,
                AnnotationRequest::new(anchor, SERVICE_TITLE, describe(&kind)),
                anchor,
            );
            violations.push(violation(kind, 2, Geometry::Point(anchor)));
        } else {
            for index in missing {
                let page_no = (index + 1) as u32;
                let page = page_mut(document, index)?;
                let anchor = self.missing_anchor(&*page);
                let kind = ViolationKind::PageNumberMissing;
                place_annotation(
                    page,
                    page_no,
                    AnnotationRequest::new(anchor, SERVICE_TITLE, describe(&kind)),
                    anchor,
                );
                violations.push(violation(kind, page_no, Geometry::Point(anchor)));
            }
        }

        violations.sort_by_key(|v| v.page);

        let mut admin_lines: Vec<String> = Vec::new();
        let mut current: Option<(u32, Vec<String>)> = None;
        for v in &violations {
            match &mut current {
                Some((page, issues)) if *page == v.page => issues.push(v.user_message.clone()),
                _ => {
                    if let Some((page, issues)) = current.take() {
                        admin_lines.push(format!("page_{}: {}", page, issues.join("; ")));
                    }
                    current = Some((v.page, vec![v.user_message.clone()]));
                }
            }
        }
        if let Some((page, issues)) = current {
            admin_lines.push(format!("page_{}: {}", page, issues.join("; ")));
        }

        tracing::info!(violations = violations.len(), "page number check finished");

        Ok(CheckOutcome {
            report: ComplianceReport::new(
                summary_line(
                    "Нумерация страниц соответствует требованиям.",
                    "Нумерация страниц",
                    &violations,
                ),
                admin_lines.join("\n"),
            ),
            violations,
        })
    }
}
