//! Disallowed quotation marks
//!
//! Only guillemets are accepted. Every other quote glyph found in the page
//! text is a violation, located on the page as precisely as the model
//! allows: the span the character came from, then text search, then a fixed
//! marker spot.

use super::{fallback_anchor, page_mut, place_annotation, CheckKind, CheckOutcome, Checker};
use crate::config::QuoteConfig;
use crate::document::{DocumentModel, PageModel};
use crate::error::CheckError;
use crate::extractors::{select_strategy, CharSource, ExtractionStrategy, PageText, StrategySelection};
use crate::patterns::{codepoint_label, extract_context, format_pages, plural_ru, QuoteSet};
use chrono::Utc;
use shared_types::{
    AnnotationRequest, ComplianceReport, Geometry, Rect, StrokeColor, Violation, ViolationKind,
};
use std::collections::{BTreeMap, HashMap};

pub const QUOTE_ANNOTATION_TITLE: &str = "❌ Неправильные кавычки";

const CASE_VIOLATION_FORMS: (&str, &str, &str) =
    ("случай нарушения", "случая нарушений", "случаев нарушений");

const EXAMPLES_IN_LOG: usize = 5;

pub struct QuoteChecker {
    quotes: QuoteSet,
    context_chars: usize,
}

impl QuoteChecker {
    pub fn new(config: &QuoteConfig) -> Self {
        Self {
            quotes: QuoteSet::new(&config.disallowed),
            context_chars: config.context_chars,
        }
    }

    /// Box of one character, approximated from its span's geometry
    fn char_box(spans: &[(Rect, usize)], source: CharSource) -> Option<Rect> {
        let &(bbox, len) = spans.get(source.span)?;
        if len == 0 || source.index >= len {
            return None;
        }
        let char_width = bbox.width() / len as f64;
        let x0 = bbox.x0 + source.index as f64 * char_width;
        Some(Rect::new(x0, bbox.y0, x0 + char_width, bbox.y1))
    }

    /// Box for every match, `None` where the quote cannot be located
    ///
    /// Matches traced back to a span take their box from that span. The rest
    /// (text from the engine's own layer) take search hits in order, skipping
    /// hits already claimed by a traced match.
    fn locate(
        &self,
        page: &dyn PageModel,
        page_no: u32,
        text: &PageText,
        matches: &[(usize, char)],
    ) -> Vec<Option<Rect>> {
        let spans: Vec<(Rect, usize)> = page.spans().iter().map(|s| (s.bbox, s.char_len())).collect();
        let mut located: Vec<Option<Rect>> = matches
            .iter()
            .map(|&(offset, _)| text.source(offset).and_then(|src| Self::char_box(&spans, src)))
            .collect();

        let mut hits: HashMap<char, std::vec::IntoIter<Rect>> = HashMap::new();
        for (i, &(_, c)) in matches.iter().enumerate() {
            if located[i].is_some() {
                continue;
            }
            let free = hits.entry(c).or_insert_with(|| {
                let claimed: Vec<Rect> = matches
                    .iter()
                    .zip(&located)
                    .filter(|((_, mc), _)| *mc == c)
                    .filter_map(|(_, b)| *b)
                    .collect();
                let found = page.search(&c.to_string()).unwrap_or_else(|e| {
                    tracing::debug!(page = page_no, error = %e, "quote search failed");
                    Vec::new()
                });
                found
                    .into_iter()
                    .filter(|hit| !claimed.iter().any(|b| overlaps(hit, b)))
                    .collect::<Vec<_>>()
                    .into_iter()
            });
            located[i] = free.next();
        }
        located
    }

    fn check_page(
        &self,
        page: &mut dyn PageModel,
        page_no: u32,
        selection: &StrategySelection,
        violations: &mut Vec<Violation>,
    ) {
        let matches: Vec<(usize, char)> = selection
            .text
            .text
            .chars()
            .enumerate()
            .filter(|(_, c)| self.quotes.contains(*c))
            .collect();
        if matches.is_empty() {
            return;
        }

        let located = self.locate(&*page, page_no, &selection.text, &matches);

        for (&(offset, c), bbox) in matches.iter().zip(located) {
            let fallback = fallback_anchor(&*page, offset);
            let geometry = match bbox {
                Some(b) => Geometry::Box(b),
                None => {
                    tracing::warn!(page = page_no, offset, "quote not located, using fallback marker");
                    Geometry::Point(fallback)
                }
            };

            let context = extract_context(&selection.text.text, offset, self.context_chars);
            let request = AnnotationRequest::new(
                geometry.anchor(),
                QUOTE_ANNOTATION_TITLE,
                format!(
                    "Используйте кавычки-«ёлочки» вместо {} ({})",
                    c,
                    codepoint_label(c)
                ),
            )
            .with_stroke(StrokeColor::RED);
            place_annotation(page, page_no, request, fallback);

            violations.push(Violation {
                user_message: format!("Неправильные кавычки {}: …{}…", c, context),
                admin_message: format!(
                    "page_{} offset {} char {} {} strategy {}: '{}'",
                    page_no,
                    offset,
                    c,
                    codepoint_label(c),
                    selection.strategy.name(),
                    context
                ),
                kind: ViolationKind::DisallowedQuote {
                    character: c,
                    offset,
                    context,
                    strategy: selection.strategy.name().to_string(),
                },
                page: page_no,
                geometry,
            });
        }
    }
}

fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

fn describe_attempts(selection: &StrategySelection) -> String {
    selection
        .attempts
        .iter()
        .map(|a| match (a.score, &a.error) {
            (Some(score), _) => format!("{}: {}", a.strategy.name(), score),
            (None, Some(e)) => format!("{}: ошибка ({})", a.strategy.name(), e),
            (None, None) => format!("{}: —", a.strategy.name()),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn user_summary(violations: &[Violation]) -> String {
    if violations.is_empty() {
        return "✅ Неправильные кавычки не обнаружены.".to_string();
    }
    let n = violations.len();
    let verb = if plural_ru(n, CASE_VIOLATION_FORMS) == CASE_VIOLATION_FORMS.0 {
        "обнаружен"
    } else {
        "обнаружено"
    };
    let mut pages: Vec<u32> = violations.iter().map(|v| v.page).collect();
    pages.dedup();
    format!(
        "⚠️ Кавычки: {} {} {} на страницах: {}. Используйте кавычки-«ёлочки».",
        verb,
        n,
        plural_ru(n, CASE_VIOLATION_FORMS),
        format_pages(&pages)
    )
}

impl Checker for QuoteChecker {
    fn kind(&self) -> CheckKind {
        CheckKind::Quotes
    }

    fn check(&self, document: &mut dyn DocumentModel) -> Result<CheckOutcome, CheckError> {
        let mut violations = Vec::new();
        let mut page_lines = Vec::new();
        let mut by_strategy: BTreeMap<ExtractionStrategy, usize> = BTreeMap::new();

        for index in 0..document.page_count() {
            let page_no = (index + 1) as u32;
            let page = page_mut(document, index)?;

            let Some(selection) = select_strategy(&*page, page_no, &self.quotes) else {
                tracing::warn!(page = page_no, "no extraction strategy succeeded");
                page_lines.push(format!("Страница {}: текст не извлечён", page_no));
                continue;
            };
            page_lines.push(format!(
                "Страница {}: стратегия {} ({})",
                page_no,
                selection.strategy.name(),
                describe_attempts(&selection)
            ));
            *by_strategy.entry(selection.strategy).or_insert(0) += 1;

            self.check_page(page, page_no, &selection, &mut violations);
        }

        let mut by_char: BTreeMap<char, usize> = BTreeMap::new();
        for v in &violations {
            if let ViolationKind::DisallowedQuote { character, .. } = v.kind {
                *by_char.entry(character).or_insert(0) += 1;
            }
        }

        let mut admin = vec![format!(
            "[{}] Проверка кавычек: найдено нарушений {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            violations.len()
        )];
        admin.extend(page_lines);
        admin.push("Статистика по символам:".to_string());
        for (c, count) in &by_char {
            admin.push(format!("  {} ({}): {}", c, codepoint_label(*c), count));
        }
        admin.push("Статистика по стратегиям:".to_string());
        for (strategy, pages) in &by_strategy {
            admin.push(format!("  {}: страниц {}", strategy.name(), pages));
        }
        if !violations.is_empty() {
            admin.push("Примеры:".to_string());
            for v in violations.iter().take(EXAMPLES_IN_LOG) {
                admin.push(format!("  {}", v.admin_message));
            }
        }

        tracing::info!(violations = violations.len(), "quote check finished");

        Ok(CheckOutcome {
            report: ComplianceReport::new(user_summary(&violations), admin.join("\n")),
            violations,
        })
    }
}
