// Page text extraction strategies for quote detection
//
// PDF text layers are inconsistent: depending on how a page is read back,
// punctuation can be merged into neighbouring glyphs or dropped. Each page is
// therefore read several ways and the reading that yields the most
// disallowed quote characters is used.
use crate::document::{PageModel, TextLine, TextSpan};
use crate::error::{CheckError, ModelError};
use crate::patterns::QuoteSet;
use serde::{Deserialize, Serialize};

/// Fixed set of ways to turn a page into plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// The document engine's own text layer
    Native,
    /// Lines sorted top-to-bottom, then left-to-right
    ReadingOrder,
    /// Model block order, lines of a block joined by spaces
    Blocks,
    /// Raw span concatenation without separators
    Spans,
}

impl ExtractionStrategy {
    /// Ranking order: on equal score the earlier strategy wins
    pub const ALL: [ExtractionStrategy; 4] = [
        ExtractionStrategy::Native,
        ExtractionStrategy::ReadingOrder,
        ExtractionStrategy::Blocks,
        ExtractionStrategy::Spans,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExtractionStrategy::Native => "native",
            ExtractionStrategy::ReadingOrder => "reading_order",
            ExtractionStrategy::Blocks => "blocks",
            ExtractionStrategy::Spans => "spans",
        }
    }

    pub fn extract(self, page: &dyn PageModel) -> Result<PageText, ModelError> {
        match self {
            ExtractionStrategy::Native => Ok(PageText::unmapped(page.native_text()?)),
            ExtractionStrategy::ReadingOrder => Ok(reading_order_text(page)),
            ExtractionStrategy::Blocks => {
                let mut out = PageText::default();
                let mut next_span = 0;
                for (b, block) in page.blocks().iter().enumerate() {
                    if b > 0 {
                        out.push_separator('\n');
                    }
                    for (l, line) in block.lines.iter().enumerate() {
                        if l > 0 {
                            out.push_separator(' ');
                        }
                        out.push_line(line, next_span);
                        next_span += line.spans.len();
                    }
                }
                Ok(out)
            }
            ExtractionStrategy::Spans => {
                let mut out = PageText::default();
                for (index, span) in page.spans().into_iter().enumerate() {
                    out.push_span(span, index);
                }
                Ok(out)
            }
        }
    }
}

/// Origin of one character of an extracted text: the span's position in
/// [`PageModel::spans`] order and the character index inside that span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharSource {
    pub span: usize,
    pub index: usize,
}

/// Extracted page text, with the span origin of every character
///
/// Separators inserted between lines and blocks, and text coming from the
/// engine's own layer, have no origin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    pub text: String,
    sources: Vec<Option<CharSource>>,
}

impl PageText {
    fn unmapped(text: String) -> Self {
        let sources = vec![None; text.chars().count()];
        Self { text, sources }
    }

    fn push_span(&mut self, span: &TextSpan, span_index: usize) {
        for (index, c) in span.text.chars().enumerate() {
            self.text.push(c);
            self.sources.push(Some(CharSource {
                span: span_index,
                index,
            }));
        }
    }

    fn push_line(&mut self, line: &TextLine, first_span: usize) {
        for (i, span) in line.spans.iter().enumerate() {
            self.push_span(span, first_span + i);
        }
    }

    fn push_separator(&mut self, c: char) {
        self.text.push(c);
        self.sources.push(None);
    }

    /// Origin of the character at `offset` (in chars)
    pub fn source(&self, offset: usize) -> Option<CharSource> {
        self.sources.get(offset).copied().flatten()
    }
}

fn reading_order_text(page: &dyn PageModel) -> PageText {
    let mut lines: Vec<(f64, f64, usize, &TextLine)> = Vec::new();
    let mut next_span = 0;
    for line in page.blocks().iter().flat_map(|b| b.lines.iter()) {
        if let Some(bbox) = line.bbox() {
            lines.push((bbox.y0, bbox.x0, next_span, line));
        }
        next_span += line.spans.len();
    }
    lines.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)));

    let mut out = PageText::default();
    for (i, (_, _, first_span, line)) in lines.into_iter().enumerate() {
        if i > 0 {
            out.push_separator('\n');
        }
        out.push_line(line, first_span);
    }
    out
}

/// Outcome of one strategy on one page
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyAttempt {
    pub strategy: ExtractionStrategy,
    /// Disallowed characters found, `None` if the strategy failed
    pub score: Option<usize>,
    pub chars: usize,
    pub error: Option<String>,
}

/// The winning reading of a page
#[derive(Debug, Clone, PartialEq)]
pub struct StrategySelection {
    pub strategy: ExtractionStrategy,
    pub text: PageText,
    pub score: usize,
    pub attempts: Vec<StrategyAttempt>,
}

/// Run every strategy and keep the one with the richest disallowed-quote yield
///
/// Failed strategies are recorded in `attempts` and excluded from scoring.
/// Returns `None` only when every strategy failed.
pub fn select_strategy(
    page: &dyn PageModel,
    page_no: u32,
    quotes: &QuoteSet,
) -> Option<StrategySelection> {
    let mut attempts = Vec::with_capacity(ExtractionStrategy::ALL.len());
    let mut best: Option<(ExtractionStrategy, PageText, usize)> = None;

    for strategy in ExtractionStrategy::ALL {
        match strategy.extract(page) {
            Ok(text) => {
                let score = quotes.count_in(&text.text);
                attempts.push(StrategyAttempt {
                    strategy,
                    score: Some(score),
                    chars: text.text.chars().count(),
                    error: None,
                });
                let better = match &best {
                    None => true,
                    Some((_, _, best_score)) => score > *best_score,
                };
                if better {
                    best = Some((strategy, text, score));
                }
            }
            Err(e) => {
                let failure = CheckError::Extraction {
                    page: page_no,
                    reason: format!("{}: {}", strategy.name(), e),
                };
                tracing::debug!(error = %failure, "extraction strategy failed");
                attempts.push(StrategyAttempt {
                    strategy,
                    score: None,
                    chars: 0,
                    error: Some(failure.to_string()),
                });
            }
        }
    }

    best.map(|(strategy, text, score)| StrategySelection {
        strategy,
        text,
        score,
        attempts,
    })
}
