//! Document model contract consumed by the checkers
//!
//! The PDF engine that decodes pages, searches text and persists markers is
//! external. Checkers only see these traits. Annotations are kept apart from
//! content: nothing passed to [`PageModel::annotate`] ever shows up again in
//! [`PageModel::blocks`] or the graphic boxes, so a checker running later
//! measures the same content as one running first.

pub mod memory;

pub use memory::{MemoryDocument, MemoryPage};

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use shared_types::{AnnotationRequest, Rect};
use std::path::Path;

/// A run of text with uniform font
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub bbox: Rect,
    #[serde(default)]
    pub font: String,
    #[serde(default)]
    pub size: f64,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, bbox: Rect, font: impl Into<String>, size: f64) -> Self {
        Self {
            text: text.into(),
            bbox,
            font: font.into(),
            size,
        }
    }

    /// Whitespace-only (or empty) span
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Spans in left-to-right visual order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    pub fn new(spans: Vec<TextSpan>) -> Self {
        Self { spans }
    }

    /// Span texts concatenated without separators
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn bbox(&self) -> Option<Rect> {
        Rect::union_all(self.spans.iter().map(|s| &s.bbox))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    pub fn new(lines: Vec<TextLine>) -> Self {
        Self { lines }
    }

    /// Lines joined with newlines
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// One page of the document under check
pub trait PageModel {
    /// Page width in points
    fn width(&self) -> f64;

    /// Page height in points
    fn height(&self) -> f64;

    fn orientation(&self) -> Orientation {
        if self.width() > self.height() {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// Text content in reading order: blocks, lines, spans
    fn blocks(&self) -> &[TextBlock];

    /// Bounding boxes of raster images
    fn image_boxes(&self) -> Vec<Rect>;

    /// Bounding boxes of vector drawings
    fn drawing_boxes(&self) -> Vec<Rect>;

    /// The engine's own plain-text rendering of the page
    fn native_text(&self) -> Result<String, ModelError> {
        Err(ModelError::Unsupported("native text extraction"))
    }

    /// Literal substring search, one box per occurrence
    fn search(&self, needle: &str) -> Result<Vec<Rect>, ModelError>;

    /// Place a marker on the page
    fn annotate(&mut self, request: AnnotationRequest) -> Result<(), ModelError>;

    /// Markers placed so far
    fn annotations(&self) -> &[AnnotationRequest];

    /// Every span on the page in block/line order
    fn spans(&self) -> Vec<&TextSpan> {
        self.blocks()
            .iter()
            .flat_map(|b| b.lines.iter())
            .flat_map(|l| l.spans.iter())
            .collect()
    }
}

/// An opened, paginated document. Page indices here are 0-based.
pub trait DocumentModel {
    fn page_count(&self) -> usize;

    fn page(&self, index: usize) -> Option<&dyn PageModel>;

    fn page_mut(&mut self, index: usize) -> Option<&mut dyn PageModel>;

    /// Persist all annotations applied so far
    fn save(&self, path: &Path) -> Result<(), ModelError>;
}
