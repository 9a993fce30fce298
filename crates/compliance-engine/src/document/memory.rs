//! In-memory document model
//!
//! Pages are deserialized from a layout sidecar produced by an external PDF
//! engine (span boxes, fonts, graphic boxes, optional pre-detected tables).
//! Used by the command-line tool and by tests.

use super::{DocumentModel, PageModel, TextBlock, TextLine, TextSpan};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use shared_types::{AnnotationRequest, Rect};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryPage {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
    #[serde(default)]
    pub images: Vec<Rect>,
    #[serde(default)]
    pub drawings: Vec<Rect>,
    /// Table boxes found by an external detector, if it ran
    #[serde(default)]
    pub tables: Vec<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_text: Option<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationRequest>,
}

impl MemoryPage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Append a block holding a single line
    pub fn with_line(mut self, spans: Vec<TextSpan>) -> Self {
        self.blocks.push(TextBlock::new(vec![TextLine::new(spans)]));
        self
    }

    pub fn with_block(mut self, block: TextBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_image(mut self, bbox: Rect) -> Self {
        self.images.push(bbox);
        self
    }

    pub fn with_drawing(mut self, bbox: Rect) -> Self {
        self.drawings.push(bbox);
        self
    }

    pub fn with_table(mut self, bbox: Rect) -> Self {
        self.tables.push(bbox);
        self
    }

    pub fn with_native_text(mut self, text: impl Into<String>) -> Self {
        self.native_text = Some(text.into());
        self
    }
}

impl PageModel for MemoryPage {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }

    fn image_boxes(&self) -> Vec<Rect> {
        self.images.clone()
    }

    fn drawing_boxes(&self) -> Vec<Rect> {
        self.drawings.clone()
    }

    fn native_text(&self) -> Result<String, ModelError> {
        self.native_text
            .clone()
            .ok_or(ModelError::Unsupported("native text extraction"))
    }

    /// Occurrences inside single spans; the box is approximated from the
    /// span width divided evenly across its characters
    fn search(&self, needle: &str) -> Result<Vec<Rect>, ModelError> {
        if needle.is_empty() {
            return Err(ModelError::Search("empty search string".to_string()));
        }
        let needle_len = needle.chars().count();
        let mut hits = Vec::new();

        for span in self.spans() {
            let len = span.char_len();
            if len == 0 {
                continue;
            }
            let char_width = span.bbox.width() / len as f64;
            for (byte_pos, _) in span.text.match_indices(needle) {
                let start = span.text[..byte_pos].chars().count();
                hits.push(Rect::new(
                    span.bbox.x0 + start as f64 * char_width,
                    span.bbox.y0,
                    span.bbox.x0 + (start + needle_len) as f64 * char_width,
                    span.bbox.y1,
                ));
            }
        }

        Ok(hits)
    }

    fn annotate(&mut self, request: AnnotationRequest) -> Result<(), ModelError> {
        let p = request.anchor;
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(ModelError::Annotation(format!(
                "non-finite anchor ({}, {})",
                p.x, p.y
            )));
        }
        self.annotations.push(request);
        Ok(())
    }

    fn annotations(&self) -> &[AnnotationRequest] {
        &self.annotations
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    pub fn new(pages: Vec<MemoryPage>) -> Self {
        Self { pages }
    }

    /// Parse a layout sidecar
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| ModelError::Layout(e.to_string()))
    }
}

impl DocumentModel for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Option<&dyn PageModel> {
        self.pages.get(index).map(|p| p as &dyn PageModel)
    }

    fn page_mut(&mut self, index: usize) -> Option<&mut dyn PageModel> {
        self.pages.get_mut(index).map(|p| p as &mut dyn PageModel)
    }

    /// Writes the layout together with its annotations as JSON
    fn save(&self, path: &Path) -> Result<(), ModelError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| ModelError::Save(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Point;

    fn page_with(text: &str) -> MemoryPage {
        MemoryPage::new(595.0, 842.0).with_line(vec![TextSpan::new(
            text,
            Rect::new(100.0, 100.0, 200.0, 112.0),
            "TimesNewRomanPSMT",
            12.0,
        )])
    }

    #[test]
    fn test_search_approximates_character_box() {
        // 10 chars over 100pt: 10pt per char
        let page = page_with("ab\"cdef\"gh");
        let hits = page.search("\"").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0], Rect::new(120.0, 100.0, 130.0, 112.0));
        assert_eq!(hits[1], Rect::new(170.0, 100.0, 180.0, 112.0));
    }

    #[test]
    fn test_search_handles_multibyte_text() {
        let page = page_with("«ёлочки» “x”");
        let hits = page.search("“").unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].x0 - (100.0 + 9.0 * 100.0 / 12.0)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_search_is_error() {
        assert!(page_with("x").search("").is_err());
    }

    #[test]
    fn test_annotations_do_not_become_content() {
        let mut page = page_with("text");
        page.annotate(AnnotationRequest::new(Point::new(1.0, 1.0), "t", "body"))
            .unwrap();
        assert_eq!(page.annotations().len(), 1);
        assert_eq!(page.spans().len(), 1);
        assert!(page.image_boxes().is_empty());
    }

    #[test]
    fn test_layout_json_round_trip_through_save() {
        let doc = MemoryDocument::new(vec![page_with("a").with_image(Rect::new(
            0.0, 0.0, 50.0, 50.0,
        ))]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        doc.save(&path).unwrap();
        let loaded = MemoryDocument::from_file(&path).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_minimal_layout_json() {
        let json = r#"{"pages":[{"width":595,"height":842,"blocks":[{"lines":[{"spans":[
            {"text":"1","bbox":{"x0":1,"y0":2,"x1":3,"y1":4}}]}]}]}]}"#;
        let doc = MemoryDocument::from_json(json).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].spans()[0].font, "");
    }
}
