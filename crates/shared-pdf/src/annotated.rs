//! A PDF paired with its extracted layout, checkable by the compliance engine
//!
//! The layout (text spans, image and drawing boxes) comes from an external
//! extractor as JSON. Page geometry is taken from the PDF itself so the
//! layout cannot disagree with the file about page size. Markers collect on
//! the layout pages and are written into a fresh copy of the PDF on save.

use crate::error::PdfError;
use crate::parser::PdfDocument;
use compliance_engine::document::{DocumentModel, MemoryDocument, PageModel};
use compliance_engine::ModelError;
use std::path::Path;

pub struct AnnotatedPdf {
    pdf: PdfDocument,
    layout: MemoryDocument,
}

impl AnnotatedPdf {
    /// Pair a loaded PDF with its layout
    ///
    /// # Errors
    ///
    /// `LayoutMismatch` when the page counts differ.
    pub fn new(pdf: PdfDocument, mut layout: MemoryDocument) -> Result<Self, PdfError> {
        let pdf_pages = pdf.page_count();
        if pdf_pages != layout.pages.len() {
            return Err(PdfError::LayoutMismatch {
                pdf: pdf_pages,
                layout: layout.pages.len(),
            });
        }

        for (index, page) in layout.pages.iter_mut().enumerate() {
            let [_, _, width, height] = pdf.page_dimensions(index as u32 + 1)?;
            if (page.width - width).abs() > 0.5 || (page.height - height).abs() > 0.5 {
                tracing::warn!(
                    page = index + 1,
                    layout_width = page.width,
                    layout_height = page.height,
                    width,
                    height,
                    "layout page size differs from MediaBox, using MediaBox"
                );
            }
            page.width = width;
            page.height = height;
        }

        Ok(Self { pdf, layout })
    }

    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(pdf_path: P, layout_path: Q) -> Result<Self, PdfError> {
        let pdf = PdfDocument::open(pdf_path)?;
        let layout = MemoryDocument::from_file(layout_path)
            .map_err(|e| PdfError::Parse(format!("layout: {}", e)))?;
        Self::new(pdf, layout)
    }

    pub fn layout(&self) -> &MemoryDocument {
        &self.layout
    }

    /// PDF bytes with every collected marker written as a text annotation
    ///
    /// The loaded document is left untouched, so this can be called repeatedly.
    pub fn render(&self) -> Result<Vec<u8>, PdfError> {
        let mut copy = PdfDocument::from_bytes(self.pdf.bytes().to_vec())?;
        let mut written = 0usize;
        for (index, page) in self.layout.pages.iter().enumerate() {
            for request in page.annotations() {
                copy.add_text_annotation(index as u32 + 1, request)?;
                written += 1;
            }
        }
        tracing::info!(annotations = written, "annotations written");
        copy.save_to_bytes()
    }
}

impl DocumentModel for AnnotatedPdf {
    fn page_count(&self) -> usize {
        self.layout.page_count()
    }

    fn page(&self, index: usize) -> Option<&dyn PageModel> {
        self.layout.page(index)
    }

    fn page_mut(&mut self, index: usize) -> Option<&mut dyn PageModel> {
        self.layout.page_mut(index)
    }

    fn save(&self, path: &Path) -> Result<(), ModelError> {
        let bytes = self.render().map_err(|e| ModelError::Save(e.to_string()))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
