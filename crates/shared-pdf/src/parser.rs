//! PDF loading, page geometry and annotation writing using lopdf

use crate::coords::top_left_to_pdf;
use crate::error::PdfError;
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use shared_types::AnnotationRequest;
use std::path::Path;

/// A4 portrait, used when neither the page nor its parent carries a MediaBox
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 595.28, 841.89];

/// Side of the square icon box of a text annotation, in points
const NOTE_ICON_SIZE: f64 = 20.0;

pub struct PdfDocument {
    pub(crate) doc: Document,
    pub(crate) bytes: Vec<u8>,
}

impl PdfDocument {
    /// Load a PDF from raw bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PdfError> {
        let doc = Document::load_mem(&bytes).map_err(|e| PdfError::Parse(e.to_string()))?;
        Ok(Self { doc, bytes })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    /// Bytes the document was loaded from (or last saved to)
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Page object ID for a 1-indexed page number
    pub fn page_id(&self, page_num: u32) -> Option<ObjectId> {
        self.doc.get_pages().get(&page_num).copied()
    }

    /// Page MediaBox as [x, y, width, height]
    pub fn page_dimensions(&self, page_num: u32) -> Result<[f64; 4], PdfError> {
        let page_id = self
            .page_id(page_num)
            .ok_or(PdfError::PageNotFound(page_num))?;

        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| PdfError::Operation(format!("Failed to get page object: {}", e)))?;

        self.get_media_box(page_dict)
    }

    /// MediaBox of a page dictionary, walking up the page tree if needed
    fn get_media_box(&self, page_dict: &Dictionary) -> Result<[f64; 4], PdfError> {
        if let Ok(media_box) = page_dict.get(b"MediaBox") {
            return self.parse_rect(media_box);
        }

        let mut current = page_dict;
        while let Ok(parent_id) = current.get(b"Parent").and_then(Object::as_reference) {
            let Ok(parent) = self.doc.get_dictionary(parent_id) else {
                break;
            };
            if let Ok(media_box) = parent.get(b"MediaBox") {
                return self.parse_rect(media_box);
            }
            current = parent;
        }

        tracing::debug!("no MediaBox in page tree, assuming A4");
        Ok(DEFAULT_MEDIA_BOX)
    }

    /// Parse a PDF rectangle array into [x, y, width, height]
    fn parse_rect(&self, obj: &Object) -> Result<[f64; 4], PdfError> {
        let arr = match obj {
            Object::Array(a) => a,
            Object::Reference(id) => self
                .doc
                .get_object(*id)
                .and_then(Object::as_array)
                .map_err(|e| PdfError::Operation(format!("Bad MediaBox reference: {}", e)))?,
            _ => return Err(PdfError::Operation("MediaBox is not an array".to_string())),
        };

        if arr.len() != 4 {
            return Err(PdfError::Operation(format!(
                "MediaBox has {} elements, expected 4",
                arr.len()
            )));
        }

        let mut values = [0.0f64; 4];
        for (i, obj) in arr.iter().enumerate() {
            values[i] = self.extract_number(obj)?;
        }

        // [x1, y1, x2, y2] -> [x, y, width, height]
        Ok([
            values[0],
            values[1],
            values[2] - values[0],
            values[3] - values[1],
        ])
    }

    fn extract_number(&self, obj: &Object) -> Result<f64, PdfError> {
        match obj {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(r) => Ok(*r as f64),
            Object::Reference(id) => {
                let resolved = self
                    .doc
                    .get_object(*id)
                    .map_err(|e| PdfError::Operation(format!("Failed to resolve: {}", e)))?;
                self.extract_number(resolved)
            }
            _ => Err(PdfError::Operation(
                "Expected number in rectangle".to_string(),
            )),
        }
    }

    /// Add a sticky-note annotation; the request anchor is in top-left page space
    pub fn add_text_annotation(
        &mut self,
        page_num: u32,
        request: &AnnotationRequest,
    ) -> Result<ObjectId, PdfError> {
        let page_id = self
            .page_id(page_num)
            .ok_or(PdfError::PageNotFound(page_num))?;
        let media_box = self.page_dimensions(page_num)?;
        let (x, y) = top_left_to_pdf(request.anchor.x, request.anchor.y, media_box);

        let mut annot = Dictionary::new();
        annot.set("Type", Object::Name(b"Annot".to_vec()));
        annot.set("Subtype", Object::Name(b"Text".to_vec()));
        annot.set("Name", Object::Name(b"Comment".to_vec()));
        annot.set(
            "Rect",
            Object::Array(vec![
                Object::Real(x as f32),
                Object::Real((y - NOTE_ICON_SIZE) as f32),
                Object::Real((x + NOTE_ICON_SIZE) as f32),
                Object::Real(y as f32),
            ]),
        );
        annot.set("T", text_string(&request.title));
        annot.set("Contents", text_string(&request.body));
        annot.set("Open", Object::Boolean(false));
        if let Some(color) = request.stroke {
            annot.set(
                "C",
                Object::Array(vec![
                    Object::Real(color.r),
                    Object::Real(color.g),
                    Object::Real(color.b),
                ]),
            );
        }

        let annot_id = self.doc.add_object(annot);
        add_annotation_to_page(&mut self.doc, page_id, annot_id)?;
        Ok(annot_id)
    }

    /// Number of entries in a page's Annots array
    pub fn annotation_count(&self, page_num: u32) -> Result<usize, PdfError> {
        let page_id = self
            .page_id(page_num)
            .ok_or(PdfError::PageNotFound(page_num))?;
        let page = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| PdfError::Operation(e.to_string()))?;
        let count = match page.get(b"Annots") {
            Ok(Object::Array(arr)) => arr.len(),
            Ok(Object::Reference(id)) => self
                .doc
                .get_object(*id)
                .and_then(Object::as_array)
                .map(Vec::len)
                .map_err(|e| PdfError::Operation(e.to_string()))?,
            _ => 0,
        };
        Ok(count)
    }

    /// Serialize the current document state
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, PdfError> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| PdfError::Operation(format!("Failed to save PDF: {}", e)))?;
        self.bytes = buffer.clone();
        Ok(buffer)
    }
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        return Object::String(s.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn add_annotation_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    annot_id: ObjectId,
) -> Result<(), PdfError> {
    // Annots may be an indirect array
    let indirect = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|d| d.get(b"Annots").ok())
        .and_then(|o| o.as_reference().ok());
    if let Some(array_id) = indirect {
        let arr = doc
            .get_object_mut(array_id)
            .and_then(Object::as_array_mut)
            .map_err(|e| PdfError::Operation(e.to_string()))?;
        arr.push(Object::Reference(annot_id));
        return Ok(());
    }

    let page = doc
        .get_object_mut(page_id)
        .map_err(|e| PdfError::Operation(e.to_string()))?;

    if let Object::Dictionary(page_dict) = page {
        if let Ok(Object::Array(arr)) = page_dict.get_mut(b"Annots") {
            arr.push(Object::Reference(annot_id));
        } else {
            page_dict.set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
        }
    }
    Ok(())
}
