//! PDF handling for the checker
//!
//! Pairs a lopdf document with the page layout produced by an external text
//! extractor, so the compliance engine can run over it and the resulting
//! markers can be written back as PDF text annotations.

pub mod annotated;
pub mod coords;
pub mod error;
pub mod parser;

pub use annotated::AnnotatedPdf;
pub use coords::top_left_to_pdf;
pub use error::PdfError;
pub use parser::PdfDocument;
