use thiserror::Error;

/// Failures of the document model contract
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Operation not supported by this document model: {0}")]
    Unsupported(&'static str),

    #[error("Invalid page layout: {0}")]
    Layout(String),

    #[error("Page {0} is out of range")]
    PageOutOfRange(usize),

    #[error("Failed to place annotation: {0}")]
    Annotation(String),

    #[error("Text search failed: {0}")]
    Search(String),

    #[error("Failed to save document: {0}")]
    Save(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single checker. Caught by the engine, never aborts a run.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Text extraction failed on page {page}: {reason}")]
    Extraction { page: u32, reason: String },

    #[error("Annotation failed on page {page}: {reason}")]
    Annotation { page: u32, reason: String },

    #[error("No table detector configured")]
    MissingTableDetector,

    #[error("Table detection failed on page {page}: {reason}")]
    TableDetection { page: u32, reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Failures that make the whole run impossible
#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("Document cannot be decoded: {0}")]
    FatalDecode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
