/// Error types for document editing operations.
use thiserror::Error;

/// Result type for document editing operations.
pub type Result<T> = std::result::Result<T, DocxError>;

/// Error types for document editing operations.
#[derive(Error, Debug)]
pub enum DocxError {
    /// Expected package part missing (e.g. `word/document.xml`)
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// XML parsing or serialization error
    #[error("XML error: {0}")]
    Xml(String),

    /// Caller-supplied arguments missing required combinations
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl From<quick_xml::Error> for DocxError {
    fn from(err: quick_xml::Error) -> Self {
        DocxError::Xml(err.to_string())
    }
}

impl From<std::str::Utf8Error> for DocxError {
    fn from(err: std::str::Utf8Error) -> Self {
        DocxError::Xml(format!("Invalid UTF-8 in XML content: {}", err))
    }
}
