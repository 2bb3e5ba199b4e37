use thiserror::Error;

pub type Result<T, E = OpError> = std::result::Result<T, E>;

/// Errors raised by page-selection resolution and the operation engine.
///
/// None of these are transient; the host decides whether a failure aborts a
/// batch or is recorded per item. The engine never retries.
#[derive(Debug, Error)]
pub enum OpError {
    #[error("invalid page selection term {term:?} (valid pages are 1-{page_count})")]
    InvalidPageSelection { term: String, page_count: usize },

    #[error("no pages selected")]
    NoPagesSelected,

    #[error("unsupported media type (expected {expected}, got {actual})")]
    UnsupportedMediaType {
        expected: &'static str,
        actual: String,
    },

    #[error("unsupported image format {mime_type:?} (expected image/png or image/jpeg)")]
    UnsupportedImageFormat { mime_type: String },

    #[error("operation needs at least {needed} input documents, got {got}")]
    InsufficientInputs { needed: usize, got: usize },

    #[error("missing binary input {field:?}")]
    MissingBinaryField { field: &'static str },

    #[error("invalid color {value:?} (expected 6 hex digits, e.g. ff8800)")]
    InvalidColor { value: String },

    #[error("invalid image scale {value} (must be a positive number)")]
    InvalidScale { value: f32 },

    /// Wraps failures from the PDF codec or the text-extraction library,
    /// e.g. corrupt or unparsable document bytes.
    #[error("PDF service failure: {0}")]
    ExternalService(String),
}

impl From<lopdf::Error> for OpError {
    fn from(err: lopdf::Error) -> Self {
        OpError::ExternalService(err.to_string())
    }
}

impl From<pdf_extract::OutputError> for OpError {
    fn from(err: pdf_extract::OutputError) -> Self {
        OpError::ExternalService(err.to_string())
    }
}

// Document serialization surfaces raw io errors.
impl From<std::io::Error> for OpError {
    fn from(err: std::io::Error) -> Self {
        OpError::ExternalService(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_map_to_external_service() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = OpError::from(io);
        match err {
            OpError::ExternalService(msg) => assert!(msg.contains("pipe closed")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lopdf_errors_map_to_external_service() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        let err = OpError::from(lopdf::Error::IO(io));
        assert!(matches!(err, OpError::ExternalService(_)));
    }
}
