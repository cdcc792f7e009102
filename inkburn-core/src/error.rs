use thiserror::Error;

#[derive(Error, Debug)]
pub enum BurnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Encrypted PDFs are not supported")]
    EncryptedUnsupported,

    #[error("Invalid page tree: {0}")]
    InvalidPageTree(String),

    #[error("Invalid page box on page {page}: {reason}")]
    InvalidPageBox { page: u32, reason: String },

    #[error("Invalid annotation record: {0}")]
    InvalidRecord(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BurnError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_burn_error_display() {
        let error = BurnError::InvalidPageTree("missing Pages".to_string());
        assert_eq!(error.to_string(), "Invalid page tree: missing Pages");

        let error = BurnError::InvalidPageBox {
            page: 3,
            reason: "zero width".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid page box on page 3: zero width");
    }

    #[test]
    fn test_burn_error_from_io_error() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let burn_error = BurnError::from(io_error);

        match burn_error {
            BurnError::Io(ref err) => {
                assert_eq!(err.kind(), ErrorKind::NotFound);
            }
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_burn_error_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let burn_error = BurnError::from(json_error);
        assert!(matches!(burn_error, BurnError::Json(_)));
        assert!(burn_error.to_string().starts_with("JSON error:"));
    }

    #[test]
    fn test_all_variants_display() {
        let errors = vec![
            BurnError::EncryptedUnsupported,
            BurnError::InvalidPageTree("tree".to_string()),
            BurnError::InvalidRecord("record".to_string()),
            BurnError::InvalidConfig("config".to_string()),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }
}
