use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush export: {0}")]
    Flush(String),

    #[error("Export is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
