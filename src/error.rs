use thiserror::Error;

pub type FdmResult<T> = Result<T, FdmError>;

#[derive(Error, Debug)]
pub enum FdmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read workbook {file}: {details}")]
    Decode { file: String, details: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("invalid formula in {cell} ({reason}): {formula}")]
    Formula {
        cell: String,
        formula: String,
        reason: String,
    },

    #[error("job cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("no files selected")]
    EmptyBatch,

    #[error("too many files: {count} selected, at most {max} per batch")]
    BatchTooLarge { count: usize, max: usize },

    #[error("no file could be extracted ({failed} failed)")]
    NoRecordsExtracted { failed: usize },
}
