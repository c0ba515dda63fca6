use vectormap_core::Assessment;

/// Trait for rendering an assessment in one output format.
pub trait OutputFormatter: Send + Sync {
    fn format(&self, assessment: &Assessment) -> Result<String, OutputError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("formatting error: {0}")]
    FormatError(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
