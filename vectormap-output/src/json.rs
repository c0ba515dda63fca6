use crate::traits::{OutputError, OutputFormatter};
use vectormap_core::Assessment;

/// Formats the assessment as pretty-printed JSON.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(&self, assessment: &Assessment) -> Result<String, OutputError> {
        serde_json::to_string_pretty(assessment)
            .map_err(|e| OutputError::FormatError(format!("JSON serialization error: {e}")))
    }
}
