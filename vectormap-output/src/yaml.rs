use crate::traits::{OutputError, OutputFormatter};
use vectormap_core::Assessment;

pub struct YamlFormatter;

impl OutputFormatter for YamlFormatter {
    fn format(&self, assessment: &Assessment) -> Result<String, OutputError> {
        serde_yaml::to_string(assessment)
            .map_err(|e| OutputError::FormatError(format!("YAML serialization error: {e}")))
    }
}
