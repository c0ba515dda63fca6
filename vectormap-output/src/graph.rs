// ---------------------------------------------------------------------------
// Attack graph formatters
// ---------------------------------------------------------------------------
//
// Render the graph view carried by an assessment. The view is only present
// when the analysis was run with `include_graph`.

use vectormap_core::Assessment;
use vectormap_graph::{GraphView, format_dot, format_graphml, format_json_graph};

use crate::traits::{OutputError, OutputFormatter};

fn graph_view(assessment: &Assessment) -> Result<&GraphView, OutputError> {
    assessment.graph.as_ref().ok_or_else(|| {
        OutputError::FormatError("assessment was produced without an attack graph".into())
    })
}

pub struct DotFormatter;

impl OutputFormatter for DotFormatter {
    fn format(&self, assessment: &Assessment) -> Result<String, OutputError> {
        Ok(format_dot(graph_view(assessment)?))
    }
}

pub struct GraphMlFormatter;

impl OutputFormatter for GraphMlFormatter {
    fn format(&self, assessment: &Assessment) -> Result<String, OutputError> {
        Ok(format_graphml(graph_view(assessment)?))
    }
}

pub struct GraphJsonFormatter;

impl OutputFormatter for GraphJsonFormatter {
    fn format(&self, assessment: &Assessment) -> Result<String, OutputError> {
        format_json_graph(graph_view(assessment)?)
            .map_err(|e| OutputError::FormatError(format!("JSON serialization error: {e}")))
    }
}
