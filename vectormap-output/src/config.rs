use std::path::PathBuf;

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report.
    #[default]
    Normal,
    Json,
    Yaml,
    /// Attack graph as Graphviz DOT.
    Dot,
    /// Attack graph as GraphML.
    GraphMl,
    /// Attack graph nodes and edges as JSON.
    GraphJson,
}

impl OutputFormat {
    /// Formats that render the attack graph rather than the report.
    pub fn needs_graph(self) -> bool {
        matches!(
            self,
            OutputFormat::Dot | OutputFormat::GraphMl | OutputFormat::GraphJson
        )
    }
}

/// A single output destination: format + file path.
#[derive(Debug, Clone)]
pub struct OutputSpec {
    pub format: OutputFormat,
    pub path: PathBuf,
}

/// Configuration for output destinations.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// File outputs (--oN, --oJ, --oY, --oD, --oG, --oA).
    pub outputs: Vec<OutputSpec>,
    /// Print to stdout.
    pub stdout: bool,
    /// Format used for stdout.
    pub stdout_format: OutputFormat,
}

impl OutputConfig {
    /// Expand an `--oA <basename>` into one output spec per format.
    pub fn expand_all_formats(basename: &str) -> Vec<OutputSpec> {
        [
            (OutputFormat::Normal, "txt"),
            (OutputFormat::Json, "json"),
            (OutputFormat::Yaml, "yaml"),
            (OutputFormat::Dot, "dot"),
            (OutputFormat::GraphMl, "graphml"),
            (OutputFormat::GraphJson, "graph.json"),
        ]
        .into_iter()
        .map(|(format, ext)| OutputSpec {
            format,
            path: PathBuf::from(format!("{basename}.{ext}")),
        })
        .collect()
    }

    /// Whether any destination needs the attack graph attached.
    pub fn needs_graph(&self) -> bool {
        (self.stdout && self.stdout_format.needs_graph())
            || self.outputs.iter().any(|o| o.format.needs_graph())
    }
}
