use clap::Parser;

/// vectormap: ranked attack vectors from scan findings
#[derive(Parser, Debug)]
#[command(
    name = "vectormap",
    version,
    about = "Attack-surface graph analysis of host, vulnerability and exploitation findings"
)]
pub struct Args {
    /// Findings snapshot (JSON). Use "-" to read from stdin.
    #[arg(value_name = "FINDINGS", required_unless_present_any = ["list_profiles", "save_profile"])]
    pub input: Option<String>,

    // --- Analysis ---
    /// Relatedness edge direction between vulnerabilities
    #[arg(long = "relatedness", value_name = "MODE", default_value = "forward", value_parser = ["forward", "bidirectional"])]
    pub relatedness: String,

    /// Search attack paths on all cores
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Drop vectors whose confidence is below this value (0.0-1.0)
    #[arg(long = "min-confidence", value_name = "C", default_value = "0.0", value_parser = parse_confidence)]
    pub min_confidence: f64,

    /// Report at most N vectors
    #[arg(long = "max-vectors", value_name = "N")]
    pub max_vectors: Option<usize>,

    // --- Output ---
    /// Format printed to stdout
    #[arg(long = "format", value_name = "FORMAT", default_value = "normal", value_parser = ["normal", "json", "yaml", "dot", "graphml", "graph-json"])]
    pub format: String,

    /// List the node ids of each vector in the text report
    #[arg(long = "show-paths")]
    pub show_paths: bool,

    /// Do not print to stdout
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Normal output to file
    #[arg(long = "oN", value_name = "FILE")]
    pub output_normal: Option<String>,

    /// JSON output to file
    #[arg(long = "oJ", value_name = "FILE")]
    pub output_json: Option<String>,

    /// YAML output to file
    #[arg(long = "oY", value_name = "FILE")]
    pub output_yaml: Option<String>,

    /// Attack graph as Graphviz DOT to file
    #[arg(long = "oD", value_name = "FILE")]
    pub output_dot: Option<String>,

    /// Attack graph as GraphML to file
    #[arg(long = "oG", value_name = "FILE")]
    pub output_graphml: Option<String>,

    /// Attack graph as JSON to file
    #[arg(long = "oGJ", value_name = "FILE")]
    pub output_graph_json: Option<String>,

    /// Output in all formats (basename.txt, .json, .yaml, .dot, .graphml, .graph.json)
    #[arg(long = "oA", value_name = "BASENAME")]
    pub output_all: Option<String>,

    // --- Profiles ---
    /// Use a named engine profile (built-in or user-defined)
    #[arg(long = "profile", value_name = "NAME")]
    pub profile: Option<String>,

    /// Save current CLI arguments as a named profile
    #[arg(long = "save-profile", value_name = "NAME")]
    pub save_profile: Option<String>,

    /// List available profiles and exit
    #[arg(long = "list-profiles")]
    pub list_profiles: bool,

    /// Increase verbosity level (use -v, -vv or -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_confidence(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("confidence must be within 0.0-1.0, got {value}"));
    }
    Ok(value)
}
