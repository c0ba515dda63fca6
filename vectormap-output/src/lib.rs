pub mod config;
pub mod graph;
pub mod json;
pub mod manager;
pub mod stdout;
pub mod traits;
pub mod yaml;

pub use config::{OutputConfig, OutputFormat, OutputSpec};
pub use graph::{DotFormatter, GraphJsonFormatter, GraphMlFormatter};
pub use json::JsonFormatter;
pub use manager::OutputManager;
pub use stdout::StdoutFormatter;
pub use traits::{OutputError, OutputFormatter};
pub use yaml::YamlFormatter;
