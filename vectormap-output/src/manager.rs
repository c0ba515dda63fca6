use std::fs;
use std::path::{Component, Path};

use vectormap_core::Assessment;

use crate::config::{OutputConfig, OutputFormat};
use crate::graph::{DotFormatter, GraphJsonFormatter, GraphMlFormatter};
use crate::json::JsonFormatter;
use crate::stdout::StdoutFormatter;
use crate::traits::{OutputError, OutputFormatter};
use crate::yaml::YamlFormatter;

fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    for component in path.components() {
        if matches!(component, Component::ParentDir) {
            return Err(OutputError::FormatError(format!(
                "output path '{}' must not contain '..' components",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Coordinates output to stdout and/or multiple file destinations.
pub struct OutputManager {
    config: OutputConfig,
    show_paths: bool,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            show_paths: false,
        }
    }

    /// Include node paths in the text report.
    pub fn with_paths(mut self, show_paths: bool) -> Self {
        self.show_paths = show_paths;
        self
    }

    /// Format the assessment and write it to every configured destination.
    pub fn run(&self, assessment: &Assessment) -> Result<(), OutputError> {
        if self.config.stdout {
            let output = self.formatter_for(self.config.stdout_format).format(assessment)?;
            print!("{output}");
        }

        for spec in &self.config.outputs {
            validate_output_path(&spec.path)?;
            let output = self.formatter_for(spec.format).format(assessment)?;
            fs::write(&spec.path, &output).map_err(|e| {
                OutputError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to write {}: {}", spec.path.display(), e),
                ))
            })?;
        }

        Ok(())
    }

    fn formatter_for(&self, format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Normal => Box::new(StdoutFormatter::new(self.show_paths)),
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::Yaml => Box::new(YamlFormatter),
            OutputFormat::Dot => Box::new(DotFormatter),
            OutputFormat::GraphMl => Box::new(GraphMlFormatter),
            OutputFormat::GraphJson => Box::new(GraphJsonFormatter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputSpec;
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;
    use vectormap_core::assess;
    use vectormap_graph::AnalysisConfig;
    use vectormap_types::{FindingsSnapshot, HostRecord, VulnerabilityRecord};

    fn make_assessment(include_graph: bool) -> Assessment {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1));
        let snapshot = FindingsSnapshot {
            hosts: vec![HostRecord::new(ip)],
            vulnerabilities: vec![
                VulnerabilityRecord::cve(ip, "CVE-2021-41773", 7.5).on_port(80),
                VulnerabilityRecord::cve(ip, "CVE-2021-42013", 9.8).on_port(80),
            ],
            ..Default::default()
        };
        let config = AnalysisConfig {
            include_graph,
            ..Default::default()
        };
        assess(&snapshot, &config)
    }

    #[test]
    fn manager_stdout_only() {
        let config = OutputConfig {
            stdout: true,
            ..Default::default()
        };
        OutputManager::new(config)
            .run(&make_assessment(false))
            .unwrap();
    }

    #[test]
    fn manager_json_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assessment.json");
        let config = OutputConfig {
            outputs: vec![OutputSpec {
                format: OutputFormat::Json,
                path: path.clone(),
            }],
            ..Default::default()
        };
        OutputManager::new(config)
            .run(&make_assessment(false))
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["stats"]["vulnerabilities"], 2);
    }

    #[test]
    fn manager_all_formats_output() {
        let dir = tempfile::tempdir().unwrap();
        let basename = dir.path().join("run");
        let config = OutputConfig {
            outputs: OutputConfig::expand_all_formats(&basename.to_string_lossy()),
            ..Default::default()
        };
        assert!(config.needs_graph());
        OutputManager::new(config)
            .with_paths(true)
            .run(&make_assessment(true))
            .unwrap();

        let read = |ext: &str| fs::read_to_string(dir.path().join(format!("run.{ext}"))).unwrap();

        assert!(read("txt").contains("path: vuln:192.168.1.1:80:CVE-2021-41773"));
        let _: serde_json::Value = serde_json::from_str(&read("json")).unwrap();
        let _: serde_yaml::Value = serde_yaml::from_str(&read("yaml")).unwrap();
        assert!(read("dot").starts_with("digraph attack_graph {"));
        assert!(read("graphml").contains("</graphml>"));
        let graph: serde_json::Value = serde_json::from_str(&read("graph.json")).unwrap();
        assert_eq!(graph["nodes"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn graph_output_without_graph_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = OutputConfig {
            outputs: vec![OutputSpec {
                format: OutputFormat::Dot,
                path: dir.path().join("attack.dot"),
            }],
            ..Default::default()
        };
        let err = OutputManager::new(config)
            .run(&make_assessment(false))
            .unwrap_err();
        assert!(matches!(err, OutputError::FormatError(_)));
    }

    #[test]
    fn parent_dir_components_are_rejected() {
        let config = OutputConfig {
            outputs: vec![OutputSpec {
                format: OutputFormat::Json,
                path: PathBuf::from("../escape.json"),
            }],
            ..Default::default()
        };
        let err = OutputManager::new(config)
            .run(&make_assessment(false))
            .unwrap_err();
        assert!(err.to_string().contains("must not contain '..'"));
    }
}
