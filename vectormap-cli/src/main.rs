mod args;
mod profiles;

use std::io::Read;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, FromArgMatches};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::Args;
use vectormap_core::assess;
use vectormap_graph::{AnalysisConfig, RelatednessEdges};
use vectormap_output::{OutputConfig, OutputFormat, OutputManager, OutputSpec};
use vectormap_types::FindingsSnapshot;

fn main() -> Result<()> {
    let matches = Args::command().get_matches();
    let mut args = Args::from_arg_matches(&matches).map_err(|e| anyhow::anyhow!(e))?;

    if args.list_profiles {
        return profiles::show_profiles();
    }

    if let Some(ref name) = args.profile {
        let profile = profiles::load_profile(name)
            .with_context(|| format!("failed to load profile '{name}'"))?;
        profiles::apply_profile_with_matches(&profile, &mut args, &matches);
    }

    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(ref name) = args.profile {
        info!(profile = %name, "using engine profile");
    }

    if let Some(ref name) = args.save_profile {
        let path = profiles::save_profile(name, &profiles::args_to_profile(&args))?;
        eprintln!("Profile '{name}' saved to {}", path.display());
        if args.input.is_none() {
            return Ok(());
        }
    }

    if !(0.0..=1.0).contains(&args.min_confidence) {
        bail!(
            "min_confidence must be within 0.0-1.0, got {}",
            args.min_confidence
        );
    }

    let Some(ref input) = args.input else {
        bail!("no findings snapshot given");
    };
    let snapshot = read_snapshot(input)?;

    let output_config = build_output_config(&args)?;
    if !output_config.stdout && output_config.outputs.is_empty() {
        warn!("--quiet given without any file output; nothing will be written");
    }

    let config = AnalysisConfig {
        relatedness: parse_relatedness(&args.relatedness)?,
        parallel: args.parallel,
        min_confidence: args.min_confidence,
        max_vectors: args.max_vectors,
        include_graph: output_config.needs_graph(),
    };

    let mut assessment = assess(&snapshot, &config);
    assessment.generated_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs());
    info!(
        vectors = assessment.vectors.len(),
        risk_score = assessment.risk_score,
        "assessment complete"
    );

    OutputManager::new(output_config)
        .with_paths(args.show_paths)
        .run(&assessment)
        .context("failed to write output")?;

    Ok(())
}

/// Read a findings snapshot from a file, or stdin when `input` is "-".
fn read_snapshot(input: &str) -> Result<FindingsSnapshot> {
    let content = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read findings from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read findings file '{input}'"))?
    };
    parse_snapshot(&content).with_context(|| format!("invalid findings snapshot '{input}'"))
}

fn parse_snapshot(content: &str) -> Result<FindingsSnapshot> {
    Ok(serde_json::from_str(content)?)
}

fn parse_relatedness(value: &str) -> Result<RelatednessEdges> {
    match value {
        "forward" => Ok(RelatednessEdges::Forward),
        "bidirectional" => Ok(RelatednessEdges::Bidirectional),
        other => bail!("unknown relatedness mode '{other}' (expected forward or bidirectional)"),
    }
}

fn parse_format(value: &str) -> Result<OutputFormat> {
    match value {
        "normal" => Ok(OutputFormat::Normal),
        "json" => Ok(OutputFormat::Json),
        "yaml" => Ok(OutputFormat::Yaml),
        "dot" => Ok(OutputFormat::Dot),
        "graphml" => Ok(OutputFormat::GraphMl),
        "graph-json" => Ok(OutputFormat::GraphJson),
        other => bail!("unknown output format '{other}'"),
    }
}

pub(crate) fn build_output_config(args: &Args) -> Result<OutputConfig> {
    let mut outputs: Vec<OutputSpec> = [
        (&args.output_normal, OutputFormat::Normal),
        (&args.output_json, OutputFormat::Json),
        (&args.output_yaml, OutputFormat::Yaml),
        (&args.output_dot, OutputFormat::Dot),
        (&args.output_graphml, OutputFormat::GraphMl),
        (&args.output_graph_json, OutputFormat::GraphJson),
    ]
    .into_iter()
    .filter_map(|(path, format)| {
        path.as_ref().map(|path| OutputSpec {
            format,
            path: PathBuf::from(path),
        })
    })
    .collect();
    if let Some(ref basename) = args.output_all {
        outputs.extend(OutputConfig::expand_all_formats(basename));
    }

    Ok(OutputConfig {
        outputs,
        stdout: !args.quiet,
        stdout_format: parse_format(&args.format)?,
    })
}
