use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use clap::parser::ValueSource;
use serde::{Deserialize, Serialize};

use crate::args::Args;

/// An engine profile that can be serialized to/from TOML.
///
/// `None` means "use the CLI default". A `Some` value is applied only when
/// the user did not pass that flag on the command line.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EngineProfile {
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    // --- Graph ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relatedness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,

    // --- Ranking ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_vectors: Option<usize>,

    // --- Output preferences ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_paths: Option<bool>,
}

// ---------------------------------------------------------------------------
// Built-in profiles
// ---------------------------------------------------------------------------

/// Names of built-in profiles that cannot be overwritten by users.
const BUILTIN_NAMES: &[&str] = &["default", "thorough", "triage"];

fn builtin_profiles() -> Vec<(&'static str, EngineProfile)> {
    vec![
        (
            "default",
            EngineProfile {
                description: Some("Forward relatedness edges, every vector reported".into()),
                relatedness: Some("forward".into()),
                ..Default::default()
            },
        ),
        (
            "thorough",
            EngineProfile {
                description: Some(
                    "Bidirectional relatedness, parallel path search, full node paths".into(),
                ),
                relatedness: Some("bidirectional".into()),
                parallel: Some(true),
                show_paths: Some(true),
                ..Default::default()
            },
        ),
        (
            "triage",
            EngineProfile {
                description: Some("Top 10 vectors with confidence of at least 0.6".into()),
                min_confidence: Some(0.6),
                max_vectors: Some(10),
                ..Default::default()
            },
        ),
    ]
}

// ---------------------------------------------------------------------------
// Profile directory
// ---------------------------------------------------------------------------

fn profiles_dir() -> PathBuf {
    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("vectormap").join("profiles")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".vectormap").join("profiles")
    }
}

/// Validate that a profile name is safe (no path traversal).
fn validate_profile_name(name: &str) -> Result<()> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        bail!(
            "invalid profile name: {name:?} (only alphanumeric, hyphens, underscores, and dots allowed)"
        );
    }
    if name.contains("..") {
        bail!("invalid profile name: {name:?} (contains '..')");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Load a profile by name. Built-in profiles win over user TOML files.
pub fn load_profile(name: &str) -> Result<EngineProfile> {
    load_profile_from(&profiles_dir(), name)
}

fn load_profile_from(dir: &Path, name: &str) -> Result<EngineProfile> {
    validate_profile_name(name)?;

    if let Some((_, profile)) = builtin_profiles().into_iter().find(|(n, _)| *n == name) {
        return Ok(profile);
    }

    let path = dir.join(format!("{name}.toml"));
    if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read profile '{}'", path.display()))?;
        let profile: EngineProfile = toml::from_str(&content)
            .with_context(|| format!("failed to parse profile '{}'", path.display()))?;
        return Ok(profile);
    }

    bail!("unknown profile '{name}'. Use --list-profiles to see available profiles.");
}

/// Save the current CLI arguments as a named user profile.
pub fn save_profile(name: &str, profile: &EngineProfile) -> Result<PathBuf> {
    save_profile_to(&profiles_dir(), name, profile)
}

fn save_profile_to(dir: &Path, name: &str, profile: &EngineProfile) -> Result<PathBuf> {
    validate_profile_name(name)?;

    if BUILTIN_NAMES.contains(&name) {
        bail!("cannot overwrite built-in profile '{name}'");
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create profiles directory: {}", dir.display()))?;

    let path = dir.join(format!("{name}.toml"));
    let content =
        toml::to_string_pretty(profile).context("failed to serialize profile to TOML")?;
    std::fs::write(&path, content)
        .with_context(|| format!("failed to write profile to {}", path.display()))?;

    Ok(path)
}

/// List all available profiles as (name, profile, is_builtin).
pub fn list_all_profiles() -> Vec<(String, EngineProfile, bool)> {
    list_profiles_in(&profiles_dir())
}

fn list_profiles_in(dir: &Path) -> Vec<(String, EngineProfile, bool)> {
    let mut profiles: Vec<_> = builtin_profiles()
        .into_iter()
        .map(|(name, profile)| (name.to_string(), profile, true))
        .collect();

    let Ok(entries) = std::fs::read_dir(dir) else {
        return profiles;
    };
    let mut user = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "toml") {
            continue;
        }
        let name = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        if BUILTIN_NAMES.contains(&name.as_str()) {
            continue;
        }
        if let Ok(content) = std::fs::read_to_string(&path)
            && let Ok(profile) = toml::from_str::<EngineProfile>(&content)
        {
            user.push((name, profile, false));
        }
    }
    user.sort_by(|a, b| a.0.cmp(&b.0));
    profiles.extend(user);
    profiles
}

/// Print formatted profile list to stdout.
pub fn show_profiles() -> Result<()> {
    println!("Available engine profiles:\n");
    for (name, profile, is_builtin) in &list_all_profiles() {
        let tag = if *is_builtin { "[built-in]" } else { "[user]" };
        let desc = profile
            .description
            .as_deref()
            .unwrap_or("(no description)");
        println!("  {name:<20} {tag:<12} {desc}");
    }

    println!(
        "\nUsage: vectormap --profile <NAME> <FINDINGS>\n\
         Save:  vectormap --save-profile <NAME> [options]"
    );

    Ok(())
}

/// Apply a profile's settings to an `Args` struct, leaving flags the user
/// passed explicitly untouched.
pub fn apply_profile_with_matches(
    profile: &EngineProfile,
    args: &mut Args,
    matches: &ArgMatches,
) {
    let not_set = |id: &str| -> bool {
        matches
            .value_source(id)
            .is_none_or(|s| s != ValueSource::CommandLine)
    };

    if let Some(ref v) = profile.relatedness
        && not_set("relatedness")
    {
        args.relatedness = v.clone();
    }
    if let Some(v) = profile.parallel
        && not_set("parallel")
    {
        args.parallel = v;
    }
    if let Some(v) = profile.min_confidence
        && not_set("min_confidence")
    {
        args.min_confidence = v;
    }
    if let Some(v) = profile.max_vectors
        && not_set("max_vectors")
    {
        args.max_vectors = Some(v);
    }
    if let Some(ref v) = profile.format
        && not_set("format")
    {
        args.format = v.clone();
    }
    if let Some(v) = profile.show_paths
        && not_set("show_paths")
    {
        args.show_paths = v;
    }
}

/// Convert current CLI args to an `EngineProfile` (for `--save-profile`).
pub fn args_to_profile(args: &Args) -> EngineProfile {
    EngineProfile {
        description: None,
        relatedness: Some(args.relatedness.clone()),
        parallel: Some(args.parallel),
        min_confidence: (args.min_confidence > 0.0).then_some(args.min_confidence),
        max_vectors: args.max_vectors,
        format: (args.format != "normal").then(|| args.format.clone()),
        show_paths: Some(args.show_paths),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};

    #[test]
    fn builtin_profiles_all_valid() {
        let profiles = builtin_profiles();
        assert_eq!(profiles.len(), BUILTIN_NAMES.len());
        for (name, profile) in &profiles {
            assert!(
                BUILTIN_NAMES.contains(name),
                "profile '{name}' not in BUILTIN_NAMES"
            );
            assert!(
                profile.description.is_some(),
                "profile '{name}' missing description"
            );
        }
    }

    #[test]
    fn load_builtin_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let profile = load_profile_from(dir.path(), "triage").unwrap();
        assert_eq!(profile.min_confidence, Some(0.6));
        assert_eq!(profile.max_vectors, Some(10));
        assert!(profile.relatedness.is_none());
    }

    #[test]
    fn load_unknown_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_profile_from(dir.path(), "nonexistent-profile-xyz").unwrap_err();
        assert!(err.to_string().contains("unknown profile"));
    }

    #[test]
    fn traversal_names_are_rejected() {
        assert!(validate_profile_name("../etc/passwd").is_err());
        assert!(validate_profile_name("a..b").is_err());
        assert!(validate_profile_name("").is_err());
        assert!(validate_profile_name("web_v2.1").is_ok());
    }

    #[test]
    fn cannot_overwrite_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_profile_to(dir.path(), "thorough", &EngineProfile::default()).unwrap_err();
        assert!(err.to_string().contains("cannot overwrite built-in"));
    }

    #[test]
    fn save_and_load_user_profile() {
        let dir = tempfile::tempdir().unwrap();
        let profile = EngineProfile {
            description: Some("Nightly".into()),
            relatedness: Some("bidirectional".into()),
            max_vectors: Some(25),
            ..Default::default()
        };

        let path = save_profile_to(dir.path(), "nightly", &profile).unwrap();
        assert!(path.ends_with("nightly.toml"));

        let loaded = load_profile_from(dir.path(), "nightly").unwrap();
        assert_eq!(loaded, profile);
        assert!(loaded.parallel.is_none());
    }

    #[test]
    fn list_includes_builtins_then_user_profiles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("zeta.toml"), "max_vectors = 3\n").unwrap();
        std::fs::write(dir.path().join("alpha.toml"), "parallel = true\n").unwrap();
        std::fs::write(dir.path().join("triage.toml"), "max_vectors = 1\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("broken.toml"), "max_vectors = \"x\"").unwrap();

        let names: Vec<(String, bool)> = list_profiles_in(dir.path())
            .into_iter()
            .map(|(n, _, builtin)| (n, builtin))
            .collect();
        assert_eq!(
            names,
            vec![
                ("default".to_string(), true),
                ("thorough".to_string(), true),
                ("triage".to_string(), true),
                ("alpha".to_string(), false),
                ("zeta".to_string(), false),
            ]
        );
    }

    #[test]
    fn apply_sets_unset_values() {
        let profile = EngineProfile {
            relatedness: Some("bidirectional".into()),
            min_confidence: Some(0.6),
            show_paths: Some(true),
            ..Default::default()
        };

        let matches = Args::command().get_matches_from(["vectormap", "findings.json"]);
        let mut args = Args::from_arg_matches(&matches).unwrap();

        apply_profile_with_matches(&profile, &mut args, &matches);

        assert_eq!(args.relatedness, "bidirectional");
        assert_eq!(args.min_confidence, 0.6);
        assert!(args.show_paths);
    }

    #[test]
    fn apply_does_not_override_explicit() {
        let profile = EngineProfile {
            relatedness: Some("bidirectional".into()),
            max_vectors: Some(10),
            ..Default::default()
        };

        let matches = Args::command().get_matches_from([
            "vectormap",
            "--relatedness",
            "forward",
            "--max-vectors",
            "3",
            "findings.json",
        ]);
        let mut args = Args::from_arg_matches(&matches).unwrap();

        apply_profile_with_matches(&profile, &mut args, &matches);

        assert_eq!(args.relatedness, "forward");
        assert_eq!(args.max_vectors, Some(3));
    }

    #[test]
    fn args_to_profile_captures_settings() {
        let matches = Args::command().get_matches_from([
            "vectormap",
            "--parallel",
            "--min-confidence",
            "0.7",
            "--format",
            "json",
            "findings.json",
        ]);
        let args = Args::from_arg_matches(&matches).unwrap();
        let profile = args_to_profile(&args);

        assert_eq!(profile.relatedness.as_deref(), Some("forward"));
        assert_eq!(profile.parallel, Some(true));
        assert_eq!(profile.min_confidence, Some(0.7));
        assert_eq!(profile.format.as_deref(), Some("json"));
        assert_eq!(profile.show_paths, Some(false));
        assert!(profile.max_vectors.is_none());
    }
}
