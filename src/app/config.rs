use crate::app::archiver::archive_name;
use crate::app::cli::{Cli, Command, ConcatArgs, WalkArgs};
use crate::app::models::{ExclusionRules, RuntimeConfig, Task, WalkOptions, DEFAULT_OUTPUT_FILE};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Debug)]
struct PresetsFile {
    #[serde(flatten)]
    presets: HashMap<String, PresetConfig>,
}

/// Per-project additions to the compiled-in rules.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetConfig {
    pub ignore_dirs: Option<Vec<String>>,
    pub ignore_files: Option<Vec<String>>,
    pub allow: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

/// Loads `~/.config/code_bundle/presets.toml`; a missing file means no presets.
pub fn load_presets_file() -> Result<HashMap<String, PresetConfig>> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let config_path = home
        .join(".config")
        .join("code_bundle")
        .join("presets.toml");

    if !config_path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(&config_path)
        .context(format!("Failed to read config at {:?}", config_path))?;
    parse_presets(&content)
}

pub fn parse_presets(content: &str) -> Result<HashMap<String, PresetConfig>> {
    let parsed: PresetsFile = toml::from_str(content).context("Failed to parse presets.toml")?;
    Ok(parsed.presets)
}

fn merge_vecs(preset_vec: Option<Vec<String>>, cli_vec: Option<Vec<String>>) -> Vec<String> {
    let mut combined = preset_vec.unwrap_or_default();
    if let Some(mut cli_items) = cli_vec {
        combined.append(&mut cli_items);
    }
    // Deduplicate while keeping order
    let mut seen = std::collections::HashSet::new();
    combined.retain(|item| seen.insert(item.clone()));
    combined
}

/// Builds the immutable run configuration.
///
/// The preset is picked by `--preset`, falling back to the root's folder
/// name. Preset and CLI values extend the compiled-in defaults.
pub fn resolve_config(
    cli: Cli,
    root: PathBuf,
    presets: &HashMap<String, PresetConfig>,
    now: DateTime<Local>,
) -> Result<RuntimeConfig> {
    let project_name = root.file_name().and_then(|n| n.to_str());
    let preset_key = cli.preset.as_deref().or(project_name);
    let preset = preset_key
        .and_then(|k| presets.get(k))
        .cloned()
        .unwrap_or_default();

    if let Some(name) = cli.preset.as_deref() {
        if !presets.contains_key(name) {
            log::warn!("💡 Preset '{}' not found, using built-in rules only.", name);
        }
    }

    let config = match cli.command.unwrap_or_else(|| Command::Concat(ConcatArgs::default())) {
        Command::Concat(args) => {
            let output = resolve_output(&root, args.output);
            let mut ignore_files = merge_vecs(preset.ignore_files.clone(), args.walk.ignore_files.clone());
            if let Some(name) = output.file_name().and_then(|n| n.to_str()) {
                ignore_files.push(name.to_string());
            }

            let rules = ExclusionRules::concat_defaults()
                .with_ignored_dirs(merge_vecs(preset.ignore_dirs.clone(), args.walk.ignore_dirs.clone()))
                .with_ignored_files(ignore_files)
                .with_allowed_suffixes(merge_vecs(preset.allow.clone(), args.allow));

            RuntimeConfig {
                rules,
                walk: walk_options(&preset, args.walk),
                task: Task::Concat {
                    output,
                    tree_only: args.tree,
                    to_stdout: args.stdout,
                },
                root,
            }
        }
        Command::Archive(args) => {
            let archive_name = archive_name(now);
            let rules = ExclusionRules::archive_defaults()
                .with_ignored_dirs(merge_vecs(preset.ignore_dirs.clone(), args.walk.ignore_dirs.clone()))
                .with_ignored_files(merge_vecs(preset.ignore_files.clone(), args.walk.ignore_files.clone()))
                .with_ignored_files([archive_name.clone()]);

            RuntimeConfig {
                rules,
                walk: walk_options(&preset, args.walk),
                task: Task::Archive { archive_name },
                root,
            }
        }
    };

    Ok(config)
}

fn walk_options(preset: &PresetConfig, args: WalkArgs) -> WalkOptions {
    WalkOptions {
        max_depth: args.max_depth,
        follow_symlinks: args.follow_symlinks,
        exclude: merge_vecs(preset.exclude.clone(), args.exclude),
    }
}

fn resolve_output(root: &Path, output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| root.join(DEFAULT_OUTPUT_FILE))
}
