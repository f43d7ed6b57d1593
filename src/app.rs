// Declare modules
pub mod archiver;
pub mod cleaner;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod formatter;
pub mod models;
pub mod scanner;
pub mod writer;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::env;
use std::path::Path;

use self::archiver::Archiver;
use self::cli::Cli;
use self::config::{load_presets_file, resolve_config};
use self::formatter::OutputGenerator;
use self::models::{ProjectTree, RuntimeConfig, Task};
use self::scanner::Scanner;
use self::writer::write_atomic;

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    // 2. Identify Project Root
    let root = match &args.root {
        Some(root) => root.clone(),
        None => env::current_dir().context("Failed to get current directory")?,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve root {}", root.display()))?;

    // 3. Resolve Configuration
    let presets = load_presets_file()?;
    let config = resolve_config(args, root, &presets, Local::now())?;

    // 4. Scan Directory
    let scanner = Scanner::new(config.root.clone(), config.rules.clone(), config.walk.clone())?;
    let (tree, report) = scanner.scan();
    log::info!(
        "📂 Scanned {} directories: {} files selected, {} skipped",
        report.dirs_visited,
        report.files_included,
        report.files_skipped
    );
    if report.walk_errors > 0 {
        log::warn!("⚠️ {} entries could not be read while walking.", report.walk_errors);
    }

    // 5. Produce the artifact
    match &config.task {
        Task::Concat {
            output,
            tree_only,
            to_stdout,
        } => run_concat(&tree, output, *tree_only, *to_stdout),
        Task::Archive { archive_name } => run_archive(&config, &tree, archive_name),
    }
}

fn run_concat(tree: &ProjectTree, output: &Path, tree_only: bool, to_stdout: bool) -> Result<()> {
    if tree.file_count() == 0 {
        log::warn!("⚠️ No files matched the allow-list.");
    }

    let tree_str = OutputGenerator::generate_tree(tree);
    let final_output = if tree_only {
        tree_str
    } else {
        let (content_str, failures) = OutputGenerator::generate_content(tree);
        if failures > 0 {
            log::warn!("⚠️ {} files could not be read; markers were written instead.", failures);
        }
        OutputGenerator::format_full_output(&tree_str, &content_str)
    };

    if to_stdout {
        print!("{}", final_output);
        return Ok(());
    }

    write_atomic(output, final_output.as_bytes())?;
    log::info!(
        "✅ {} files written to {}",
        tree.file_count(),
        output.display()
    );
    Ok(())
}

fn run_archive(config: &RuntimeConfig, tree: &ProjectTree, archive_name: &str) -> Result<()> {
    log::info!("📦 Creating archive {}", archive_name);
    let (path, count) = Archiver::new(config.root.clone())
        .write(tree, archive_name)
        .context("Archive creation failed")?;
    log::info!("✅ {} files archived into {}", count, path.display());
    Ok(())
}
