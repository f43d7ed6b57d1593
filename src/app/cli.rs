use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Bundle a project's sources into one text file, or back it up as a zip"
)]
pub struct Cli {
    /// Project root to walk (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Use a named preset from presets.toml instead of the root's folder name
    #[arg(long, global = true)]
    pub preset: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Concatenate allowed files into one text file, prefixed by a tree (default)
    Concat(ConcatArgs),
    /// Zip the project into a timestamped archive
    Archive(ArchiveArgs),
}

/// Walk options shared by both commands.
#[derive(Args, Debug, Default, Clone)]
pub struct WalkArgs {
    /// Extra directory names to skip entirely
    #[arg(long = "ignore-dir", num_args = 1..)]
    pub ignore_dirs: Option<Vec<String>>,

    /// Extra file names to skip
    #[arg(long = "ignore-file", num_args = 1..)]
    pub ignore_files: Option<Vec<String>>,

    /// Glob patterns (relative to the root) for files or directories to exclude
    #[arg(long, num_args = 1..)]
    pub exclude: Option<Vec<String>>,

    /// Do not descend more than this many levels below the root
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Follow symbolic links (cycles are detected and skipped)
    #[arg(long)]
    pub follow_symlinks: bool,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ConcatArgs {
    /// Output file (defaults to tum_kodlar.txt in the root)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Extra extensions (".rs") or exact file names to include
    #[arg(long, num_args = 1..)]
    pub allow: Option<Vec<String>>,

    /// Show only the directory tree structure
    #[arg(long)]
    pub tree: bool,

    /// Print to stdout instead of writing the output file
    #[arg(long)]
    pub stdout: bool,

    #[command(flatten)]
    pub walk: WalkArgs,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ArchiveArgs {
    #[command(flatten)]
    pub walk: WalkArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_means_default_concat() {
        let cli = Cli::try_parse_from(["code_bundle"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.root.is_none());
    }

    #[test]
    fn test_concat_flags() {
        let cli = Cli::try_parse_from([
            "code_bundle",
            "concat",
            "--allow",
            ".rs",
            ".go",
            "--ignore-dir",
            "target",
            "--tree",
            "--root",
            "/tmp/project",
        ])
        .unwrap();

        assert_eq!(cli.root, Some(PathBuf::from("/tmp/project")));
        match cli.command {
            Some(Command::Concat(args)) => {
                assert_eq!(args.allow, Some(vec![".rs".to_string(), ".go".to_string()]));
                assert_eq!(args.walk.ignore_dirs, Some(vec!["target".to_string()]));
                assert!(args.tree);
                assert!(!args.stdout);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_archive_flags() {
        let cli = Cli::try_parse_from(["code_bundle", "archive", "--max-depth", "3"]).unwrap();
        match cli.command {
            Some(Command::Archive(args)) => assert_eq!(args.walk.max_depth, Some(3)),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
