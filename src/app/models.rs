use std::collections::BTreeSet;
use std::path::PathBuf;

/// Directory names pruned by the concatenation walk.
pub const CONCAT_IGNORED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    "dist",
    "build",
    ".next",
    ".vscode",
    ".idea",
    "coverage",
    "tmp",
    "temp",
];

/// File names never concatenated, whatever their extension.
pub const CONCAT_IGNORED_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    ".DS_Store",
    "export_project.py",
    DEFAULT_OUTPUT_FILE,
    ".env.local",
    ".env",
];

/// Extensions (and a few exact names) whose content is concatenated.
pub const CONCAT_ALLOWED_SUFFIXES: &[&str] = &[
    // Web & JS
    ".js", ".jsx", ".ts", ".tsx", ".html", ".css", ".scss", ".json",
    // Python & backend
    ".py", ".sql", ".prisma",
    // Docs & config
    ".md", ".txt", ".yml", ".yaml", ".xml", ".ini", ".toml",
    // Dotfiles and extensionless names
    ".babelrc", ".eslintrc", ".prettierrc", "Dockerfile",
];

pub const ARCHIVE_IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".next",
    ".git",
    "dist",
    "build",
    ".vscode",
    "coverage",
    "__pycache__",
];

pub const ARCHIVE_IGNORED_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    ".DS_Store",
    "backup_project.py",
];

pub const ARCHIVE_EXTENSION: &str = ".zip";

pub const DEFAULT_OUTPUT_FILE: &str = "tum_kodlar.txt";

/// Which file names pass the allow check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowList {
    /// Every name not otherwise excluded.
    Any,
    /// Exact names, or `.`-prefixed suffixes.
    Suffixes(BTreeSet<String>),
}

/// Immutable exclusion configuration handed to the tree filter.
///
/// The `with_*` methods return an extended copy, so a value built at startup
/// is never mutated while a walk is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRules {
    ignored_dir_names: BTreeSet<String>,
    ignored_file_names: BTreeSet<String>,
    allowed: AllowList,
    denied_suffixes: BTreeSet<String>,
}

impl ExclusionRules {
    pub fn new(
        ignored_dir_names: impl IntoIterator<Item = impl Into<String>>,
        ignored_file_names: impl IntoIterator<Item = impl Into<String>>,
        allowed: AllowList,
    ) -> Self {
        Self {
            ignored_dir_names: ignored_dir_names.into_iter().map(Into::into).collect(),
            ignored_file_names: ignored_file_names.into_iter().map(Into::into).collect(),
            allowed,
            denied_suffixes: BTreeSet::new(),
        }
    }

    /// Rules used when concatenating sources into a text file.
    pub fn concat_defaults() -> Self {
        Self::new(
            CONCAT_IGNORED_DIRS.iter().copied(),
            CONCAT_IGNORED_FILES.iter().copied(),
            AllowList::Suffixes(
                CONCAT_ALLOWED_SUFFIXES
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
        )
    }

    /// Rules used when zipping a project. Everything is kept except caches,
    /// lockfiles and other archives.
    pub fn archive_defaults() -> Self {
        Self::new(
            ARCHIVE_IGNORED_DIRS.iter().copied(),
            ARCHIVE_IGNORED_FILES.iter().copied(),
            AllowList::Any,
        )
        .with_denied_suffixes([ARCHIVE_EXTENSION])
    }

    pub fn with_ignored_dirs(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignored_dir_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_ignored_files(
        mut self,
        names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.ignored_file_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Extends a suffix allow-list. Has no effect on `AllowList::Any`.
    pub fn with_allowed_suffixes(
        mut self,
        suffixes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        if let AllowList::Suffixes(set) = &mut self.allowed {
            set.extend(suffixes.into_iter().map(Into::into));
        }
        self
    }

    pub fn with_denied_suffixes(
        mut self,
        suffixes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.denied_suffixes.extend(suffixes.into_iter().map(Into::into));
        self
    }

    pub fn ignored_dir_names(&self) -> &BTreeSet<String> {
        &self.ignored_dir_names
    }

    pub fn ignored_file_names(&self) -> &BTreeSet<String> {
        &self.ignored_file_names
    }

    pub fn allowed(&self) -> &AllowList {
        &self.allowed
    }

    pub fn denied_suffixes(&self) -> &BTreeSet<String> {
        &self.denied_suffixes
    }
}

/// Traversal knobs that are independent of the name rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOptions {
    pub max_depth: Option<usize>,
    pub follow_symlinks: bool,
    /// Glob patterns matched against root-relative paths.
    pub exclude: Vec<String>,
}

/// What a run produces once the tree has been scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Concat {
        output: PathBuf,
        tree_only: bool,
        to_stdout: bool,
    },
    Archive {
        archive_name: String,
    },
}

/// Represents the final configuration after merging presets and CLI args.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root: PathBuf,
    pub rules: ExclusionRules,
    pub walk: WalkOptions,
    pub task: Task,
}

/// An included file discovered during the scan.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Root-relative, `/`-separated.
    pub relative_path: String,
    pub name: String,
}

/// A visited directory. The root has depth 0.
#[derive(Debug, Clone)]
pub struct DirNode {
    pub name: String,
    pub depth: usize,
    pub files: Vec<FileEntry>,
    /// Indices into `ProjectTree::nodes`, in name order.
    pub children: Vec<usize>,
}

/// Result of one walk: every visited directory, pruned and filtered.
#[derive(Debug, Clone)]
pub struct ProjectTree {
    pub nodes: Vec<DirNode>,
}

impl ProjectTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![DirNode {
                name: root_name.into(),
                depth: 0,
                files: Vec::new(),
                children: Vec::new(),
            }],
        }
    }

    /// Directories in output order: a directory, then its subdirectories,
    /// depth-first.
    pub fn preorder(&self) -> Vec<&DirNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![0usize];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            out.push(node);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Included files in output order.
    pub fn files(&self) -> impl Iterator<Item = &FileEntry> {
        self.preorder().into_iter().flat_map(|node| node.files.iter())
    }

    pub fn file_count(&self) -> usize {
        self.nodes.iter().map(|n| n.files.len()).sum()
    }

    pub fn dir_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Counters gathered while walking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub dirs_visited: usize,
    pub files_included: usize,
    pub files_skipped: usize,
    pub walk_errors: usize,
}
