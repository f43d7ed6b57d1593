use crate::app::error::{BundleError, Result};
use crate::app::filter::TreeFilter;
use crate::app::models::{DirNode, ExclusionRules, FileEntry, ProjectTree, ScanReport, WalkOptions};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use pathdiff::diff_paths;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct Scanner {
    root: PathBuf,
    filter: Arc<TreeFilter>,
    exclude_set: Arc<GlobSet>,
    options: WalkOptions,
}

impl Scanner {
    pub fn new(root: PathBuf, rules: ExclusionRules, options: WalkOptions) -> Result<Self> {
        if !root.is_dir() {
            return Err(BundleError::NotADirectory(root));
        }
        Ok(Self {
            exclude_set: Arc::new(build_globset(&options.exclude)?),
            filter: Arc::new(TreeFilter::new(rules)),
            root,
            options,
        })
    }

    /// Walks the root once, depth-first and sorted by name, pruning ignored
    /// directories before they are read.
    pub fn scan(&self) -> (ProjectTree, ScanReport) {
        let mut tree = ProjectTree::new(display_name(&self.root));
        let mut report = ScanReport::default();
        let mut dir_index: HashMap<PathBuf, usize> = HashMap::new();
        dir_index.insert(PathBuf::new(), 0);

        // Only our own rules apply; no .gitignore or hidden-file handling.
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .follow_links(self.options.follow_symlinks)
            .max_depth(self.options.max_depth)
            .sort_by_file_name(|a, b| a.cmp(b));

        let filter = Arc::clone(&self.filter);
        let exclude_set = Arc::clone(&self.exclude_set);
        let root = self.root.clone();
        builder.filter_entry(move |entry| should_visit(entry, &root, &filter, &exclude_set));

        for result in builder.build() {
            match result {
                Ok(entry) => self.process_entry(&entry, &mut tree, &mut dir_index, &mut report),
                Err(err) => {
                    log::warn!("Error walking entry: {}", err);
                    report.walk_errors += 1;
                }
            }
        }

        report.dirs_visited = tree.dir_count();
        report.files_included = tree.file_count();
        (tree, report)
    }

    fn process_entry(
        &self,
        entry: &DirEntry,
        tree: &mut ProjectTree,
        dir_index: &mut HashMap<PathBuf, usize>,
        report: &mut ScanReport,
    ) {
        if entry.depth() == 0 {
            return;
        }
        let Some(relative) = diff_paths(entry.path(), &self.root) else {
            return;
        };
        let Some(parent_idx) = relative
            .parent()
            .and_then(|parent| dir_index.get(parent).copied())
        else {
            log::debug!("No parent recorded for {}", relative.display());
            return;
        };

        let name = entry.file_name().to_string_lossy().into_owned();

        if entry.file_type().is_some_and(|t| t.is_dir()) {
            tree.nodes.push(DirNode {
                name,
                depth: entry.depth(),
                files: Vec::new(),
                children: Vec::new(),
            });
            let idx = tree.nodes.len() - 1;
            tree.nodes[parent_idx].children.push(idx);
            dir_index.insert(relative, idx);
            return;
        }

        // Unfollowed links to directories are neither walked nor read.
        // Dangling links stay as files so their read error surfaces.
        if entry.path_is_symlink() && entry.path().is_dir() {
            log::debug!("Skipped symlinked directory {}", entry.path().display());
            return;
        }

        if !self.filter.is_included(&name) || self.exclude_set.is_match(&relative) {
            report.files_skipped += 1;
            return;
        }

        tree.nodes[parent_idx].files.push(FileEntry {
            path: entry.path().to_path_buf(),
            relative_path: to_slash(&relative),
            name,
        });
    }
}

/// Decides whether the walker may yield (and, for directories, enter) an
/// entry. Files always pass here; they are classified in `process_entry`.
fn should_visit(entry: &DirEntry, root: &Path, filter: &TreeFilter, exclude_set: &GlobSet) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if !filter.should_descend(&name) {
        log::debug!("Pruned directory {}", entry.path().display());
        return false;
    }
    match diff_paths(entry.path(), root) {
        Some(relative) => !exclude_set.is_match(relative),
        None => true,
    }
}

fn display_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string())
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Compiles the user's exclude patterns into one matcher.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|source| BundleError::InvalidGlob {
            pattern: pat.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| BundleError::InvalidGlob {
        pattern: patterns.join(", "),
        source,
    })
}
