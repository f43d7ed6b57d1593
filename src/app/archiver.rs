use crate::app::error::{BundleError, Result};
use crate::app::models::{ProjectTree, ARCHIVE_EXTENSION};
use chrono::{DateTime, Local};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const ARCHIVE_PREFIX: &str = "Yedek_";

/// `Yedek_<YYYY-MM-DD_HH-MM-SS>.zip`, second precision.
pub fn archive_name(now: DateTime<Local>) -> String {
    format!(
        "{}{}{}",
        ARCHIVE_PREFIX,
        now.format("%Y-%m-%d_%H-%M-%S"),
        ARCHIVE_EXTENSION
    )
}

/// Copies every file of a scanned tree, byte for byte, into a zip archive.
pub struct Archiver {
    root: PathBuf,
}

impl Archiver {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Writes the archive into the root and returns its path and entry
    /// count. The archive is staged in a temporary file and only appears
    /// under its final name once complete; an existing archive is never
    /// overwritten.
    pub fn write(&self, tree: &ProjectTree, archive_name: &str) -> Result<(PathBuf, usize)> {
        let target = self.root.join(archive_name);
        if target.exists() {
            return Err(BundleError::ArchiveExists(target));
        }

        let output_err = |source| BundleError::Output {
            path: target.clone(),
            source,
        };
        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}", archive_name))
            .suffix(ARCHIVE_EXTENSION)
            .tempfile_in(&self.root)
            .map_err(output_err)?;

        let mut zip = ZipWriter::new(staging);
        let mut count = 0;
        for entry in tree.files() {
            let options = entry_options(&entry.path)?;
            zip.start_file(entry.relative_path.as_str(), options)?;
            let mut file = File::open(&entry.path).map_err(|source| BundleError::ArchiveInput {
                path: entry.path.clone(),
                source,
            })?;
            io::copy(&mut file, &mut zip).map_err(|source| BundleError::ArchiveInput {
                path: entry.path.clone(),
                source,
            })?;
            log::debug!("Added {}", entry.relative_path);
            count += 1;
        }

        let staging = zip.finish()?;
        staging
            .persist_noclobber(&target)
            .map_err(|e| output_err(e.error))?;
        Ok((target, count))
    }
}

fn entry_options(path: &Path) -> Result<SimpleFileOptions> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = std::fs::metadata(path).map_err(|source| BundleError::ArchiveInput {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(options.unix_permissions(metadata.permissions().mode()))
    }

    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{ExclusionRules, WalkOptions};
    use crate::app::scanner::Scanner;
    use chrono::TimeZone;
    use std::fs;
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    fn write_file(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn scan_for_archive(root: &Path, name: &str) -> ProjectTree {
        let rules = ExclusionRules::archive_defaults().with_ignored_files([name]);
        Scanner::new(root.to_path_buf(), rules, WalkOptions::default())
            .unwrap()
            .scan()
            .0
    }

    #[test]
    fn test_archive_name_format() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(archive_name(now), "Yedek_2024-03-09_07-05-01.zip");
    }

    #[test]
    fn test_round_trip_preserves_bytes_and_paths() {
        let dir = tempdir().unwrap();
        let binary: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        write_file(dir.path(), "src/app.ts", b"export const x = 1;   \n");
        write_file(dir.path(), "assets/logo.png", &binary);
        write_file(dir.path(), ".env", b"KEY=value\n");
        write_file(dir.path(), "node_modules/pkg/index.js", b"ignored");
        write_file(dir.path(), "yarn.lock", b"ignored");
        write_file(dir.path(), "old_backup.zip", b"PK");

        let name = "Yedek_2024-01-01_00-00-00.zip";
        let tree = scan_for_archive(dir.path(), name);
        let (path, count) = Archiver::new(dir.path().to_path_buf())
            .write(&tree, name)
            .unwrap();

        assert_eq!(path, dir.path().join(name));
        assert_eq!(count, 3);

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(String::from).collect();
        names.sort();
        assert_eq!(names, vec![".env", "assets/logo.png", "src/app.ts"]);

        for name in &names {
            let mut extracted = Vec::new();
            archive
                .by_name(name)
                .unwrap()
                .read_to_end(&mut extracted)
                .unwrap();
            assert_eq!(extracted, fs::read(dir.path().join(name)).unwrap());
        }
    }

    #[test]
    fn test_existing_archive_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let name = "Yedek_2024-01-01_00-00-00.zip";
        write_file(dir.path(), name, b"previous");
        write_file(dir.path(), "a.txt", b"a");

        let tree = scan_for_archive(dir.path(), name);
        let err = Archiver::new(dir.path().to_path_buf())
            .write(&tree, name)
            .unwrap_err();

        assert!(matches!(err, BundleError::ArchiveExists(_)));
        assert_eq!(fs::read(dir.path().join(name)).unwrap(), b"previous");
    }

    #[test]
    fn test_second_run_skips_first_archive() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "a.txt", b"a");

        let first = "Yedek_2024-01-01_00-00-00.zip";
        let tree = scan_for_archive(dir.path(), first);
        Archiver::new(dir.path().to_path_buf())
            .write(&tree, first)
            .unwrap();

        let second = "Yedek_2024-01-01_00-00-01.zip";
        let tree = scan_for_archive(dir.path(), second);
        let (path, count) = Archiver::new(dir.path().to_path_buf())
            .write(&tree, second)
            .unwrap();

        assert_eq!(count, 1);
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        assert_eq!(archive.file_names().collect::<Vec<_>>(), vec!["a.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_does_not_abort_archive() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "shared/a.txt", b"a");
        write_file(dir.path(), "main.txt", b"main");
        std::os::unix::fs::symlink(dir.path().join("shared"), dir.path().join("link")).unwrap();

        let name = "Yedek_2024-01-01_00-00-00.zip";
        let tree = scan_for_archive(dir.path(), name);
        let (path, count) = Archiver::new(dir.path().to_path_buf())
            .write(&tree, name)
            .unwrap();

        assert_eq!(count, 2);
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<_> = archive.file_names().map(String::from).collect();
        names.sort();
        assert_eq!(names, vec!["main.txt", "shared/a.txt"]);
    }
}
