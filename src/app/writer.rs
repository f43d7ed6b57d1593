use crate::app::error::{BundleError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes the artifact next to its destination and renames it into place,
/// so an interrupted run leaves the previous artifact intact.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let output_err = |source| BundleError::Output {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(output_err)?;
    temp.write_all(contents).map_err(output_err)?;
    temp.as_file().sync_all().map_err(output_err)?;
    temp.persist(path).map_err(|e| output_err(e.error))?;
    Ok(())
}
