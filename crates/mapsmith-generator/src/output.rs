//! Output file writing.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

/// Write `contents` to `dir/name`, creating `dir` if needed.
///
/// The data goes to a sibling temp file first and is renamed over the
/// target, so readers never observe a half-written file.
pub fn write_atomic(dir: &Path, name: &str, contents: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let target = dir.join(name);
    let temp = dir.join(format!(".{name}.tmp"));

    fs::write(&temp, contents)?;
    if let Err(e) = fs::rename(&temp, &target) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }

    debug!(path = %target.display(), bytes = contents.len(), "wrote file");
    Ok(target)
}
