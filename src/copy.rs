//! Metadata-preserving file copy.

use std::{
    fs::{self, File, FileTimes},
    io,
    path::Path,
};

use anyhow::{bail, Context, Result};

/// Copy `src` to `dst`, creating parent directories of `dst` as needed.
///
/// Besides the contents, the permissions and the access/modification times of
/// `src` are carried over, so that incremental builds see the template's own
/// timestamp instead of the time of the copy.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }

    if dst.exists() && fs::canonicalize(src)? == fs::canonicalize(dst)? {
        bail!(
            "{} and {} are the same file",
            src.display(),
            dst.display()
        );
    }

    let metadata =
        fs::metadata(src).with_context(|| format!("Could not read {}", src.display()))?;

    let mut reader = File::open(src).with_context(|| format!("Could not open {}", src.display()))?;
    let mut writer =
        File::create(dst).with_context(|| format!("Could not create {}", dst.display()))?;
    io::copy(&mut reader, &mut writer)
        .with_context(|| format!("Could not write {}", dst.display()))?;

    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    writer
        .set_times(times)
        .with_context(|| format!("Could not set timestamps of {}", dst.display()))?;
    drop(writer);

    // Permissions last, a read-only template would otherwise lock us out.
    fs::set_permissions(dst, metadata.permissions())
        .with_context(|| format!("Could not set permissions of {}", dst.display()))?;

    Ok(())
}
