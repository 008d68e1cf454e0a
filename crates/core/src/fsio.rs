use crate::{MigrateError, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Replace `path` with `contents` through a synced temp file in the same
/// directory. The target either keeps its old bytes or gets all new ones.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = tmp_path_for(path);
    if let Err(err) = write_synced(&tmp, contents.as_bytes()) {
        let _ = std::fs::remove_file(&tmp);
        return Err(MigrateError::write(path, err));
    }

    std::fs::rename(&tmp, path).map_err(|err| {
        let _ = std::fs::remove_file(&tmp);
        MigrateError::write(path, err)
    })
}

/// Write a side artifact, creating its parent directory if needed.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| MigrateError::write(path, err))?;
    }
    write_atomic(path, contents)
}

fn write_synced(tmp: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let tmp_name = format!(".{name}.tmp-{}", std::process::id());
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}

/// `<stem>-<suffix>.<ext>` beside `path`, e.g. `achievements-next.yml`.
pub fn sibling_artifact(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "achievements".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{stem}-{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{suffix}"),
    };
    path.with_file_name(name)
}
