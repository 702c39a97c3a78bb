use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::error::{StorageError, StorageResult};

const TEMP_SUFFIX: &str = "tmp";

/// Creates the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| StorageError::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

/// `file.json` -> `file.json.tmp`
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Serializes `value` as pretty JSON and atomically moves it to `path`.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    ensure_parent_dir(path)?;
    let temp = temp_path(path);

    {
        let mut writer = BufWriter::new(File::create(&temp)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }

    fs::rename(&temp, path)?;
    Ok(())
}
