//! Reading and writing the envelope file.

use crate::error::{StoreError, StoreResult};
use crate::types::Envelope;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

fn ensure_dir(path: &Path) -> StoreResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        debug!(dir = %parent.display(), "Created store directory");
    }
    Ok(())
}

/// Create the parent directory and an empty file if either is missing.
///
/// An existing file is left untouched.
pub(crate) fn ensure_file(path: &Path) -> StoreResult<()> {
    ensure_dir(path)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

/// Load the envelope. A missing or blank file reads as an empty envelope.
pub(crate) fn read_envelope<R: DeserializeOwned>(path: &Path) -> StoreResult<Envelope<R>> {
    ensure_file(path)?;

    let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    if content.trim().is_empty() {
        debug!(path = %path.display(), "Store file is empty, starting fresh");
        return Ok(Envelope::default());
    }

    let envelope: Envelope<R> =
        serde_json::from_str(&content).map_err(|e| StoreError::decode(path, e))?;
    debug!(
        path = %path.display(),
        records = envelope.records.len(),
        current_increment = envelope.current_increment,
        "Loaded store envelope"
    );
    Ok(envelope)
}

/// Replace the file with the full envelope.
///
/// The bytes go to a `.tmp` sibling first and are renamed over the target,
/// so readers only ever see a complete envelope.
pub(crate) fn write_envelope<R: Serialize>(
    path: &Path,
    envelope: &Envelope<R>,
    pretty: bool,
) -> StoreResult<()> {
    ensure_dir(path)?;

    let mut bytes = if pretty {
        serde_json::to_vec_pretty(envelope)
    } else {
        serde_json::to_vec(envelope)
    }
    .map_err(StoreError::Encode)?;
    bytes.push(b'\n');

    let tmp = temp_path(path);
    fs::write(&tmp, &bytes).map_err(|e| StoreError::io(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io(path, e));
    }

    debug!(
        path = %path.display(),
        records = envelope.records.len(),
        bytes = bytes.len(),
        "Saved store envelope"
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
