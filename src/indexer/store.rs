//! On-disk layout of the index store.
//!
//! ```text
//! <store>/CURRENT   "gen-<n>", replaced atomically by rename
//! <store>/gen-<n>/  one complete tantivy index
//! ```
//!
//! Readers resolve `CURRENT` and open that directory, so they see either the
//! previous or the new generation, never one that is still being written.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

const POINTER_FILE: &str = "CURRENT";
const POINTER_TMP: &str = "CURRENT.tmp";
const GENERATION_PREFIX: &str = "gen-";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("index store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt generation pointer in {path}: {content:?}")]
    CorruptPointer { path: PathBuf, content: String },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub fn generation_dir(store: &Path, generation: u64) -> PathBuf {
    store.join(format!("{GENERATION_PREFIX}{generation}"))
}

fn parse_generation(name: &str) -> Option<u64> {
    name.strip_prefix(GENERATION_PREFIX)?.parse().ok()
}

/// The published generation, if any.
pub fn current_generation(store: &Path) -> Result<Option<u64>, StoreError> {
    let pointer = store.join(POINTER_FILE);
    let content = match fs::read_to_string(&pointer) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(&pointer, e)),
    };

    parse_generation(content.trim())
        .map(Some)
        .ok_or(StoreError::CorruptPointer {
            path: pointer,
            content,
        })
}

/// Creates the store if needed and returns an empty directory for the next generation.
pub fn prepare_generation(store: &Path) -> Result<(u64, PathBuf), StoreError> {
    fs::create_dir_all(store).map_err(|e| StoreError::io(store, e))?;

    let current = match current_generation(store) {
        Ok(current) => current,
        Err(StoreError::CorruptPointer { path, content }) => {
            warn!(
                path = %path.display(),
                content = %content.trim(),
                "Ignoring corrupt generation pointer, numbering after the newest directory"
            );
            generations(store)?.into_iter().max()
        }
        Err(e) => return Err(e),
    };
    let next = current.map_or(1, |current| current + 1);
    let dir = generation_dir(store, next);
    // Leftover from a build that died before publishing.
    if dir.exists() {
        fs::remove_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
    }
    fs::create_dir(&dir).map_err(|e| StoreError::io(&dir, e))?;
    Ok((next, dir))
}

/// Points `CURRENT` at `generation`.
pub fn publish(store: &Path, generation: u64) -> Result<(), StoreError> {
    let tmp = store.join(POINTER_TMP);
    let mut file = File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
    file.write_all(format!("{GENERATION_PREFIX}{generation}\n").as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(|e| StoreError::io(&tmp, e))?;
    drop(file);

    let pointer = store.join(POINTER_FILE);
    fs::rename(&tmp, &pointer).map_err(|e| StoreError::io(&pointer, e))
}

/// Numbers of the `gen-<n>` directories present in the store.
fn generations(store: &Path) -> Result<Vec<u64>, StoreError> {
    let mut found = Vec::new();
    let entries = fs::read_dir(store).map_err(|e| StoreError::io(store, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(store, e))?;
        if let Some(generation) = entry.file_name().to_str().and_then(parse_generation) {
            found.push(generation);
        }
    }
    Ok(found)
}

/// Deletes every generation directory except `keep`. Returns how many were removed.
pub fn prune(store: &Path, keep: u64) -> Result<usize, StoreError> {
    let mut removed = 0;
    for generation in generations(store)? {
        if generation == keep {
            continue;
        }
        let path = generation_dir(store, generation);
        fs::remove_dir_all(&path).map_err(|e| StoreError::io(&path, e))?;
        removed += 1;
    }
    Ok(removed)
}
