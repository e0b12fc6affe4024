//! Destination directories and saved-file naming.
//!
//! Per-submission uploads get a folder named after the request's arrival time
//! in milliseconds. Shared uploads all land in `images/`, which is emptied of
//! everything but subdirectories before each request writes into it.

use chrono::Utc;
use futures::TryStreamExt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio_stream::wrappers::ReadDirStream;
use tracing::{debug, info, warn};

use crate::config::UploadMode;
use crate::error::{Result, UploadError};

pub const SHARED_DIR: &str = "images";

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Creates the directories a mode needs before the server takes requests.
pub async fn prepare_root(root: &Path, mode: UploadMode) -> Result<()> {
    let dir = match mode {
        UploadMode::PerSubmission => root.to_path_buf(),
        UploadMode::Shared => root.join(SHARED_DIR),
    };
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| UploadError::fs("create directory", &dir, e))?;
    info!("Upload directory ready: {}", dir.display());
    Ok(())
}

/// Resolves (and prepares) the directory one request writes into.
pub async fn resolve_destination(root: &Path, mode: UploadMode) -> Result<PathBuf> {
    match mode {
        UploadMode::PerSubmission => create_submission_dir(root, now_millis()).await,
        UploadMode::Shared => {
            let dir = root.join(SHARED_DIR);
            let removed = clear_dir(&dir).await?;
            debug!("Cleared {} file(s) from {}", removed, dir.display());
            Ok(dir)
        }
    }
}

/// Creates `root/{millis}`. A folder already claimed by another submission in
/// the same millisecond gets a `-{n}` suffix instead of being shared.
pub async fn create_submission_dir(root: &Path, millis: i64) -> Result<PathBuf> {
    fs::create_dir_all(root)
        .await
        .map_err(|e| UploadError::fs("create directory", root, e))?;

    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            millis.to_string()
        } else {
            format!("{}-{}", millis, attempt)
        };
        let dir = root.join(name);

        match fs::create_dir(&dir).await {
            Ok(()) => return Ok(dir),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                warn!("Submission folder {} already exists, trying next suffix", dir.display());
                attempt += 1;
            }
            Err(e) => return Err(UploadError::fs("create directory", &dir, e)),
        }
    }
}

/// Deletes every entry directly inside `dir` except subdirectories.
///
/// Symlinks count as files here, whatever they point at.
pub async fn clear_dir(dir: &Path) -> Result<usize> {
    let entries = fs::read_dir(dir)
        .await
        .map_err(|e| UploadError::fs("list directory", dir, e))?;
    let mut entries = ReadDirStream::new(entries);

    let mut removed = 0;
    while let Some(entry) = entries
        .try_next()
        .await
        .map_err(|e| UploadError::fs("list directory", dir, e))?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| UploadError::fs("inspect", &path, e))?;
        if !file_type.is_dir() {
            fs::remove_file(&path)
                .await
                .map_err(|e| UploadError::fs("delete file", &path, e))?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Extension of a client-supplied filename, dot included.
///
/// Only the last path component counts, leading dots do not start an
/// extension (`.bashrc` has none) and control characters are dropped.
pub fn extension_of(original_name: &str) -> String {
    let base = original_name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("");
    let stem_start = base.len() - base.trim_start_matches('.').len();

    match base[stem_start..].rfind('.') {
        Some(idx) => base[stem_start + idx..]
            .chars()
            .filter(|c| !c.is_control())
            .collect(),
        None => String::new(),
    }
}

/// Hands out per-file timestamps that never repeat within one request.
#[derive(Debug, Default)]
pub struct FileClock {
    last: Option<i64>,
}

impl FileClock {
    pub fn next(&mut self, now: i64) -> i64 {
        let stamp = match self.last {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last = Some(stamp);
        stamp
    }

    pub fn saved_name(&mut self, original_name: &str) -> String {
        format!("{}{}", self.next(now_millis()), extension_of(original_name))
    }
}
