//! Directory sync: uploads a local tree into a bucket.
//!
//! Every regular file below the root becomes one object whose key is the file's path
//! relative to the root, with `/` between components. Directories are walked but never
//! uploaded themselves.
//!
//! # Responsibilities
//! - Resolve the root (`~` expansion, canonicalisation)
//! - Walk the tree depth first and collect [`LocalFile`]s
//! - Infer a content type per key, falling back to [`DEFAULT_CONTENT_TYPE`]
//! - Upload with bounded concurrency; uploads overwrite, so a re-run is harmless
//!
//! # Error Handling
//! Fail fast: the first read or upload error aborts the sync and is returned. Objects
//! uploaded before the failure stay in the bucket; re-running the sync converges.

use std::path::{Component, Path, PathBuf};

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, error, info};

use crate::config::SyncOptions;
use crate::contract::{ObjectUpload, StorageProvider};
use crate::error::DeployError;

/// Used when the extension does not identify a type; most such files on a site are pages.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// A file discovered under the sync root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub key: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub key: String,
    pub content_type: String,
    pub size: u64,
}

#[derive(Debug)]
pub struct SyncReport {
    pub bucket: String,
    pub root: PathBuf,
    pub uploaded: Vec<UploadedObject>,
}

/// Content type for an object key, guessed from its extension.
pub fn infer_content_type(key: &str) -> String {
    mime_guess::from_path(key)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

/// Replace a leading `~` component with `home`. Without a home the path is unchanged.
pub fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Expand a leading `~` and canonicalise. The result must be an existing directory.
pub fn resolve_root(path: &Path) -> Result<PathBuf, DeployError> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let expanded = expand_home(path, home.as_deref());
    let root = std::fs::canonicalize(&expanded).map_err(DeployError::io(&expanded))?;
    let metadata = std::fs::metadata(&root).map_err(DeployError::io(&root))?;
    if !metadata.is_dir() {
        return Err(DeployError::NotADirectory(root));
    }
    Ok(root)
}

/// Object key for `path` below `root`: the relative components joined with `/`.
pub fn object_key(root: &Path, path: &Path) -> Result<String, DeployError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| DeployError::OutsideRoot(path.to_path_buf()))?;
    let mut segments = Vec::new();
    for component in relative.components() {
        if let Component::Normal(segment) = component {
            let segment = segment
                .to_str()
                .ok_or_else(|| DeployError::NonUtf8Path(path.to_path_buf()))?;
            segments.push(segment);
        }
    }
    Ok(segments.join("/"))
}

/// Recursively collect every regular file under `root`.
pub fn discover_files(root: &Path) -> Result<Vec<LocalFile>, DeployError> {
    fn visit_dir(dir: &Path, root: &Path, results: &mut Vec<LocalFile>) -> Result<(), DeployError> {
        for entry_res in std::fs::read_dir(dir).map_err(DeployError::io(dir))? {
            let entry = entry_res.map_err(DeployError::io(dir))?;
            let path = entry.path();
            // Follows symlinks, so a dangling link is reported rather than skipped.
            let metadata = std::fs::metadata(&path).map_err(DeployError::io(&path))?;
            if metadata.is_dir() {
                visit_dir(&path, root, results)?;
            } else if metadata.is_file() {
                let key = object_key(root, &path)?;
                let content_type = infer_content_type(&key);
                debug!(path = %path.display(), key = %key, content_type = %content_type, "Discovered file");
                results.push(LocalFile {
                    path,
                    key,
                    content_type,
                });
            }
        }
        Ok(())
    }

    let mut files = Vec::new();
    visit_dir(root, root, &mut files)?;
    Ok(files)
}

async fn upload_file<S>(
    storage: &S,
    bucket: &str,
    file: LocalFile,
) -> Result<UploadedObject, DeployError>
where
    S: StorageProvider + ?Sized,
{
    let size = tokio::fs::metadata(&file.path)
        .await
        .map_err(DeployError::io(&file.path))?
        .len();
    debug!(path = %file.path.display(), key = %file.key, content_type = %file.content_type, size, "Uploading file");
    storage
        .put_object(ObjectUpload {
            bucket: bucket.to_string(),
            key: file.key.clone(),
            content_type: file.content_type.clone(),
            path: file.path.clone(),
        })
        .await
        .map_err(|e| {
            error!(key = %file.key, error = ?e, "Upload failed");
            DeployError::provider("put_object")(e)
        })?;
    Ok(UploadedObject {
        key: file.key,
        content_type: file.content_type,
        size,
    })
}

/// Upload every file under `path` into `bucket`.
pub async fn sync_directory<S>(
    storage: &S,
    path: &Path,
    bucket: &str,
    options: &SyncOptions,
) -> Result<SyncReport, DeployError>
where
    S: StorageProvider + ?Sized,
{
    info!(path = %path.display(), bucket, "[SYNC] Starting directory sync");
    let root = resolve_root(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "[SYNC][ERROR] Could not resolve sync root");
        e
    })?;
    let files = discover_files(&root)?;
    info!(root = %root.display(), files = files.len(), "[SYNC] Discovered files");

    let uploaded: Vec<UploadedObject> = stream::iter(files)
        .map(|file| upload_file(storage, bucket, file))
        .buffer_unordered(options.concurrency.max(1))
        .try_collect()
        .await
        .map_err(|e| {
            error!(bucket, error = %e, "[SYNC][ERROR] Sync aborted");
            e
        })?;

    info!(bucket, uploaded = uploaded.len(), "[SYNC] Directory sync complete");
    Ok(SyncReport {
        bucket: bucket.to_string(),
        root,
        uploaded,
    })
}
