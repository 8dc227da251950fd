//! Scratch-space lifecycle for conversion requests.
//!
//! Every request owns a job directory `<root>/<uuid-v7>/`. Stage paths are
//! registered on the [`ScratchJob`] before a stage runs, and the whole job
//! is removed by [`ScratchJob::finish`] or, failing that, on drop.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Root directory holding per-request job directories.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    root: PathBuf,
}

impl ScratchSpace {
    /// Create the root directory if needed and resolve it to an absolute
    /// path, so tools run in other working directories see the same files.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: std::fs::canonicalize(root)?,
        })
    }

    /// Absolute root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a fresh job directory.
    pub async fn create_job(&self) -> std::io::Result<ScratchJob> {
        let id = Uuid::now_v7();
        let dir = self.root.join(id.simple().to_string());
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!(job_id = %id, dir = %dir.display(), "Scratch job created");
        Ok(ScratchJob {
            id,
            dir,
            paths: Vec::new(),
            finished: false,
        })
    }

    /// Create and remove a probe file in the root.
    pub async fn probe_writable(&self) -> std::io::Result<()> {
        let probe = self
            .root
            .join(format!(".probe-{}", Uuid::now_v7().simple()));
        tokio::fs::write(&probe, b"ok").await?;
        tokio::fs::remove_file(&probe).await
    }
}

/// One request's scratch directory and the stage paths registered in it.
#[derive(Debug)]
pub struct ScratchJob {
    id: Uuid,
    dir: PathBuf,
    paths: Vec<PathBuf>,
    finished: bool,
}

impl ScratchJob {
    /// Job identifier, also the directory name.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The job directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Derive a path inside the job directory and register it for cleanup.
    pub fn path_for(&mut self, name: &str) -> PathBuf {
        let path = self.dir.join(name);
        self.paths.push(path.clone());
        path
    }

    /// Register the path an upload is written to.
    ///
    /// The client filename only contributes a sanitized extension.
    pub fn upload_path(&mut self, original_name: &str) -> PathBuf {
        let ext = sanitize_extension(original_name).unwrap_or_else(|| "bin".to_string());
        self.path_for(&format!("upload.{ext}"))
    }

    /// Remove every registered path and the job directory.
    pub async fn finish(mut self) {
        self.finished = true;
        for path in self.paths.iter().rev() {
            let result = match tokio::fs::metadata(path).await {
                Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(path).await,
                Ok(_) => tokio::fs::remove_file(path).await,
                Err(_) => continue,
            };
            if let Err(e) = result {
                tracing::warn!(
                    job_id = %self.id,
                    path = %path.display(),
                    error = %e,
                    "Failed to remove scratch file"
                );
            }
        }
        if let Err(e) = tokio::fs::remove_dir_all(&self.dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    job_id = %self.id,
                    dir = %self.dir.display(),
                    error = %e,
                    "Failed to remove scratch job directory"
                );
            }
        }
    }
}

impl Drop for ScratchJob {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    job_id = %self.id,
                    dir = %self.dir.display(),
                    error = %e,
                    "Failed to remove abandoned scratch job"
                );
            }
        } else {
            tracing::debug!(job_id = %self.id, "Abandoned scratch job removed");
        }
    }
}

/// Lowercased alphanumeric extension of a client filename, at most 10 chars.
pub fn sanitize_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    let cleaned: String = ext
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(10)
        .collect::<String>()
        .to_ascii_lowercase();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// `file://` URL for an absolute path.
pub fn file_url(path: &Path) -> String {
    let mut url = String::from("file://");
    for c in path.to_string_lossy().chars() {
        match c {
            '%' => url.push_str("%25"),
            ' ' => url.push_str("%20"),
            '#' => url.push_str("%23"),
            '?' => url.push_str("%3F"),
            _ => url.push(c),
        }
    }
    url
}
