//! Per-run artifact lifecycle
//!
//! Every pipeline run owns one [`ArtifactLifecycle`]: a private directory
//! under the system temp dir where all intermediate artifacts (audio,
//! images, rendered video, caption files) live. `release_all` removes
//! everything exactly once and is safe to call repeatedly; `Drop` is the
//! backstop for cancelled runs whose future is dropped mid-stage.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};
use uuid::Uuid;

/// Tracks and removes the ephemeral artifacts of one pipeline run.
#[derive(Debug)]
pub struct ArtifactLifecycle {
    run_dir: PathBuf,
    tracked: Mutex<Vec<PathBuf>>,
}

impl ArtifactLifecycle {
    /// Create the lifecycle with a fresh run directory under the system
    /// temp dir.
    pub fn new() -> std::io::Result<Self> {
        Self::with_root(std::env::temp_dir().join("reelforge"))
    }

    /// Create the lifecycle with a fresh run directory under `root`.
    pub fn with_root(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let run_dir = root.as_ref().join(Uuid::new_v4().to_string());
        std::fs::create_dir_all(&run_dir)?;
        debug!(dir = %run_dir.display(), "created artifact directory");
        Ok(Self { run_dir, tracked: Mutex::new(Vec::new()) })
    }

    /// The run-private directory artifacts live in.
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Reserve a fresh artifact path with the given extension and track it
    /// for release. The file itself is created by whoever writes it.
    pub fn create(&self, extension: &str) -> PathBuf {
        let path = self.run_dir.join(format!("{}.{extension}", Uuid::new_v4()));
        self.register(path.clone());
        path
    }

    /// Track an externally produced artifact for release.
    pub fn register(&self, path: PathBuf) {
        self.tracked
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(path);
    }

    /// Number of artifacts currently tracked.
    pub fn tracked_count(&self) -> usize {
        self.tracked
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Remove every tracked artifact and the run directory.
    ///
    /// Idempotent: a second call finds nothing to remove and succeeds.
    /// Individual removal failures are logged, never raised, so one stuck
    /// file cannot mask the error that aborted a run.
    pub fn release_all(&self) {
        let drained: Vec<PathBuf> = self
            .tracked
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .drain(..)
            .collect();

        for path in &drained {
            match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "removed artifact"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove artifact"),
            }
        }

        // Recursive: collaborators may drop scratch files (e.g. transcription
        // output) into the run dir without registering them.
        match std::fs::remove_dir_all(&self.run_dir) {
            Ok(()) => debug!(dir = %self.run_dir.display(), "removed artifact directory"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(dir = %self.run_dir.display(), error = %e, "failed to remove artifact directory");
            }
        }
    }
}

impl Drop for ArtifactLifecycle {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_root() -> PathBuf {
        std::env::temp_dir().join("reelforge-test").join(Uuid::new_v4().to_string())
    }

    #[test]
    fn create_reserves_path_inside_run_dir() {
        let lifecycle = ArtifactLifecycle::with_root(scratch_root()).unwrap();
        let path = lifecycle.create("mp3");
        assert!(path.starts_with(lifecycle.run_dir()));
        assert_eq!(path.extension().unwrap(), "mp3");
        assert_eq!(lifecycle.tracked_count(), 1);
    }

    #[test]
    fn release_all_removes_tracked_files_and_dir() {
        let root = scratch_root();
        let lifecycle = ArtifactLifecycle::with_root(&root).unwrap();
        let audio = lifecycle.create("mp3");
        let image = lifecycle.create("png");
        std::fs::write(&audio, b"audio").unwrap();
        std::fs::write(&image, b"image").unwrap();
        let run_dir = lifecycle.run_dir().to_path_buf();

        lifecycle.release_all();

        assert!(!audio.exists());
        assert!(!image.exists());
        assert!(!run_dir.exists());
        assert_eq!(lifecycle.tracked_count(), 0);
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn release_all_is_idempotent() {
        let root = scratch_root();
        let lifecycle = ArtifactLifecycle::with_root(&root).unwrap();
        let path = lifecycle.create("txt");
        std::fs::write(&path, b"x").unwrap();

        lifecycle.release_all();
        // Second call removes nothing and must not panic or error.
        lifecycle.release_all();

        assert!(!path.exists());
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn release_all_survives_already_removed_files() {
        let root = scratch_root();
        let lifecycle = ArtifactLifecycle::with_root(&root).unwrap();
        let path = lifecycle.create("txt");
        // Never written: removal sees NotFound and carries on.
        assert!(!path.exists());
        lifecycle.release_all();
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn drop_releases_artifacts() {
        let root = scratch_root();
        let path;
        let run_dir;
        {
            let lifecycle = ArtifactLifecycle::with_root(&root).unwrap();
            path = lifecycle.create("bin");
            run_dir = lifecycle.run_dir().to_path_buf();
            std::fs::write(&path, b"payload").unwrap();
        }
        assert!(!path.exists());
        assert!(!run_dir.exists());
        std::fs::remove_dir_all(&root).ok();
    }
}
