//! Per-invocation scratch files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ProcessingResult;

/// Temporary files owned by one invocation.
///
/// Everything lives under `{root}/{invocation_id}/`, so concurrent or
/// back-to-back invocations never share a path. Cleanup is best effort.
#[derive(Debug)]
pub struct ScratchFiles {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl ScratchFiles {
    /// Create the invocation directory under `root`.
    pub async fn create(root: &Path, invocation_id: &str) -> ProcessingResult<Self> {
        let dir = root.join(sanitize_segment(invocation_id));
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!(dir = %dir.display(), "Created scratch directory");

        Ok(Self {
            dir,
            files: Vec::new(),
        })
    }

    /// Path for `name` inside `subdir` of the invocation directory, tracked
    /// for cleanup. The subdirectory is created.
    ///
    /// Each pipeline stage uses its own fixed subdirectory, so no input name
    /// can shadow another stage's directory.
    pub async fn nested_path_for(&mut self, subdir: &str, name: &str) -> ProcessingResult<PathBuf> {
        let dir = self.dir.join(sanitize_segment(subdir));
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(sanitize_segment(name));
        if !self.files.contains(&path) {
            self.files.push(path.clone());
        }
        Ok(path)
    }

    /// Delete every tracked file and then the invocation directory.
    ///
    /// Never fails; returns how many deletions did not succeed. A file that
    /// was never created (the pipeline stopped early) is not a failure.
    pub async fn cleanup(self) -> usize {
        let mut failures = 0;

        for path in &self.files {
            match tokio::fs::remove_file(path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed scratch file"),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "Scratch file already gone")
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(error = %e, path = %path.display(), "Failed to remove scratch file");
                }
            }
        }

        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                failures += 1;
                tracing::warn!(error = %e, dir = %self.dir.display(), "Failed to remove scratch directory");
            }
        }

        if failures == 0 {
            tracing::info!(dir = %self.dir.display(), files = self.files.len(), "Scratch files cleaned up");
        }

        failures
    }
}

/// Reduce `name` to a single safe path segment.
fn sanitize_segment(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match cleaned.trim_matches('.') {
        "" => "_".to_string(),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_paths_are_namespaced_per_invocation() {
        let root = tempdir().unwrap();
        let mut a = ScratchFiles::create(root.path(), "req-a").await.unwrap();
        let mut b = ScratchFiles::create(root.path(), "req-b").await.unwrap();

        let pa = a.nested_path_for("input", "talk.wav").await.unwrap();
        let pb = b.nested_path_for("input", "talk.wav").await.unwrap();
        assert_ne!(pa, pb);
        assert!(pa.starts_with(root.path().join("req-a")));
        assert!(a.dir.is_dir());
    }

    #[tokio::test]
    async fn test_cleanup_removes_files_and_directory() {
        let root = tempdir().unwrap();
        let mut scratch = ScratchFiles::create(root.path(), "req-1").await.unwrap();
        let input = scratch.nested_path_for("input", "talk.wav").await.unwrap();
        let output = scratch.nested_path_for("enhanced", "talk.mp3").await.unwrap();
        tokio::fs::write(&input, b"in").await.unwrap();
        tokio::fs::write(&output, b"out").await.unwrap();
        let dir = scratch.dir.clone();

        assert_eq!(scratch.cleanup().await, 0);
        assert!(!input.exists());
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_stage_directories_do_not_collide_with_inputs() {
        let root = tempdir().unwrap();
        let mut scratch = ScratchFiles::create(root.path(), "req-3").await.unwrap();
        // An upload literally named like the output stage directory.
        let input = scratch.nested_path_for("input", "enhanced").await.unwrap();
        tokio::fs::write(&input, b"in").await.unwrap();
        let output = scratch.nested_path_for("enhanced", "enhanced.wav").await.unwrap();

        assert_ne!(input, output);
        assert!(output.parent().unwrap().is_dir());
        assert_eq!(scratch.files.len(), 2);
        assert_eq!(scratch.cleanup().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_missing_files() {
        let root = tempdir().unwrap();
        let mut scratch = ScratchFiles::create(root.path(), "req-2").await.unwrap();
        let path = scratch
            .nested_path_for("input", "never-written.wav")
            .await
            .unwrap();
        assert!(!path.exists());

        tokio::fs::remove_dir_all(&scratch.dir).await.unwrap();
        assert_eq!(scratch.cleanup().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_counts_failed_deletions() {
        let root = tempdir().unwrap();
        let mut scratch = ScratchFiles::create(root.path(), "req-4").await.unwrap();
        let path = scratch.nested_path_for("input", "talk.wav").await.unwrap();
        // A non-empty directory where a file was expected: remove_file fails.
        tokio::fs::create_dir_all(path.join("nested")).await.unwrap();
        tokio::fs::write(path.join("nested/x"), b"x").await.unwrap();
        let dir = scratch.dir.clone();

        assert!(scratch.cleanup().await > 0);
        assert!(!dir.exists());
    }

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_segment(".."), "_");
        assert_eq!(sanitize_segment("talk.wav"), "talk.wav");
        assert_eq!(sanitize_segment(""), "_");
    }
}
