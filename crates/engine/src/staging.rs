// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem staging of artifacts between nodes.
//!
//! Each node runs in `<nodes_root>/<id>/`. Before a run the directory is
//! rebuilt from scratch: directory-typed input ports are created, then every
//! predecessor output named by a file edge is copied into the matching input
//! port. The plan is computed under the serializer (pure lookups); the I/O
//! here runs in the job's background task.

use std::path::{Path, PathBuf};

/// Everything the background task needs to prepare a working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    /// The node's working directory.
    pub dir: PathBuf,
    /// Input ports declared with a trailing `/`, created as directories.
    pub subdirs: Vec<PathBuf>,
    /// `(source, destination)` pairs, one per incoming file edge.
    pub copies: Vec<(PathBuf, PathBuf)>,
}

/// Rebuild the working directory and stage every input.
pub async fn apply(plan: &StagePlan) -> Result<(), String> {
    match tokio::fs::remove_dir_all(&plan.dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(format!("failed to clear {}: {e}", plan.dir.display())),
    }
    tokio::fs::create_dir_all(&plan.dir)
        .await
        .map_err(|e| format!("failed to create {}: {e}", plan.dir.display()))?;

    for subdir in &plan.subdirs {
        tokio::fs::create_dir_all(subdir)
            .await
            .map_err(|e| format!("failed to create {}: {e}", subdir.display()))?;
    }

    for (src, dst) in &plan.copies {
        copy_tree(src, dst)
            .await
            .map_err(|e| format!("failed to copy {} to {}: {e}", src.display(), dst.display()))?;
    }

    Ok(())
}

/// Remove a node's working directory (reset path). Missing is fine.
pub fn clear_dir(dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to clear node directory");
        }
    }
}

/// Copy a file or directory tree.
async fn copy_tree(src: &Path, dst: &Path) -> std::io::Result<()> {
    let meta = tokio::fs::metadata(src).await?;
    if !meta.is_dir() {
        if let Some(parent) = dst.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(src, dst).await?;
        return Ok(());
    }

    tokio::fs::create_dir_all(dst).await?;
    let mut pending = vec![(src.to_path_buf(), dst.to_path_buf())];
    while let Some((from, to)) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&from).await?;
        while let Some(entry) = entries.next_entry().await? {
            let target = to.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                tokio::fs::create_dir_all(&target).await?;
                pending.push((entry.path(), target));
            } else {
                tokio::fs::copy(entry.path(), &target).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "staging_tests.rs"]
mod tests;
