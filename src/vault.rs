//! Vault location probing.
//!
//! The vault can live in different places on different machines, so a run
//! probes a list of candidate vault roots once at startup instead of relying
//! on a single configured path. Publishing only reports which root is
//! present; downloads go into the [`DOWNLOAD_DIR_NAME`] folder of that root.

use crate::error::SyncError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Folder that receives downloaded posts, inside the vault or, without one,
/// next to the executable.
pub const DOWNLOAD_DIR_NAME: &str = "OldPosts";

/// First candidate that exists.
pub fn probe_vault(candidates: &[PathBuf]) -> Option<PathBuf> {
    let found = candidates.iter().find(|p| p.exists()).cloned();
    match &found {
        Some(p) => debug!("Vault found at {}", p.display()),
        None => debug!("None of {} vault candidates exist", candidates.len()),
    }
    found
}

/// Pick the download directory and make sure it exists.
///
/// `candidates` are vault roots. The first root that exists yields
/// `<root>/OldPosts`, created if needed. Without one the directory is
/// `OldPosts/` next to the running executable.
pub fn resolve_download_dir(candidates: &[PathBuf]) -> Result<PathBuf, SyncError> {
    let dir = match probe_vault(candidates) {
        Some(root) => root.join(DOWNLOAD_DIR_NAME),
        None => fallback_dir()?,
    };
    std::fs::create_dir_all(&dir).map_err(|e| SyncError::WriteFailed {
        path: dir.clone(),
        source: e,
    })?;
    info!("Saving downloads to {}", dir.display());
    Ok(dir)
}

fn fallback_dir() -> Result<PathBuf, SyncError> {
    let exe = std::env::current_exe()
        .map_err(|e| SyncError::Internal(format!("cannot locate the running executable: {e}")))?;
    let base = exe.parent().unwrap_or_else(|| Path::new("."));
    Ok(base.join(DOWNLOAD_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_existing_vault_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing");
        let present = tmp.path().to_path_buf();
        assert_eq!(probe_vault(&[missing.clone(), present.clone()]), Some(present));
        assert_eq!(probe_vault(&[missing]), None);
        assert_eq!(probe_vault(&[]), None);
    }

    #[test]
    fn downloads_go_into_old_posts_of_first_vault() {
        let tmp = tempfile::tempdir().unwrap();
        let unmounted = tmp.path().join("no-such-drive").join("Vault");
        let vault = tmp.path().join("Vault");
        std::fs::create_dir(&vault).unwrap();

        let dir = resolve_download_dir(&[unmounted, vault.clone()]).unwrap();
        assert_eq!(dir, vault.join("OldPosts"));
        assert!(dir.is_dir(), "download folder should be created");
    }

    #[test]
    fn existing_old_posts_folder_is_reused() {
        let tmp = tempfile::tempdir().unwrap();
        let old_posts = tmp.path().join("OldPosts");
        std::fs::create_dir(&old_posts).unwrap();
        std::fs::write(old_posts.join("kept.md"), "x").unwrap();

        let dir = resolve_download_dir(&[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(dir, old_posts);
        assert!(dir.join("kept.md").is_file());
    }

    #[test]
    fn download_dir_falls_back_next_to_executable() {
        let tmp = tempfile::tempdir().unwrap();
        let unmounted = tmp.path().join("a").join("b").join("Vault");
        let dir = resolve_download_dir(&[unmounted]).unwrap();
        assert!(dir.ends_with(DOWNLOAD_DIR_NAME));
        assert!(dir.is_dir());
    }
}
