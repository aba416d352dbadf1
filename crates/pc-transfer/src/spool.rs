//! Receiver-side temporary spool directory (§3 "Receiver spool").

use pc_core::error::ClipResult;
use std::path::PathBuf;

/// Fixed spool directory name used on every host, under the OS temp root.
pub const SPOOL_DIR_NAME: &str = "ShareClipbrd_60D54950";

/// Returns the spool directory's path without creating it.
pub fn spool_root() -> PathBuf {
    spool_root_under(&std::env::temp_dir())
}

/// Returns the spool directory's path under an arbitrary base directory,
/// without creating it. Exists so tests can exercise the recreate logic
/// against a disposable `tempfile::TempDir` instead of the real OS temp root.
pub fn spool_root_under(base: &std::path::Path) -> PathBuf {
    base.join(SPOOL_DIR_NAME)
}

/// Destructively recreates the spool directory for a new file-drop session:
/// best-effort recursive delete, then create. Each accepted session starts
/// from an empty spool so stale entries from a prior drop can never leak
/// into the path list handed to dispatch.
pub async fn recreate_spool() -> ClipResult<PathBuf> {
    recreate_spool_under(&std::env::temp_dir()).await
}

/// Same as `recreate_spool`, rooted under an arbitrary base directory.
pub async fn recreate_spool_under(base: &std::path::Path) -> ClipResult<PathBuf> {
    let root = spool_root_under(base);
    let _ = tokio::fs::remove_dir_all(&root).await;
    tokio::fs::create_dir_all(&root).await?;
    Ok(root)
}
