//! Progress-callback trait for download events.
//!
//! Inject an [`Arc<dyn SyncProgressCallback>`] via
//! [`crate::config::SyncConfigBuilder::progress_callback`] to be told about
//! each post as a download batch works through it. The `wpsync` binary uses it
//! to drive an `indicatif` bar; library users can forward the events wherever
//! they like.
//!
//! # Example
//!
//! ```rust
//! use wp_vault_sync::{SyncConfig, SyncProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     saved: AtomicUsize,
//! }
//!
//! impl SyncProgressCallback for CountingCallback {
//!     fn on_post_saved(&self, post_id: u64, path: &Path) {
//!         self.saved.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("post {post_id} → {}", path.display());
//!     }
//! }
//!
//! let config = SyncConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { saved: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the download pipeline as it processes each post.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Posts are handled one at a time, but the trait is
/// `Send + Sync` so a callback can be shared with other threads.
pub trait SyncProgressCallback: Send + Sync {
    /// Called once the list of posts to save is known.
    fn on_download_start(&self, total_posts: usize) {
        let _ = total_posts;
    }

    /// Called after a post has been written to the vault.
    fn on_post_saved(&self, post_id: u64, path: &Path) {
        let _ = (post_id, path);
    }

    /// Called when a post could not be converted or written.
    fn on_post_error(&self, post_id: u64, error: &str) {
        let _ = (post_id, error);
    }

    /// Called once after every post has been attempted.
    fn on_download_complete(&self, total_posts: usize, saved_count: usize) {
        let _ = (total_posts, saved_count);
    }
}

/// A no-op implementation.
pub struct NoopProgressCallback;

impl SyncProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SyncConfig`].
pub type ProgressCallback = Arc<dyn SyncProgressCallback>;
