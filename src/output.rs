//! Result types returned by the publish and download entry points.

use crate::config::PostStatus;
use crate::pipeline::media::MediaReference;
use serde::Serialize;
use std::path::PathBuf;

/// Whether a publish created a new post or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishAction {
    Created,
    Updated,
}

/// Outcome of publishing one document.
///
/// A remote failure of the create/update call is not an error: `post_id` is
/// `None` and the failure has been logged.
#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub action: PublishAction,
    /// Id reported by WordPress; `None` when the call did not succeed.
    pub post_id: Option<u64>,
    pub link: Option<String>,
    pub title: String,
    pub slug: String,
    pub status: PostStatus,
    pub featured_media: Option<u64>,
    #[serde(skip)]
    pub uploaded_media: Vec<MediaReference>,
    pub category_ids: Vec<u64>,
    pub tag_ids: Vec<u64>,
    /// Number of blocks in the converted content.
    pub block_count: usize,
    /// Whether the local file was rewritten afterwards.
    pub written_back: bool,
}

impl PublishOutcome {
    pub fn succeeded(&self) -> bool {
        self.post_id.is_some()
    }
}

/// Converted document ready to send, without any remote calls made.
#[derive(Debug, Clone, Serialize)]
pub struct PublishPreview {
    pub title: String,
    pub slug: String,
    pub status: PostStatus,
    pub description: String,
    /// Serialised block markup.
    pub content: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    /// Local image references that a real publish would upload.
    pub pending_images: Vec<String>,
}

/// A post written to the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedPost {
    pub post_id: u64,
    pub title: String,
    pub path: PathBuf,
}

/// Outcome of a download run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadReport {
    /// Posts returned by WordPress.
    pub fetched: usize,
    pub saved: Vec<SavedPost>,
    /// Posts that were fetched but could not be written.
    pub failed: usize,
}
