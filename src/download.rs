//! Download entry points: WordPress posts → vault documents.
//!
//! Each fetched post is turned into a vault document: the rendered title is
//! decoded to plain text, the rendered content goes through
//! [`html_to_markdown`], and a fresh header records the remote id so a later
//! publish updates the same post.

use crate::client::{RemotePost, WpClient};
use crate::config::{PostStatus, SyncConfig};
use crate::error::SyncError;
use crate::output::{DownloadReport, SavedPost};
use crate::pipeline::frontmatter::{render_document, FrontMatter};
use crate::pipeline::markdown::{html_text, html_to_markdown};
use crate::publish::write_atomic;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Download one post by id into `dir`.
///
/// A failed fetch is logged and yields an empty report.
pub async fn download_post(
    client: &WpClient,
    post_id: u64,
    dir: impl AsRef<Path>,
    config: &SyncConfig,
) -> Result<DownloadReport, SyncError> {
    info!("Fetching post {}", post_id);
    let posts = match client.get_post(post_id).await {
        Ok(post) => vec![post],
        Err(e) => {
            error!("Fetching post {} failed: {}", post_id, e);
            return Ok(DownloadReport::default());
        }
    };
    save_all(&posts, dir.as_ref(), config).await
}

/// Download the `count` most recent published posts into `dir`.
///
/// A failed fetch is logged and yields an empty report.
pub async fn download_recent(
    client: &WpClient,
    count: usize,
    dir: impl AsRef<Path>,
    config: &SyncConfig,
) -> Result<DownloadReport, SyncError> {
    info!("Fetching the {} most recent posts", count);
    let posts = match client.recent_posts(count).await {
        Ok(posts) => posts,
        Err(e) => {
            error!("Fetching recent posts failed: {}", e);
            return Ok(DownloadReport::default());
        }
    };
    save_all(&posts, dir.as_ref(), config).await
}

async fn save_all(
    posts: &[RemotePost],
    dir: &Path,
    config: &SyncConfig,
) -> Result<DownloadReport, SyncError> {
    let callback = config.progress_callback.as_ref();
    if let Some(cb) = callback {
        cb.on_download_start(posts.len());
    }

    let mut report = DownloadReport {
        fetched: posts.len(),
        ..Default::default()
    };
    for post in posts {
        match save_post(post, dir).await {
            Ok(saved) => {
                info!("Saved post {} to {}", saved.post_id, saved.path.display());
                if let Some(cb) = callback {
                    cb.on_post_saved(saved.post_id, &saved.path);
                }
                report.saved.push(saved);
            }
            Err(e) => {
                warn!("Could not save post {}: {}", post.id, e);
                if let Some(cb) = callback {
                    cb.on_post_error(post.id, &e.to_string());
                }
                report.failed += 1;
            }
        }
    }

    if let Some(cb) = callback {
        cb.on_download_complete(report.fetched, report.saved.len());
    }
    Ok(report)
}

/// File name for a post: `<slug>.md`, or `post-<id>.md` without a slug.
pub fn post_file_name(post: &RemotePost) -> String {
    let slug = post.slug.trim();
    if slug.is_empty() || slug.contains(['/', '\\']) {
        format!("post-{}.md", post.id)
    } else {
        format!("{slug}.md")
    }
}

/// Render a fetched post as a vault document.
pub fn post_to_document(post: &RemotePost) -> Result<(String, String), SyncError> {
    let title = html_text(&post.title.rendered);
    let body = html_to_markdown(&post.content.rendered)?;
    let front_matter = FrontMatter {
        wp_id: Some(post.id),
        title: Some(title.clone()),
        date: Some(post.date.clone()).filter(|d| !d.is_empty()),
        slug: Some(post.slug.clone()).filter(|s| !s.is_empty()),
        status: Some(PostStatus::Publish),
        ..Default::default()
    };
    Ok((title, render_document(&front_matter, &body)?))
}

async fn save_post(post: &RemotePost, dir: &Path) -> Result<SavedPost, SyncError> {
    let (title, document) = post_to_document(post)?;
    let path: PathBuf = dir.join(post_file_name(post));
    write_atomic(&path, &document).await?;
    Ok(SavedPost {
        post_id: post.id,
        title,
        path,
    })
}
