//! Publish entry points: vault document → WordPress post.
//!
//! [`publish_file`] runs the whole pipeline against a live site;
//! [`preview_file`] runs the offline part of it and returns what would be
//! sent.
//!
//! Only local problems are fatal (missing or unreadable file, malformed front
//! matter, failed write-back). Anything the site rejects is logged and
//! reported through the returned [`PublishOutcome`].

use crate::client::{PostPayload, Taxonomy, WpClient};
use crate::config::{PostStatus, SyncConfig};
use crate::error::SyncError;
use crate::output::{PublishAction, PublishOutcome, PublishPreview};
use crate::pipeline::blocks::{join_blocks, BlockConverter};
use crate::pipeline::frontmatter::{parse_front_matter, render_document, FrontMatter};
use crate::pipeline::markdown::{markdown_to_html, seo_description};
use crate::pipeline::media::{find_image_refs, resolve_images};
use crate::pipeline::taxonomy::resolve_terms;
use crate::vault::probe_vault;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Fields derived from the header, with their fallbacks applied.
#[derive(Debug)]
struct PostFields {
    title: String,
    slug: String,
    description: String,
    status: PostStatus,
}

impl PostFields {
    fn derive(front_matter: &FrontMatter, body: &str, path: &Path) -> Self {
        let title = non_empty(front_matter.title.as_deref()).unwrap_or_else(|| file_stem(path));
        let slug = non_empty(front_matter.slug.as_deref()).unwrap_or_else(|| slug::slugify(&title));
        let description = non_empty(front_matter.description.as_deref())
            .unwrap_or_else(|| seo_description(body));
        let status = front_matter.status.unwrap_or(if front_matter.wp_id.is_some() {
            PostStatus::Publish
        } else {
            PostStatus::Draft
        });
        Self {
            title,
            slug,
            description,
            status,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Markdown body → serialised blocks, plus the block count.
fn convert_body(markdown: &str, config: &SyncConfig) -> (String, usize) {
    let html = markdown_to_html(markdown);
    let blocks = BlockConverter::from_config(config).to_blocks(&html);
    (join_blocks(&blocks), blocks.len())
}

async fn read_document(path: &Path) -> Result<String, SyncError> {
    if !path.exists() {
        return Err(SyncError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SyncError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

fn document_dir(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Publish one vault document.
///
/// Creates a new post when the header has no `wp_id`, otherwise updates that
/// post. The content and metadata are replaced wholesale either way.
///
/// # Errors
/// Returns `Err` only for local failures: the file is missing or unreadable,
/// its front matter is malformed, or the write-back could not be written.
/// A rejected create or update comes back as `Ok` with `post_id: None`.
pub async fn publish_file(
    path: impl AsRef<Path>,
    client: &WpClient,
    config: &SyncConfig,
) -> Result<PublishOutcome, SyncError> {
    let path = path.as_ref();
    info!("Publishing {}", path.display());

    // ── Step 1: Read and split the document ──────────────────────────────
    let text = read_document(path).await?;
    let (mut front_matter, body) = parse_front_matter(&text, path)?;

    if let Some(vault) = probe_vault(&config.vault_candidates) {
        info!("Current vault: {}", vault.display());
    }

    // ── Step 2: Upload local images ──────────────────────────────────────
    let images = resolve_images(
        client,
        &body,
        &document_dir(path),
        front_matter.wp_id.is_some(),
    )
    .await;

    // ── Step 3: Convert to blocks ────────────────────────────────────────
    let fields = PostFields::derive(&front_matter, &body, path);
    let (content, block_count) = convert_body(&images.markdown, config);
    debug!("Converted body into {} blocks", block_count);

    // ── Step 4: Resolve taxonomy ─────────────────────────────────────────
    let category_ids =
        resolve_terms(client, Taxonomy::Categories, &front_matter.categories.to_vec()).await;
    let tag_ids = resolve_terms(client, Taxonomy::Tags, &front_matter.tags.to_vec()).await;

    let payload = PostPayload {
        title: fields.title.clone(),
        content,
        status: fields.status,
        slug: fields.slug.clone(),
        meta: BTreeMap::from([(config.seo_meta_key.clone(), fields.description.clone())]),
        featured_media: images.featured_media,
        categories: category_ids.clone(),
        tags: tag_ids.clone(),
    };

    // ── Step 5: Create or update ─────────────────────────────────────────
    let (action, result) = match front_matter.wp_id {
        Some(id) => {
            info!("wp_id {} found, updating the existing post", id);
            (PublishAction::Updated, client.update_post(id, &payload).await)
        }
        None => {
            info!("No wp_id found, creating a new post");
            (PublishAction::Created, client.create_post(&payload).await)
        }
    };

    let (post_id, link) = match result {
        Ok(post) => {
            match action {
                PublishAction::Created => info!("Created post {}", post.id),
                PublishAction::Updated => info!("Updated post {}", post.id),
            }
            if let Some(link) = &post.link {
                info!("Link: {}", link);
            }
            (Some(post.id), post.link)
        }
        Err(e) => {
            error!("Publishing '{}' failed: {}", fields.title, e);
            (None, None)
        }
    };

    // ── Step 6: Optional write-back ──────────────────────────────────────
    let mut written_back = false;
    if let (Some(id), true) = (post_id, config.write_back) {
        front_matter.wp_id = Some(id);
        let document = render_document(&front_matter, &images.markdown)?;
        write_atomic(path, &document).await?;
        info!("Wrote wp_id {} back to {}", id, path.display());
        written_back = true;
    }

    Ok(PublishOutcome {
        action,
        post_id,
        link,
        title: fields.title,
        slug: fields.slug,
        status: fields.status,
        featured_media: images.featured_media,
        uploaded_media: images.references,
        category_ids,
        tag_ids,
        block_count,
        written_back,
    })
}

/// Convert a document without talking to the site.
///
/// Images stay as written; the local ones are listed in
/// [`PublishPreview::pending_images`] unless the document already has a
/// `wp_id`, in which case a publish would not upload them either.
pub fn preview_file(path: impl AsRef<Path>, config: &SyncConfig) -> Result<PublishPreview, SyncError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SyncError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|e| SyncError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let (front_matter, body) = parse_front_matter(&text, path)?;

    let fields = PostFields::derive(&front_matter, &body, path);
    let (content, _) = convert_body(&body, config);
    let pending_images = if front_matter.wp_id.is_some() {
        Vec::new()
    } else {
        find_image_refs(&body)
            .into_iter()
            .filter(|image| !image.path.starts_with("http"))
            .map(|image| image.path)
            .collect()
    };

    Ok(PublishPreview {
        title: fields.title,
        slug: fields.slug,
        status: fields.status,
        description: fields.description,
        content,
        categories: front_matter.categories.to_vec(),
        tags: front_matter.tags.to_vec(),
        pending_images,
    })
}

/// Write `contents` next to `path` and rename it into place.
pub(crate) async fn write_atomic(path: &Path, contents: &str) -> Result<(), SyncError> {
    let to_error = |e| SyncError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(to_error)?;
    }
    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, contents).await.map_err(to_error)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(to_error)
}
