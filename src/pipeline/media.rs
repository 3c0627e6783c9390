//! Media resolution: upload local images and rewrite their references.
//!
//! Two reference forms are recognised in the markdown body:
//!
//! * markdown images, `![alt](path/to/image.png)`
//! * wiki embeds, `![[path/to/image.png|alt]]` (the `|alt` part is optional)
//!
//! A reference is uploaded when it points at an existing local file, and is
//! replaced by `![alt](<remote url>)`. It is left untouched when the document
//! already has a remote id, when the path is already a URL, when the file is
//! missing, or when the upload fails.
//!
//! Each distinct local path is uploaded once per document. The first image
//! that uploads successfully is the featured-image candidate. All of this is
//! returned as an [`ImageRewrite`] value rather than kept in shared state.

use crate::client::WpClient;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

static RE_IMAGE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)|!\[\[(.*?)\]\]").unwrap());

/// An image reference found in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Percent-decoded path as written in the document.
    pub path: String,
    pub alt: String,
}

impl ImageRef {
    fn from_captures(caps: &Captures<'_>) -> Self {
        if let Some(target) = caps.get(2) {
            return Self {
                path: decode(target.as_str()),
                alt: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
            };
        }
        let inner = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        let (path, alt) = inner.split_once('|').unwrap_or((inner, ""));
        Self {
            path: decode(path),
            alt: alt.to_string(),
        }
    }

    fn is_remote(&self) -> bool {
        self.path.starts_with("http")
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// A local image that now lives on the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub local_path: PathBuf,
    pub remote_id: u64,
    pub remote_url: String,
}

/// Result of rewriting a document's images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRewrite {
    /// Body with uploaded images pointing at their remote URLs.
    pub markdown: String,
    /// Id of the first image uploaded, if any.
    pub featured_media: Option<u64>,
    /// One entry per distinct uploaded path, in upload order.
    pub references: Vec<MediaReference>,
}

impl ImageRewrite {
    fn unchanged(body: &str) -> Self {
        Self {
            markdown: body.to_string(),
            ..Default::default()
        }
    }
}

/// All image references in `body`, in document order.
pub fn find_image_refs(body: &str) -> Vec<ImageRef> {
    RE_IMAGE_REF
        .captures_iter(body)
        .map(|caps| ImageRef::from_captures(&caps))
        .collect()
}

/// Upload the local images referenced in `body` and rewrite the references.
///
/// `base_dir` is the directory of the document; relative paths are resolved
/// against it. When `has_remote_id` is set nothing is uploaded.
pub async fn resolve_images(
    client: &WpClient,
    body: &str,
    base_dir: &Path,
    has_remote_id: bool,
) -> ImageRewrite {
    if has_remote_id {
        debug!("Document already has a remote id; leaving image references untouched");
        return ImageRewrite::unchanged(body);
    }

    let mut rewrite = ImageRewrite::default();
    let mut resolved: HashMap<PathBuf, Option<String>> = HashMap::new();
    let mut out = String::with_capacity(body.len());
    let mut last = 0;

    for caps in RE_IMAGE_REF.captures_iter(body) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&body[last..whole.start()]);
        last = whole.end();

        let image = ImageRef::from_captures(&caps);
        if image.is_remote() {
            out.push_str(whole.as_str());
            continue;
        }

        let full_path = base_dir.join(&image.path);
        let url = match resolved.get(&full_path) {
            Some(cached) => cached.clone(),
            None => {
                let url = upload(client, &full_path, &mut rewrite).await;
                resolved.insert(full_path, url.clone());
                url
            }
        };

        match url {
            Some(url) => out.push_str(&format!("![{}]({})", image.alt, url)),
            None => out.push_str(whole.as_str()),
        }
    }
    out.push_str(&body[last..]);

    rewrite.markdown = out;
    rewrite
}

async fn upload(client: &WpClient, path: &Path, rewrite: &mut ImageRewrite) -> Option<String> {
    if !path.is_file() {
        warn!("Image not found, leaving reference as is: {}", path.display());
        return None;
    }
    match client.upload_media(path).await {
        Ok(media) => {
            info!("Uploaded {} → {} (media {})", path.display(), media.source_url, media.id);
            rewrite.featured_media.get_or_insert(media.id);
            rewrite.references.push(MediaReference {
                local_path: path.to_path_buf(),
                remote_id: media.id,
                remote_url: media.source_url.clone(),
            });
            Some(media.source_url)
        }
        Err(e) => {
            warn!("Upload failed for {}: {}", path.display(), e);
            None
        }
    }
}
