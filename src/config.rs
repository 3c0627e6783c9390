//! Configuration types for vault ↔ WordPress synchronisation.
//!
//! Everything a run needs (site, credentials, vault candidates, conversion
//! knobs) lives in [`SyncConfig`], built via [`SyncConfigBuilder`]. The
//! library never reads environment variables itself; the `wpsync` binary maps
//! its flags onto the builder.

use crate::error::SyncError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// URL fragments and file extensions that mark a link as a video.
///
/// Matching is a case-sensitive substring test, not URL parsing.
pub const DEFAULT_VIDEO_PATTERNS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "vimeo.com",
    ".mp4",
    ".webm",
    ".ogg",
];

/// Post meta key that receives the SEO description (SEOPress).
pub const DEFAULT_SEO_META_KEY: &str = "_seopress_titles_desc";

/// Configuration for a publish or download run.
///
/// # Example
/// ```rust
/// use wp_vault_sync::SyncConfig;
///
/// let config = SyncConfig::builder()
///     .site_url("https://blog.example.com")
///     .credentials("editor", "abcd efgh ijkl mnop")
///     .download_count(5)
///     .build()
///     .unwrap();
/// assert_eq!(config.api_base().unwrap(), "https://blog.example.com/wp-json/wp/v2/");
/// ```
#[derive(Clone)]
pub struct SyncConfig {
    /// Root URL of the WordPress site, e.g. `https://blog.example.com`.
    /// Required by every remote operation; `None` is allowed for dry runs.
    pub site_url: Option<String>,

    /// WordPress user name for HTTP Basic authentication.
    pub username: String,

    /// Application password generated in the WordPress profile screen.
    pub app_password: String,

    /// Number of recent posts fetched by a download without a post id. Default: 1.
    pub download_count: usize,

    /// Vault roots probed in order at startup. Default: empty.
    ///
    /// Publishing only logs which one is present. Downloading writes into
    /// `OldPosts/` of the first existing root, falling back to `OldPosts/`
    /// next to the executable.
    pub vault_candidates: Vec<PathBuf>,

    /// Post meta key receiving the SEO description. Default: `_seopress_titles_desc`.
    pub seo_meta_key: String,

    /// Substrings that classify an iframe or anchor URL as a video embed.
    /// Default: [`DEFAULT_VIDEO_PATTERNS`].
    pub video_patterns: Vec<String>,

    /// Rewrite the local file after a successful publish (sets `wp_id`, keeps
    /// uploaded image URLs). Default: false.
    pub write_back: bool,

    /// Optional observer for download progress.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            site_url: None,
            username: String::new(),
            app_password: String::new(),
            download_count: 1,
            vault_candidates: Vec::new(),
            seo_meta_key: DEFAULT_SEO_META_KEY.to_string(),
            video_patterns: DEFAULT_VIDEO_PATTERNS.iter().map(|s| s.to_string()).collect(),
            write_back: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("site_url", &self.site_url)
            .field("username", &self.username)
            .field("app_password", &"<redacted>")
            .field("download_count", &self.download_count)
            .field("vault_candidates", &self.vault_candidates)
            .field("seo_meta_key", &self.seo_meta_key)
            .field("video_patterns", &self.video_patterns)
            .field("write_back", &self.write_back)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn SyncProgressCallback>"),
            )
            .finish()
    }
}

impl SyncConfig {
    /// Create a new builder for `SyncConfig`.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder {
            config: Self::default(),
        }
    }

    /// REST base URL, `<site>/wp-json/wp/v2/`.
    pub fn api_base(&self) -> Result<String, SyncError> {
        let site = self.site_url.as_deref().ok_or_else(|| {
            SyncError::InvalidConfig("no WordPress site URL configured (use --site)".into())
        })?;
        Ok(format!("{}/wp-json/wp/v2/", site.trim_end_matches('/')))
    }
}

/// Builder for [`SyncConfig`].
#[derive(Debug)]
pub struct SyncConfigBuilder {
    config: SyncConfig,
}

impl SyncConfigBuilder {
    pub fn site_url(mut self, url: impl Into<String>) -> Self {
        self.config.site_url = Some(url.into());
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, app_password: impl Into<String>) -> Self {
        self.config.username = username.into();
        self.config.app_password = app_password.into();
        self
    }

    pub fn download_count(mut self, n: usize) -> Self {
        self.config.download_count = n;
        self
    }

    pub fn vault_candidate(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.vault_candidates.push(path.into());
        self
    }

    pub fn vault_candidates(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.vault_candidates = paths;
        self
    }

    pub fn seo_meta_key(mut self, key: impl Into<String>) -> Self {
        self.config.seo_meta_key = key.into();
        self
    }

    /// Replace the video detection list.
    pub fn video_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.video_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn write_back(mut self, v: bool) -> Self {
        self.config.write_back = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SyncConfig, SyncError> {
        let c = &self.config;
        if let Some(ref url) = c.site_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(SyncError::InvalidConfig(format!(
                    "site URL must start with http:// or https://, got '{url}'"
                )));
            }
        }
        if c.download_count == 0 {
            return Err(SyncError::InvalidConfig(
                "download count must be ≥ 1".into(),
            ));
        }
        if c.seo_meta_key.trim().is_empty() {
            return Err(SyncError::InvalidConfig("SEO meta key must not be empty".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// WordPress post status as written in front matter and sent to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Not visible on the site. Default for newly created posts.
    #[default]
    Draft,
    /// Live on the site. Default when updating an existing post.
    Publish,
    /// Awaiting review.
    Pending,
    /// Visible to logged-in editors only.
    Private,
    /// Scheduled.
    Future,
}

impl PostStatus {
    /// The wire value used by the REST API.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Publish => "publish",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
            PostStatus::Future => "future",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = SyncConfig::default();
        assert_eq!(c.download_count, 1);
        assert_eq!(c.seo_meta_key, "_seopress_titles_desc");
        assert_eq!(c.video_patterns.len(), DEFAULT_VIDEO_PATTERNS.len());
        assert!(!c.write_back);
        assert!(c.site_url.is_none());
    }

    #[test]
    fn api_base_trims_trailing_slash() {
        let c = SyncConfig::builder()
            .site_url("https://blog.example.com/")
            .build()
            .unwrap();
        assert_eq!(c.api_base().unwrap(), "https://blog.example.com/wp-json/wp/v2/");
    }

    #[test]
    fn api_base_requires_site() {
        let c = SyncConfig::default();
        assert!(matches!(c.api_base(), Err(SyncError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_non_http_site() {
        let err = SyncConfig::builder()
            .site_url("ftp://blog.example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ftp://"));
    }

    #[test]
    fn rejects_zero_download_count() {
        assert!(SyncConfig::builder().download_count(0).build().is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let c = SyncConfig::builder()
            .credentials("editor", "secret-app-password")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-app-password"));
        assert!(dbg.contains("editor"));
    }

    #[test]
    fn post_status_serde_lowercase() {
        let s: PostStatus = serde_yaml::from_str("publish").unwrap();
        assert_eq!(s, PostStatus::Publish);
        assert_eq!(serde_json::to_string(&PostStatus::Draft).unwrap(), "\"draft\"");
        assert_eq!(PostStatus::default(), PostStatus::Draft);
    }
}
