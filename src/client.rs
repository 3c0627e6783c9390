//! WordPress REST API client.
//!
//! A thin wrapper over `reqwest` for the handful of `wp/v2` endpoints the
//! pipelines need. Every call is a single attempt authenticated with HTTP
//! Basic (user name + application password), or sent anonymously when no
//! user name is configured. A response is a success only
//! when it carries the exact status the endpoint documents for success
//! (`200` for reads and updates, `201` for creations); anything else becomes
//! [`SyncError::RemoteStatus`] with the response body attached.

use crate::config::{PostStatus, SyncConfig};
use crate::error::SyncError;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// A post as returned by `GET /wp/v2/posts`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemotePost {
    pub id: u64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub status: String,
    pub title: Rendered,
    pub content: Rendered,
}

/// WordPress `{ "rendered": "…" }` wrapper.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// The part of a create/update response we use.
#[derive(Debug, Clone, Deserialize)]
pub struct PostRef {
    pub id: u64,
    #[serde(default)]
    pub link: Option<String>,
}

/// An uploaded media item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedMedia {
    pub id: u64,
    pub source_url: String,
}

/// A category or tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Term {
    pub id: u64,
    pub name: String,
}

/// Which taxonomy endpoint a term lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taxonomy {
    Categories,
    Tags,
}

impl Taxonomy {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Taxonomy::Categories => "categories",
            Taxonomy::Tags => "tags",
        }
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Body of a create or update request.
///
/// Optional members are omitted when empty so an update never clears the
/// featured image or terms by accident.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostPayload {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub slug: String,
    pub meta: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_media: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<u64>,
}

#[derive(Serialize)]
struct NewTerm<'a> {
    name: &'a str,
    slug: String,
}

/// Authenticated client for one WordPress site.
#[derive(Clone)]
pub struct WpClient {
    http: reqwest::Client,
    api_base: String,
    username: String,
    app_password: String,
}

impl fmt::Debug for WpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WpClient")
            .field("api_base", &self.api_base)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl WpClient {
    /// Build a client from the site and credentials in `config`.
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let api_base = config.api_base()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("wp-vault-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_base,
            username: config.username.clone(),
            app_password: config.app_password.clone(),
        })
    }

    /// REST base URL this client talks to.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base, endpoint)
    }

    /// Attach Basic auth; without a user name the request stays anonymous.
    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        if self.username.is_empty() {
            return req;
        }
        req.basic_auth(&self.username, Some(&self.app_password))
    }

    /// `GET posts/<id>`.
    pub async fn get_post(&self, id: u64) -> Result<RemotePost, SyncError> {
        let endpoint = format!("posts/{id}");
        let req = self.authed(self.http.get(self.url(&endpoint)));
        self.send_json(&endpoint, req, StatusCode::OK).await
    }

    /// `GET posts?per_page=<count>&status=publish`, newest first.
    pub async fn recent_posts(&self, count: usize) -> Result<Vec<RemotePost>, SyncError> {
        let endpoint = "posts";
        let req = self
            .authed(self.http.get(self.url(endpoint)))
            .query(&[("per_page", count.to_string()), ("status", "publish".to_string())]);
        self.send_json(endpoint, req, StatusCode::OK).await
    }

    /// Upload a local image as a media item (`POST media`).
    pub async fn upload_media(&self, path: &Path) -> Result<UploadedMedia, SyncError> {
        if !path.is_file() {
            return Err(SyncError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SyncError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let endpoint = "media";
        let req = self
            .authed(self.http.post(self.url(endpoint)))
            .header(CONTENT_DISPOSITION, format!("attachment; filename={file_name}"))
            .header(CONTENT_TYPE, image_mime_type(&file_name))
            .body(bytes);
        self.send_json(endpoint, req, StatusCode::CREATED).await
    }

    /// `GET <taxonomy>?search=<name>`.
    pub async fn search_terms(&self, taxonomy: Taxonomy, name: &str) -> Result<Vec<Term>, SyncError> {
        let endpoint = taxonomy.endpoint();
        let req = self
            .authed(self.http.get(self.url(endpoint)))
            .query(&[("search", name)]);
        self.send_json(endpoint, req, StatusCode::OK).await
    }

    /// `POST <taxonomy>` with the name and its slug.
    pub async fn create_term(&self, taxonomy: Taxonomy, name: &str) -> Result<Term, SyncError> {
        let endpoint = taxonomy.endpoint();
        let body = NewTerm {
            name,
            slug: slug::slugify(name),
        };
        let req = self.authed(self.http.post(self.url(endpoint))).json(&body);
        self.send_json(endpoint, req, StatusCode::CREATED).await
    }

    /// `POST posts`.
    pub async fn create_post(&self, payload: &PostPayload) -> Result<PostRef, SyncError> {
        let endpoint = "posts";
        let req = self.authed(self.http.post(self.url(endpoint))).json(payload);
        self.send_json(endpoint, req, StatusCode::CREATED).await
    }

    /// `POST posts/<id>`; replaces content and metadata wholesale.
    pub async fn update_post(&self, id: u64, payload: &PostPayload) -> Result<PostRef, SyncError> {
        let endpoint = format!("posts/{id}");
        let req = self.authed(self.http.post(self.url(&endpoint))).json(payload);
        self.send_json(&endpoint, req, StatusCode::OK).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        req: RequestBuilder,
        expected: StatusCode,
    ) -> Result<T, SyncError> {
        let response = req.send().await.map_err(|e| SyncError::Http {
            url: self.url(endpoint),
            source: e,
        })?;
        let response = expect_status(endpoint, response, expected).await?;
        response.json::<T>().await.map_err(|e| SyncError::Decode {
            endpoint: endpoint.to_string(),
            detail: e.to_string(),
        })
    }
}

async fn expect_status(
    endpoint: &str,
    response: Response,
    expected: StatusCode,
) -> Result<Response, SyncError> {
    let status = response.status();
    debug!("{} → HTTP {}", endpoint, status);
    if status == expected {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SyncError::RemoteStatus {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// Content type for an image upload, from the file extension.
pub fn image_mime_type(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_types() {
        assert_eq!(image_mime_type("a.png"), "image/png");
        assert_eq!(image_mime_type("A.PNG"), "image/png");
        assert_eq!(image_mime_type("anim.gif"), "image/gif");
        assert_eq!(image_mime_type("photo.jpg"), "image/jpeg");
        assert_eq!(image_mime_type("no-extension"), "image/jpeg");
    }

    #[test]
    fn payload_omits_empty_optionals() {
        let payload = PostPayload {
            title: "T".into(),
            content: "C".into(),
            status: PostStatus::Draft,
            slug: "t".into(),
            meta: BTreeMap::from([("_seopress_titles_desc".to_string(), "d".to_string())]),
            featured_media: None,
            categories: vec![],
            tags: vec![],
        };
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["status"], "draft");
        assert_eq!(v["meta"]["_seopress_titles_desc"], "d");
        assert!(v.get("featured_media").is_none());
        assert!(v.get("categories").is_none());
        assert!(v.get("tags").is_none());
    }

    #[test]
    fn remote_post_deserialises() {
        let json = r#"{"id":5,"date":"2024-01-02T03:04:05","slug":"hi","status":"publish",
                       "title":{"rendered":"Hi"},"content":{"rendered":"<p>x</p>","protected":false}}"#;
        let post: RemotePost = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, 5);
        assert_eq!(post.title.rendered, "Hi");
        assert_eq!(post.content.rendered, "<p>x</p>");
    }

    #[test]
    fn client_requires_site() {
        let err = WpClient::new(&SyncConfig::default()).unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig(_)));
    }

    #[test]
    fn taxonomy_endpoints() {
        assert_eq!(Taxonomy::Categories.endpoint(), "categories");
        assert_eq!(Taxonomy::Tags.to_string(), "tags");
    }
}
