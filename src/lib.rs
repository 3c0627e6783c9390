//! # wp-vault-sync
//!
//! Keep a folder of markdown notes (a "vault") and a WordPress site in sync.
//!
//! Publishing turns a markdown document with a YAML header into a WordPress
//! post written in block-editor markup; downloading turns existing posts back
//! into vault documents.
//!
//! ## Pipeline Overview
//!
//! ```text
//! vault/post.md
//!  │
//!  ├─ 1. Header    split and parse the YAML front matter
//!  ├─ 2. Media     upload local images, rewrite references to remote URLs
//!  ├─ 3. Render    markdown → flat HTML (pulldown-cmark)
//!  ├─ 4. Blocks    top-level HTML nodes → <!-- wp:… --> blocks
//!  ├─ 5. Terms     category and tag names → ids, created when missing
//!  └─ 6. Send      create (no wp_id) or update (wp_id) the post
//! ```
//!
//! Downloads run the other way: `GET posts` → HTML → markdown (htmd) →
//! `<vault>/<slug>.md` with `wp_id` in the header.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wp_vault_sync::{publish_file, SyncConfig, WpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SyncConfig::builder()
//!         .site_url("https://blog.example.com")
//!         .credentials("editor", "abcd efgh ijkl mnop")
//!         .build()?;
//!     let client = WpClient::new(&config)?;
//!     let outcome = publish_file("vault/hello.md", &client, &config).await?;
//!     match outcome.post_id {
//!         Some(id) => println!("post {id}: {} blocks", outcome.block_count),
//!         None => eprintln!("the site rejected the post; see the log"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The block converter works on its own, without a site:
//!
//! ```rust
//! use wp_vault_sync::convert_html;
//!
//! let markup = convert_html("<h2>Intro</h2>");
//! assert_eq!(
//!     markup,
//!     "<!-- wp:heading {\"level\":2} -->\n<h2 class=\"wp-block-heading\">Intro</h2>\n<!-- /wp:heading -->"
//! );
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `wpsync` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! wp-vault-sync = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod publish;
pub mod vault;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{PostPayload, RemotePost, Taxonomy, WpClient};
pub use config::{PostStatus, SyncConfig, SyncConfigBuilder};
pub use download::{download_post, download_recent};
pub use error::SyncError;
pub use output::{DownloadReport, PublishAction, PublishOutcome, PublishPreview, SavedPost};
pub use pipeline::blocks::{convert_html, Block, BlockConverter};
pub use pipeline::frontmatter::FrontMatter;
pub use progress::{NoopProgressCallback, ProgressCallback, SyncProgressCallback};
pub use publish::{preview_file, publish_file};
pub use vault::{probe_vault, resolve_download_dir};
