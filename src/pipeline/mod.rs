//! Pipeline stages for publishing a vault document.
//!
//! Each submodule implements one transformation step and can be tested on its
//! own. Only [`media`] and [`taxonomy`] talk to the network.
//!
//! ## Data Flow
//!
//! ```text
//! frontmatter ──▶ media ──▶ markdown ──▶ blocks ──▶ taxonomy
//!  (header)     (uploads)   (→ HTML)    (→ wp:)    (term ids)
//! ```
//!
//! 1. [`frontmatter`] — split the YAML header from the body
//! 2. [`media`]       — upload local images, rewrite their references
//! 3. [`markdown`]    — render markdown to flat HTML (and back, for downloads)
//! 4. [`blocks`]      — turn top-level HTML nodes into block-editor blocks
//! 5. [`taxonomy`]    — resolve category and tag names to ids
//!
//! [`markup`] reads serialised blocks back, for previews and checks.

pub mod blocks;
pub mod frontmatter;
pub mod markdown;
pub mod markup;
pub mod media;
pub mod taxonomy;
