//! Front-matter header: split, parse and render.
//!
//! A vault document looks like
//!
//! ```text
//! ---
//! wp_id: 42
//! title: "Hello"
//! categories: [Notes]
//! ---
//!
//! Body in markdown…
//! ```
//!
//! The header is deserialised into the typed [`FrontMatter`] rather than an
//! open map so a misspelled or mistyped key fails loudly. Keys this crate does
//! not know are kept in [`FrontMatter::extra`] and written back unchanged.

use crate::config::PostStatus;
use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Marker that opens and closes the header.
pub const DELIMITER: &str = "---";

/// Typed front-matter header.
///
/// Every field is optional; the publish pipeline documents the fallback used
/// for each one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Remote post id. Present ⇒ update, absent ⇒ create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wp_id: Option<u64>,

    /// Post title. Fallback: the file stem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Publication date as reported by WordPress (informational).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// URL slug. Fallback: the slugified title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Post status. Fallback: `draft` on create, `publish` on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,

    /// SEO description. Fallback: derived from the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Category names.
    #[serde(default, skip_serializing_if = "TermNames::is_empty")]
    pub categories: TermNames,

    /// Tag names.
    #[serde(default, skip_serializing_if = "TermNames::is_empty")]
    pub tags: TermNames,

    /// Keys not listed above, preserved as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Category or tag names: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermNames {
    One(String),
    Many(Vec<String>),
}

impl Default for TermNames {
    fn default() -> Self {
        TermNames::Many(Vec::new())
    }
}

impl TermNames {
    pub fn is_empty(&self) -> bool {
        match self {
            TermNames::One(_) => false,
            TermNames::Many(v) => v.is_empty(),
        }
    }

    /// The names as a flat list, in header order.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            TermNames::One(s) => vec![s.clone()],
            TermNames::Many(v) => v.clone(),
        }
    }
}

/// Split `text` into the raw header and the body.
///
/// Only text that starts with [`DELIMITER`] has a header. The text is split on
/// the delimiter into at most three parts; with fewer than three there is no
/// header and the text comes back unchanged.
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    if !text.starts_with(DELIMITER) {
        return (None, text);
    }
    let mut parts = text.splitn(3, DELIMITER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(header), Some(body)) => (Some(header), body.trim_start()),
        _ => (None, text),
    }
}

/// Parse the header of `text` into a [`FrontMatter`] and return it with the body.
///
/// `source` is only used for error messages. An empty header yields the
/// defaults; malformed YAML is an error.
pub fn parse_front_matter(text: &str, source: &Path) -> Result<(FrontMatter, String), SyncError> {
    let (header, body) = split_front_matter(text);
    let Some(header) = header else {
        return Ok((FrontMatter::default(), body.to_string()));
    };

    let to_error = |e: serde_yaml::Error| SyncError::FrontMatter {
        path: source.to_path_buf(),
        detail: e.to_string(),
    };

    let value: serde_yaml::Value = serde_yaml::from_str(header).map_err(to_error)?;
    let front_matter = if value.is_null() {
        FrontMatter::default()
    } else {
        serde_yaml::from_value(value).map_err(to_error)?
    };

    Ok((front_matter, body.to_string()))
}

/// Render a full document: header, blank line, body.
pub fn render_document(front_matter: &FrontMatter, body: &str) -> Result<String, SyncError> {
    let yaml = serde_yaml::to_string(front_matter)
        .map_err(|e| SyncError::Internal(format!("front matter serialisation: {e}")))?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n\n{body}"))
}
