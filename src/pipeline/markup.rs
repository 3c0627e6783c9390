//! Reading serialised block markup back into its parts.
//!
//! The inverse of [`super::blocks::Block::to_markup`] at the delimiter level:
//! each `<!-- wp:name {attrs} -->` … `<!-- /wp:name -->` pair becomes a
//! [`ParsedBlock`] holding the name, the decoded attribute object and the
//! untouched inner markup. Re-serialising a parsed block reproduces the same
//! delimiters byte for byte. Text between blocks is ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

static RE_OPENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<!-- wp:([a-z][a-z0-9_/-]*)(?: (\{.*?\}))? (/)?-->").unwrap()
});

/// One delimited block as found in serialised markup.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
    pub name: String,
    pub attrs: Option<Value>,
    pub inner: String,
    /// `<!-- wp:name /-->` form with no inner markup.
    pub self_closing: bool,
}

impl ParsedBlock {
    /// Serialise back to delimited markup.
    pub fn to_markup(&self) -> String {
        let attrs = self
            .attrs
            .as_ref()
            .map(|a| format!(" {a}"))
            .unwrap_or_default();
        if self.self_closing {
            format!("<!-- wp:{}{attrs} /-->", self.name)
        } else {
            format!(
                "<!-- wp:{name}{attrs} -->\n{}\n<!-- /wp:{name} -->",
                self.inner,
                name = self.name
            )
        }
    }
}

/// Split serialised block markup into its top-level blocks.
///
/// An opener without a matching closer ends the scan.
pub fn parse_block_markup(markup: &str) -> Vec<ParsedBlock> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(caps) = RE_OPENER.captures_at(markup, pos) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let name = name.as_str().to_string();
        let attrs = caps.get(2).and_then(|m| match serde_json::from_str(m.as_str()) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!("Ignoring unparseable attributes on wp:{}: {}", name, e);
                None
            }
        });

        if caps.get(3).is_some() {
            blocks.push(ParsedBlock {
                name,
                attrs,
                inner: String::new(),
                self_closing: true,
            });
            pos = whole.end();
            continue;
        }

        let closer = format!("<!-- /wp:{name} -->");
        let Some(rel) = markup[whole.end()..].find(&closer) else {
            debug!("Unterminated wp:{} block at byte {}", name, whole.start());
            break;
        };
        let inner = &markup[whole.end()..whole.end() + rel];
        let inner = inner.strip_prefix('\n').unwrap_or(inner);
        let inner = inner.strip_suffix('\n').unwrap_or(inner);

        blocks.push(ParsedBlock {
            name,
            attrs,
            inner: inner.to_string(),
            self_closing: false,
        });
        pos = whole.end() + rel + closer.len();
    }

    blocks
}

/// Number of blocks per block name.
pub fn block_counts(blocks: &[ParsedBlock]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for b in blocks {
        *counts.entry(b.name.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::blocks::{convert_html, Block, BLOCK_SEPARATOR};

    const MIXED: &str = concat!(
        "<h2>Intro</h2><p>Hello <strong>world</strong></p>",
        "<p><img src=\"a.png\" alt=\"a\"></p>",
        "<ol><li>one</li><li>two</li></ol>",
        "<blockquote><p>q</p></blockquote>",
        "<table><tr><td>1</td></tr></table>",
        "<pre><code>let x = 1;\nlet y = x &lt; 2;</code></pre>",
        "<iframe src=\"https://player.vimeo.com/video/1\"></iframe>",
        "<video src=\"clip.mp4\"></video>",
        "<a href=\"https://youtu.be/xyz\">watch</a>",
        "<div>raw</div>"
    );

    #[test]
    fn reserialising_converted_output_is_identical() {
        let converted = convert_html(MIXED);
        let parsed = parse_block_markup(&converted);
        assert_eq!(parsed.len(), 11);

        let again = parsed
            .iter()
            .map(ParsedBlock::to_markup)
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR);
        assert_eq!(again, converted);
    }

    #[test]
    fn delimiters_match_per_kind() {
        let samples = vec![
            Block::Paragraph { html: "p".into() },
            Block::Heading { level: 4, html: "h".into() },
            Block::List { ordered: false, html: "<li>x</li>".into() },
            Block::Quote { html: "q".into() },
            Block::Table { html: "<tr></tr>".into() },
            Block::Code { text: "c".into() },
            Block::Image { html: "<img src=\"i.png\">".into() },
            Block::Video { src: "v.mp4".into() },
            Block::Embed { url: "https://youtu.be/1".into() },
            Block::Html { html: "<hr>".into() },
        ];
        for block in samples {
            let markup = block.to_markup();
            let parsed = parse_block_markup(&markup);
            assert_eq!(parsed.len(), 1, "{markup}");
            assert_eq!(parsed[0].name, block.name());
            assert_eq!(parsed[0].attrs, block.attrs());
            assert_eq!(parsed[0].to_markup(), markup);
        }
    }

    #[test]
    fn self_closing_blocks() {
        let parsed = parse_block_markup("<!-- wp:separator /-->\n\n<!-- wp:spacer {\"height\":\"20px\"} /-->");
        assert_eq!(parsed.len(), 2);
        assert!(parsed.iter().all(|b| b.self_closing));
        assert_eq!(parsed[1].to_markup(), "<!-- wp:spacer {\"height\":\"20px\"} /-->");
    }

    #[test]
    fn unterminated_block_stops_scan() {
        let parsed = parse_block_markup(
            "<!-- wp:paragraph -->\n<p>a</p>\n<!-- /wp:paragraph -->\n\n<!-- wp:quote -->\nno end",
        );
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].inner, "<p>a</p>");
    }

    #[test]
    fn counts_by_name() {
        let converted = convert_html(MIXED);
        let counts = block_counts(&parse_block_markup(&converted));
        assert_eq!(counts.get("paragraph"), Some(&1));
        assert_eq!(counts.get("embed"), Some(&2));
        assert_eq!(counts.get("html"), Some(&1));
        assert_eq!(counts.values().sum::<usize>(), 11);
    }
}
