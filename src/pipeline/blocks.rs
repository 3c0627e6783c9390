//! Block conversion: flat HTML → block-editor markup.
//!
//! The HTML produced by [`super::markdown::markdown_to_html`] is parsed as a
//! fragment and only its *top-level* siblings are looked at. Each sibling is
//! classified into a [`NodeKind`] and turned into exactly one [`Block`]; the
//! children of an element are carried over as already-serialised inner markup
//! and never re-interpreted, except for the two cases that need to look
//! inside: a paragraph holding an image, and a `<pre>` holding a `<code>`.
//!
//! ```text
//! <h2>Intro</h2>            <!-- wp:heading {"level":2} -->
//! <p>Hello</p>       ──▶    <h2 class="wp-block-heading">Intro</h2>
//! <p><img …></p>            <!-- /wp:heading -->
//!                           …
//! ```
//!
//! Anything the classifier does not know becomes a raw `html` block, so no
//! node is ever dropped except whitespace-only text. There is no
//! sanitisation: raw blocks keep whatever attributes the source had.
//!
//! html5ever never fails on bad input, it recovers. Malformed markup therefore
//! degrades to fewer (or different) blocks instead of an error.

use crate::config::{SyncConfig, DEFAULT_VIDEO_PATTERNS};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::{json, Value};
use std::fmt;
use tracing::debug;

static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static CODE: Lazy<Selector> = Lazy::new(|| Selector::parse("code").unwrap());
static SOURCE: Lazy<Selector> = Lazy::new(|| Selector::parse("source[src]").unwrap());

/// Separator between serialised blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// One block-editor block.
///
/// `html` fields hold markup that is emitted verbatim; `text`, `url` and
/// `src` hold plain text and are escaped on serialisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph { html: String },
    Heading { level: u8, html: String },
    List { ordered: bool, html: String },
    Quote { html: String },
    Table { html: String },
    Code { text: String },
    /// Serialised `<img>` element.
    Image { html: String },
    Video { src: String },
    Embed { url: String },
    /// Raw HTML fallback.
    Html { html: String },
}

impl Block {
    /// Block name as used in the `wp:` comment delimiters.
    pub fn name(&self) -> &'static str {
        match self {
            Block::Paragraph { .. } => "paragraph",
            Block::Heading { .. } => "heading",
            Block::List { .. } => "list",
            Block::Quote { .. } => "quote",
            Block::Table { .. } => "table",
            Block::Code { .. } => "code",
            Block::Image { .. } => "image",
            Block::Video { .. } => "video",
            Block::Embed { .. } => "embed",
            Block::Html { .. } => "html",
        }
    }

    /// Attribute object written into the opening delimiter, if any.
    pub fn attrs(&self) -> Option<Value> {
        match self {
            Block::Heading { level, .. } => Some(json!({ "level": level })),
            Block::List { ordered, .. } => Some(json!({ "ordered": ordered })),
            Block::Image { .. } => Some(json!({ "sizeSlug": "full" })),
            Block::Embed { url } => Some(json!({ "url": url })),
            _ => None,
        }
    }

    fn body(&self) -> String {
        match self {
            Block::Paragraph { html } => format!("<p>{html}</p>"),
            Block::Heading { level, html } => {
                format!("<h{level} class=\"wp-block-heading\">{html}</h{level}>")
            }
            Block::List { ordered, html } => {
                let tag = if *ordered { "ol" } else { "ul" };
                format!("<{tag} class=\"wp-block-list\">{html}</{tag}>")
            }
            Block::Quote { html } => {
                format!("<blockquote class=\"wp-block-quote\">{html}</blockquote>")
            }
            Block::Table { html } => {
                format!("<figure class=\"wp-block-table\"><table>{html}</table></figure>")
            }
            Block::Code { text } => format!(
                "<pre class=\"wp-block-code\"><code>{}</code></pre>",
                escape_html(text)
            ),
            Block::Image { html } => {
                format!("<figure class=\"wp-block-image size-full\">{html}</figure>")
            }
            Block::Video { src } => format!(
                "<figure class=\"wp-block-video\"><video src=\"{}\" controls></video></figure>",
                escape_html(src)
            ),
            Block::Embed { url } => format!(
                "<figure class=\"wp-block-embed\"><div class=\"wp-block-embed__wrapper\">\n{}\n</div></figure>",
                escape_html(url)
            ),
            Block::Html { html } => html.clone(),
        }
    }

    /// Serialise with `<!-- wp:name {attrs} -->` … `<!-- /wp:name -->`.
    pub fn to_markup(&self) -> String {
        let name = self.name();
        let open = match self.attrs() {
            Some(attrs) => format!("<!-- wp:{name} {attrs} -->"),
            None => format!("<!-- wp:{name} -->"),
        };
        format!("{open}\n{}\n<!-- /wp:{name} -->", self.body())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

/// Classification of one top-level node.
#[derive(Debug)]
enum NodeKind<'a> {
    Text(&'a str),
    Comment(&'a str),
    Paragraph(ElementRef<'a>),
    Heading(u8, ElementRef<'a>),
    List(bool, ElementRef<'a>),
    Quote(ElementRef<'a>),
    Table(ElementRef<'a>),
    Preformatted(ElementRef<'a>),
    InlineFrame(ElementRef<'a>),
    Video(ElementRef<'a>),
    Anchor(ElementRef<'a>),
    Other(ElementRef<'a>),
}

impl<'a> NodeKind<'a> {
    fn from_element(el: ElementRef<'a>) -> Self {
        match el.value().name() {
            "p" => NodeKind::Paragraph(el),
            name @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
                NodeKind::Heading(name.as_bytes()[1] - b'0', el)
            }
            "ul" => NodeKind::List(false, el),
            "ol" => NodeKind::List(true, el),
            "blockquote" => NodeKind::Quote(el),
            "table" => NodeKind::Table(el),
            "pre" => NodeKind::Preformatted(el),
            "iframe" => NodeKind::InlineFrame(el),
            "video" => NodeKind::Video(el),
            "a" => NodeKind::Anchor(el),
            _ => NodeKind::Other(el),
        }
    }
}

/// Converts HTML fragments into blocks.
#[derive(Debug, Clone)]
pub struct BlockConverter {
    video_patterns: Vec<String>,
}

impl Default for BlockConverter {
    fn default() -> Self {
        Self::new(DEFAULT_VIDEO_PATTERNS.iter().map(|s| s.to_string()).collect())
    }
}

impl BlockConverter {
    pub fn new(video_patterns: Vec<String>) -> Self {
        Self { video_patterns }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.video_patterns.clone())
    }

    /// Whether `url` contains one of the configured video patterns.
    pub fn is_video_url(&self, url: &str) -> bool {
        is_video_url(url, &self.video_patterns)
    }

    /// Convert an HTML fragment into its flat block sequence.
    pub fn to_blocks(&self, html: &str) -> Vec<Block> {
        let fragment = Html::parse_fragment(html);
        let blocks: Vec<Block> = top_level_kinds(&fragment)
            .into_iter()
            .map(|kind| self.block_for(kind))
            .collect();
        debug!("Converted HTML fragment into {} blocks", blocks.len());
        blocks
    }

    /// Convert an HTML fragment into serialised block markup.
    pub fn convert(&self, html: &str) -> String {
        join_blocks(&self.to_blocks(html))
    }

    fn block_for(&self, kind: NodeKind<'_>) -> Block {
        match kind {
            NodeKind::Text(text) => Block::Paragraph {
                html: escape_html(text),
            },
            NodeKind::Comment(comment) => Block::Html {
                html: format!("<!--{comment}-->"),
            },
            // An image anywhere inside the paragraph wins over its text.
            NodeKind::Paragraph(el) => match el.select(&IMG).next() {
                Some(img) => Block::Image { html: img.html() },
                None => Block::Paragraph {
                    html: el.inner_html(),
                },
            },
            NodeKind::Heading(level, el) => Block::Heading {
                level,
                html: el.inner_html(),
            },
            NodeKind::List(ordered, el) => Block::List {
                ordered,
                html: el.inner_html(),
            },
            NodeKind::Quote(el) => Block::Quote {
                html: el.inner_html(),
            },
            NodeKind::Table(el) => Block::Table {
                html: el.inner_html(),
            },
            NodeKind::Preformatted(el) => {
                let text = match el.select(&CODE).next() {
                    Some(code) => code.text().collect(),
                    None => el.text().collect(),
                };
                Block::Code { text }
            }
            NodeKind::InlineFrame(el) => {
                let src = el.value().attr("src").unwrap_or_default();
                if self.is_video_url(src) {
                    Block::Embed {
                        url: src.to_string(),
                    }
                } else {
                    Block::Html { html: el.html() }
                }
            }
            NodeKind::Video(el) => {
                let src = el
                    .value()
                    .attr("src")
                    .or_else(|| {
                        el.select(&SOURCE)
                            .next()
                            .and_then(|s| s.value().attr("src"))
                    })
                    .unwrap_or_default();
                Block::Video {
                    src: src.to_string(),
                }
            }
            NodeKind::Anchor(el) => {
                let href = el.value().attr("href").unwrap_or_default();
                if self.is_video_url(href) {
                    Block::Embed {
                        url: href.to_string(),
                    }
                } else {
                    Block::Paragraph { html: el.html() }
                }
            }
            NodeKind::Other(el) => Block::Html { html: el.html() },
        }
    }
}

/// Convert an HTML fragment with the default video patterns.
pub fn convert_html(html: &str) -> String {
    BlockConverter::default().convert(html)
}

/// Serialise blocks in order, separated by a blank line.
pub fn join_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(Block::to_markup)
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Case-sensitive substring test against `patterns`.
pub fn is_video_url<S: AsRef<str>>(url: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|p| url.contains(p.as_ref()))
}

/// Top-level siblings of the fragment, in document order, with
/// whitespace-only text removed.
fn top_level_kinds(fragment: &Html) -> Vec<NodeKind<'_>> {
    fragment
        .root_element()
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then_some(NodeKind::Text(trimmed))
            }
            Node::Comment(comment) => Some(NodeKind::Comment(&comment.comment)),
            Node::Element(_) => ElementRef::wrap(child).map(NodeKind::from_element),
            _ => None,
        })
        .collect()
}

/// Escape text for use in element content or a double-quoted attribute.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(html: &str) -> Vec<Block> {
        BlockConverter::default().to_blocks(html)
    }

    #[test]
    fn paragraph_with_image_becomes_image_block() {
        let out = convert_html(r#"<p><img src="a.png"></p>"#);
        assert_eq!(
            out,
            "<!-- wp:image {\"sizeSlug\":\"full\"} -->\n\
             <figure class=\"wp-block-image size-full\"><img src=\"a.png\"></figure>\n\
             <!-- /wp:image -->"
        );
    }

    #[test]
    fn image_wins_over_sibling_text() {
        let b = blocks(r#"<p>Look at this: <img src="b.png" alt="b"> nice, right?</p>"#);
        assert_eq!(b.len(), 1);
        match &b[0] {
            Block::Image { html } => {
                assert!(html.starts_with("<img "), "got: {html}");
                assert!(html.contains(r#"src="b.png""#));
                assert!(html.contains(r#"alt="b""#));
            }
            other => panic!("expected image block, got {other:?}"),
        }
    }

    #[test]
    fn pre_code_extracts_code_text_only() {
        let b = blocks("<pre><code>x=1</code></pre>");
        assert_eq!(b, vec![Block::Code { text: "x=1".into() }]);

        let b = blocks("<pre>outer<code>y=2</code>tail</pre>");
        assert_eq!(b, vec![Block::Code { text: "y=2".into() }]);
    }

    #[test]
    fn pre_without_code_uses_own_text() {
        let b = blocks("<pre>plain <b>text</b></pre>");
        assert_eq!(b, vec![Block::Code { text: "plain text".into() }]);
    }

    #[test]
    fn code_text_is_escaped_on_output() {
        let out = convert_html("<pre><code>a &lt; b &amp;&amp; c</code></pre>");
        assert!(out.contains("<code>a &lt; b &amp;&amp; c</code>"), "got: {out}");
    }

    #[test]
    fn video_anchor_becomes_embed() {
        let out = convert_html(r#"<a href="https://youtu.be/xyz">watch</a>"#);
        assert_eq!(
            out,
            "<!-- wp:embed {\"url\":\"https://youtu.be/xyz\"} -->\n\
             <figure class=\"wp-block-embed\"><div class=\"wp-block-embed__wrapper\">\n\
             https://youtu.be/xyz\n\
             </div></figure>\n\
             <!-- /wp:embed -->"
        );
    }

    #[test]
    fn plain_anchor_becomes_paragraph() {
        let b = blocks(r#"<a href="https://example.com">site</a>"#);
        assert_eq!(
            b,
            vec![Block::Paragraph {
                html: r#"<a href="https://example.com">site</a>"#.into()
            }]
        );
    }

    #[test]
    fn iframe_video_and_non_video() {
        let b = blocks(r#"<iframe src="https://www.youtube.com/embed/abc"></iframe>"#);
        assert_eq!(
            b,
            vec![Block::Embed {
                url: "https://www.youtube.com/embed/abc".into()
            }]
        );

        let b = blocks(r#"<iframe src="https://maps.example.com/embed"></iframe>"#);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].name(), "html");
        match &b[0] {
            Block::Html { html } => assert!(html.starts_with("<iframe")),
            other => panic!("expected html block, got {other:?}"),
        }
    }

    #[test]
    fn video_detection_is_substring_and_case_sensitive() {
        let c = BlockConverter::default();
        for url in [
            "https://www.youtube.com/watch?v=1",
            "https://vimeo.com/123",
            "https://cdn.example.com/clip.mp4",
            "https://cdn.example.com/clip.webm?x=1",
            "https://cdn.example.com/clip.ogg",
        ] {
            assert!(c.is_video_url(url), "{url} should be a video");
        }
        assert!(!c.is_video_url("https://WWW.YOUTUBE.COM/watch"));
        assert!(!c.is_video_url("https://example.com/page"));
        assert!(!c.is_video_url(""));
    }

    #[test]
    fn custom_video_patterns() {
        let c = BlockConverter::new(vec!["peertube.example".into()]);
        let b = c.to_blocks(r#"<a href="https://peertube.example/w/1">v</a>"#);
        assert_eq!(b[0].name(), "embed");
        let b = c.to_blocks(r#"<a href="https://youtu.be/1">v</a>"#);
        assert_eq!(b[0].name(), "paragraph");
    }

    #[test]
    fn video_element_uses_src_or_source_child() {
        let b = blocks(r#"<video src="clip.mp4"></video>"#);
        assert_eq!(b, vec![Block::Video { src: "clip.mp4".into() }]);

        let b = blocks(r#"<video controls><source src="alt.webm" type="video/webm"></video>"#);
        assert_eq!(b, vec![Block::Video { src: "alt.webm".into() }]);

        let out = convert_html(r#"<video src="clip.mp4"></video>"#);
        assert!(out.contains(r#"<video src="clip.mp4" controls></video>"#));
    }

    #[test]
    fn heading_levels_and_markup() {
        let out = convert_html("<h3>Title <em>x</em></h3>");
        assert_eq!(
            out,
            "<!-- wp:heading {\"level\":3} -->\n\
             <h3 class=\"wp-block-heading\">Title <em>x</em></h3>\n\
             <!-- /wp:heading -->"
        );
        for level in 1..=6u8 {
            let b = blocks(&format!("<h{level}>t</h{level}>"));
            assert_eq!(b, vec![Block::Heading { level, html: "t".into() }]);
        }
    }

    #[test]
    fn lists_carry_ordering() {
        let out = convert_html("<ol><li>one</li></ol>");
        assert_eq!(
            out,
            "<!-- wp:list {\"ordered\":true} -->\n\
             <ol class=\"wp-block-list\"><li>one</li></ol>\n\
             <!-- /wp:list -->"
        );
        let b = blocks("<ul><li>a</li><li>b</li></ul>");
        assert_eq!(
            b,
            vec![Block::List {
                ordered: false,
                html: "<li>a</li><li>b</li>".into()
            }]
        );
    }

    #[test]
    fn quote_and_table() {
        let b = blocks("<blockquote><p>wise</p></blockquote>");
        assert_eq!(b, vec![Block::Quote { html: "<p>wise</p>".into() }]);

        let out = convert_html("<table><tr><td>1</td></tr></table>");
        assert!(out.starts_with("<!-- wp:table -->\n<figure class=\"wp-block-table\"><table>"));
        assert!(out.contains("<td>1</td>"));
        assert!(out.ends_with("</table></figure>\n<!-- /wp:table -->"));
    }

    #[test]
    fn bare_text_becomes_paragraph_and_whitespace_is_dropped() {
        let b = blocks("  hello &amp; bye \n");
        assert_eq!(
            b,
            vec![Block::Paragraph {
                html: "hello &amp; bye".into()
            }]
        );
        assert!(blocks(" \n\t ").is_empty());
    }

    #[test]
    fn unknown_elements_and_comments_fall_back_to_html() {
        let b = blocks(r#"<div class="x" onclick="go()">d</div><!-- note -->"#);
        assert_eq!(
            b,
            vec![
                Block::Html {
                    html: r#"<div class="x" onclick="go()">d</div>"#.into()
                },
                Block::Html {
                    html: "<!-- note -->".into()
                },
            ]
        );
    }

    #[test]
    fn every_top_level_node_yields_one_block() {
        let html = "intro<p>a</p>\n<h2>b</h2>  <ul><li>x</li></ul><div>d</div><!-- c --><hr>";
        let b = blocks(html);
        let names: Vec<_> = b.iter().map(Block::name).collect();
        assert_eq!(
            names,
            vec!["paragraph", "paragraph", "heading", "list", "html", "html", "html"]
        );
    }

    #[test]
    fn blocks_are_joined_by_blank_line_in_order() {
        let out = convert_html("<p>one</p><p>two</p>");
        assert_eq!(
            out,
            "<!-- wp:paragraph -->\n<p>one</p>\n<!-- /wp:paragraph -->\n\n\
             <!-- wp:paragraph -->\n<p>two</p>\n<!-- /wp:paragraph -->"
        );
    }

    #[test]
    fn malformed_markup_does_not_panic() {
        assert_eq!(convert_html(""), "");
        let _ = convert_html("<<<>>></p></div><p <b>");
        let b = blocks("<p>unclosed <b>bold");
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].name(), "paragraph");
    }

    #[test]
    fn escape_html_covers_attribute_chars() {
        assert_eq!(escape_html(r#"a<b>"c"&d"#), "a&lt;b&gt;&quot;c&quot;&amp;d");
    }
}
