//! Markdown ↔ HTML bridge.
//!
//! Both directions are delegated to libraries: `pulldown-cmark` renders the
//! vault's markdown (CommonMark, fenced code, GFM tables) to the flat HTML the
//! block converter expects, and `htmd` turns rendered post HTML back into
//! markdown for downloads. Neither direction promises a lossless round trip.

use crate::error::SyncError;
use htmd::options::{HeadingStyle, Options as HtmdOptions};
use htmd::HtmlToMarkdown;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

/// Maximum length (in characters) of a derived SEO description.
pub const SEO_DESCRIPTION_CHARS: usize = 150;

static RE_SEO_STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[#*`\[\]!]").unwrap());

/// Render markdown to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Convert rendered post HTML to markdown with ATX (`#`) headings.
pub fn html_to_markdown(html: &str) -> Result<String, SyncError> {
    let converter = HtmlToMarkdown::builder()
        .options(HtmdOptions {
            heading_style: HeadingStyle::Atx,
            ..Default::default()
        })
        .skip_tags(vec!["script", "style"])
        .build();
    converter
        .convert(html)
        .map_err(|e| SyncError::Internal(format!("HTML to markdown conversion failed: {e}")))
}

/// SEO description fallback: the body with markdown punctuation
/// (`# * ` [ ] !`) removed, cut to [`SEO_DESCRIPTION_CHARS`] characters and
/// trimmed.
pub fn seo_description(body: &str) -> String {
    let stripped = RE_SEO_STRIP.replace_all(body, "");
    stripped
        .chars()
        .take(SEO_DESCRIPTION_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Extract the text content of an HTML snippet, decoding entities.
///
/// WordPress returns titles as rendered HTML (`Rock &#8216;n&#8217; Roll`).
pub fn html_text(snippet: &str) -> String {
    scraper::Html::parse_fragment(snippet)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fenced_code_and_tables() {
        let html = markdown_to_html("```rust\nlet x = 1;\n```\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<pre><code class=\"language-rust\">let x = 1;\n</code></pre>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn standalone_image_is_wrapped_in_paragraph() {
        let html = markdown_to_html("![alt](https://cdn.example.com/a.png)\n");
        assert!(html.starts_with("<p><img src=\"https://cdn.example.com/a.png\""), "got: {html}");
    }

    #[test]
    fn html_to_markdown_uses_atx_headings() {
        let md = html_to_markdown("<h2>Section</h2><p>Some <strong>bold</strong> text.</p>").unwrap();
        assert!(md.contains("## Section"), "got: {md}");
        assert!(md.contains("**bold**"), "got: {md}");
    }

    #[test]
    fn seo_description_strips_and_truncates() {
        assert_eq!(seo_description("# Title\n\n**Bold** `code` [link]!"), "Title\n\nBold code link");
        let long = "a".repeat(400);
        assert_eq!(seo_description(&long).chars().count(), SEO_DESCRIPTION_CHARS);
    }

    #[test]
    fn seo_description_counts_characters_not_bytes() {
        let cjk = "漢".repeat(200);
        assert_eq!(seo_description(&cjk).chars().count(), SEO_DESCRIPTION_CHARS);
    }

    #[test]
    fn html_text_decodes_entities() {
        assert_eq!(html_text("Rock &#8216;n&#8217; Roll &amp; more"), "Rock \u{2018}n\u{2019} Roll & more");
    }
}
