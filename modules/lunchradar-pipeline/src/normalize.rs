//! Raw HTML to extraction-ready text.
//!
//! Readability-style main-content pruning is deliberately off: lunch menus
//! routinely live in sidebars, footers and nav-adjacent boxes that content
//! extractors throw away.

use ai_client::util::truncate_to_char_boundary;
use regex::Regex;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};

/// Size ceiling for normalized text, keeping AI prompt cost bounded.
pub const CONTENT_CEILING: usize = 8_000;

/// Normalize fetched HTML into plain text. Never fails; garbage input
/// degrades to garbage text, which downstream extraction handles.
pub fn normalize(raw_html: &str) -> String {
    let text = markdownify(raw_html);
    let text = if text.trim().is_empty() {
        strip_tags(raw_html)
    } else {
        text
    };
    let collapsed = collapse_whitespace(&text);
    truncate_to_char_boundary(&collapsed, CONTENT_CEILING).to_string()
}

fn markdownify(html: &str) -> String {
    let config = TransformConfig {
        readability: false,
        main_content: false,
        return_format: ReturnFormat::Markdown,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url: None,
        content: html.as_bytes(),
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };
    transform_content_input(input, &config)
}

/// Fallback stripper for markup the transformer chokes on.
fn strip_tags(html: &str) -> String {
    let script = Regex::new(r"(?is)<(script|style|noscript)[^>]*>.*?</(script|style|noscript)>")
        .expect("valid regex");
    let comment = Regex::new(r"(?s)<!--.*?-->").expect("valid regex");
    let tag = Regex::new(r"(?s)<[^>]*>").expect("valid regex");

    let text = script.replace_all(html, "\n");
    let text = comment.replace_all(&text, "");
    let text = tag.replace_all(&text, " ");
    decode_entities(&text)
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&aring;", "å")
        .replace("&auml;", "ä")
        .replace("&ouml;", "ö")
        .replace("&Aring;", "Å")
        .replace("&Auml;", "Ä")
        .replace("&Ouml;", "Ö")
}

/// Collapse runs of spaces within lines and runs of blank lines, keeping
/// line structure — the pattern extractor is line-oriented.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let collapsed: Vec<&str> = line.split_whitespace().collect();
        if collapsed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&collapsed.join(" "));
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_removes_scripts_and_markup() {
        let html = r#"<html><head><script>var x = "Pasta 99 kr";</script>
            <style>.menu { color: red; }</style></head>
            <body><h1>Dagens lunch</h1><p>K&ouml;ttbullar 109 kr</p></body></html>"#;
        let text = strip_tags(html);
        assert!(text.contains("Dagens lunch"));
        assert!(text.contains("Köttbullar 109 kr"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn collapse_preserves_line_structure() {
        let text = "Måndag:   Lax\n\n\n\nTisdag:\tKyckling";
        assert_eq!(collapse_whitespace(text), "Måndag: Lax\n\nTisdag: Kyckling");
    }

    #[test]
    fn normalize_enforces_ceiling() {
        let huge = "Köttbullar 109 kr\n".repeat(2_000);
        let out = normalize(&huge);
        assert!(out.len() <= CONTENT_CEILING);
        assert!(out.starts_with("Köttbullar"));
    }

    #[test]
    fn normalize_never_panics_on_garbage() {
        for junk in ["", "<<<>>>", "<div", "\u{0}\u{1}", "]]>"] {
            let _ = normalize(junk);
        }
    }
}
