//! Full-page screenshot capture for the vision tier.

use anyhow::{Context, Result};
use async_trait::async_trait;
use browserless_client::BrowserlessClient;
use regex::Regex;
use tracing::{info, warn};

/// Link text / href fragments that usually lead to the menu page. Checked
/// in document order; the first matching same-site anchor wins.
pub const MENU_LINK_VOCABULARY: &[&str] = &["dagens-lunch", "dagens", "lunch", "meny", "menu", "mat"];

#[async_trait]
pub trait ScreenshotCapture: Send + Sync {
    async fn capture(&self, url: &str) -> Result<Vec<u8>>;
}

/// Capture backed by a Browserless instance. Before shooting, it loads the
/// page once and follows an in-page menu link if one exists — menus are
/// often a click away from the landing page, and the screenshot has to
/// show the right one.
pub struct BrowserlessCapture {
    client: BrowserlessClient,
}

impl BrowserlessCapture {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self {
            client: BrowserlessClient::new(base_url, token),
        }
    }
}

#[async_trait]
impl ScreenshotCapture for BrowserlessCapture {
    async fn capture(&self, url: &str) -> Result<Vec<u8>> {
        let target = match self.client.content(url).await {
            Ok(html) => find_menu_link(&html, url).unwrap_or_else(|| url.to_string()),
            Err(e) => {
                warn!(url, error = %e, "Could not inspect page for menu links");
                url.to_string()
            }
        };
        if target != url {
            info!(url, target = %target, "Following menu link before capture");
        }

        let png = self
            .client
            .screenshot(&target)
            .await
            .with_context(|| format!("Screenshot capture failed for {target}"))?;
        anyhow::ensure!(!png.is_empty(), "Empty screenshot for {target}");
        Ok(png)
    }
}

/// Scan anchors for a same-site link whose href or text matches the menu
/// vocabulary. Relative hrefs are resolved against `base_url`.
pub fn find_menu_link(html: &str, base_url: &str) -> Option<String> {
    let anchor = Regex::new(r#"(?is)<a[^>]*href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a>"#)
        .expect("valid regex");
    let base = url::Url::parse(base_url).ok()?;

    for cap in anchor.captures_iter(html) {
        let href = &cap[1];
        let href_lower = href.to_lowercase();
        let text = cap[2].to_lowercase();

        if href_lower.starts_with("mailto:")
            || href_lower.starts_with("javascript:")
            || href.starts_with('#')
        {
            continue;
        }
        if !MENU_LINK_VOCABULARY
            .iter()
            .any(|word| href_lower.contains(word) || text.contains(word))
        {
            continue;
        }

        let resolved = match base.join(href) {
            Ok(resolved) => resolved,
            Err(_) => continue,
        };
        if resolved.host_str() == base.host_str() {
            return Some(resolved.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_relative_menu_link() {
        let html = r#"<nav><a href="/om-oss">Om oss</a><a href="/dagens-lunch">Lunch</a></nav>"#;
        assert_eq!(
            find_menu_link(html, "https://krogen.se/"),
            Some("https://krogen.se/dagens-lunch".to_string())
        );
    }

    #[test]
    fn matches_on_anchor_text() {
        let html = r#"<a href="/sida-42">Veckans meny</a>"#;
        assert_eq!(
            find_menu_link(html, "https://krogen.se/"),
            Some("https://krogen.se/sida-42".to_string())
        );
    }

    #[test]
    fn skips_offsite_and_junk_links() {
        let html = r##"
            <a href="https://facebook.com/krogen/meny">Meny på Facebook</a>
            <a href="mailto:info@krogen.se">lunch bokning</a>
            <a href="#lunch">Hoppa till lunch</a>
        "##;
        assert_eq!(find_menu_link(html, "https://krogen.se/"), None);
    }

    #[test]
    fn no_link_when_nothing_matches() {
        let html = r#"<a href="/kontakt">Kontakt</a>"#;
        assert_eq!(find_menu_link(html, "https://krogen.se/"), None);
    }
}
