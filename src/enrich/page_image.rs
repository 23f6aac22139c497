//! Pick "the" picture of a subject out of its encyclopedia page.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::games::guess::Guess;
use crate::games::ScrapeHints;
use crate::util::absolutize_url;

#[async_trait]
pub trait PageImageSource: Send + Sync {
    /// Best image on `page_url`, or `None` when nothing qualifies.
    async fn find_image(&self, page_url: &str, hints: &ScrapeHints) -> Result<Option<String>>;
}

static INFOBOX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<table[^>]*\bclass\s*=\s*["'][^"']*\binfobox\b[^"']*["'][^>]*>(.*?)</table>"#)
        .expect("infobox regex")
});

static IMG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("img regex"));

static IMG_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\s(src|width|height)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#)
        .expect("attribute regex")
});

#[derive(Debug, Default)]
struct ImgAttrs {
    src: Option<String>,
    width: Option<String>,
    height: Option<String>,
}

impl ImgAttrs {
    fn parse(tag: &str) -> Self {
        let mut attrs = Self::default();
        for cap in IMG_ATTR.captures_iter(tag) {
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map(|m| m.as_str().replace("&amp;", "&"));
            let slot = match cap[1].to_ascii_lowercase().as_str() {
                "src" => &mut attrs.src,
                "width" => &mut attrs.width,
                _ => &mut attrs.height,
            };
            if slot.is_none() {
                *slot = value;
            }
        }
        attrs
    }
}

fn infobox_image(html: &str) -> Option<String> {
    let body = INFOBOX.captures(html)?.get(1)?.as_str();
    IMG_TAG
        .find_iter(body)
        .find_map(|tag| ImgAttrs::parse(tag.as_str()).src)
        .filter(|src| !src.is_empty())
}

/// Choose an image from `html`.
///
/// Encyclopedia pages use the first infobox image. Otherwise the first `<img>`
/// whose width and height both meet `hints.min_size` wins; tags with
/// non-numeric sizes are skipped outright; failing the size test, a `src`
/// containing one of `hints.keywords` is accepted.
pub fn pick_image(html: &str, page_url: &str, hints: &ScrapeHints) -> Option<String> {
    if page_url.contains("wikipedia.org") {
        if let Some(src) = infobox_image(html) {
            return Some(absolutize_url(&src, page_url));
        }
    }

    for tag in IMG_TAG.find_iter(html) {
        let attrs = ImgAttrs::parse(tag.as_str());
        let Some(src) = attrs.src.filter(|s| !s.is_empty()) else {
            continue;
        };

        if let (Some(width), Some(height)) = (&attrs.width, &attrs.height) {
            match (width.trim().parse::<u32>(), height.trim().parse::<u32>()) {
                (Ok(w), Ok(h)) => {
                    if w >= hints.min_size && h >= hints.min_size {
                        return Some(absolutize_url(&src, page_url));
                    }
                }
                _ => continue,
            }
        }

        let lowered = src.to_lowercase();
        if hints.keywords.iter().any(|k| lowered.contains(k)) {
            return Some(absolutize_url(&src, page_url));
        }
    }
    None
}

pub struct HttpPageImageScraper {
    client: Client,
}

impl HttpPageImageScraper {
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageImageSource for HttpPageImageScraper {
    async fn find_image(&self, page_url: &str, hints: &ScrapeHints) -> Result<Option<String>> {
        debug!("Scraping image from {}", page_url);
        let response = self
            .client
            .get(page_url)
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", page_url))?;

        if !response.status().is_success() {
            bail!("fetching {} returned {}", page_url, response.status());
        }

        let html = response.text().await.context("failed to read page body")?;
        Ok(pick_image(&html, page_url, hints))
    }
}

/// Where a scraped image lands on the guess.
pub(crate) fn store_scraped(guess: &mut Guess, url: String, beside_generated: bool) {
    if beside_generated {
        guess.wikipedia_image_url = Some(url);
    } else {
        guess.image_url = Some(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HINTS: ScrapeHints = ScrapeHints {
        min_size: 100,
        keywords: &["photo", "portrait", "jpg"],
    };

    #[test]
    fn test_infobox_wins_on_wikipedia() {
        let html = r#"
            <img src="/static/logo.png" width="300" height="300">
            <table class="infobox biography vcard"><tr><td>
              <img src="//upload.wikimedia.org/ada.jpg" width="220" height="280">
            </td></tr></table>"#;
        let url = pick_image(html, "https://en.wikipedia.org/wiki/Ada_Lovelace", &HINTS);
        assert_eq!(url.as_deref(), Some("https://upload.wikimedia.org/ada.jpg"));
    }

    #[test]
    fn test_infobox_ignored_elsewhere() {
        let html = r#"<img src="/a.png" width="300" height="300">
            <table class="infobox"><tr><td><img src="/b.jpg"></td></tr></table>"#;
        let url = pick_image(html, "https://example.com/page", &HINTS);
        assert_eq!(url.as_deref(), Some("https://example.com/a.png"));
    }

    #[test]
    fn test_size_threshold() {
        let html = r#"<img src="/icon.gif" width="20" height="20">
            <img src="/big.gif" width="120" height="150">"#;
        let url = pick_image(html, "https://example.com/x", &HINTS);
        assert_eq!(url.as_deref(), Some("https://example.com/big.gif"));
    }

    #[test]
    fn test_non_numeric_size_skips_tag() {
        let html = r#"<img src="/photo-a.png" width="auto" height="100">
            <img src="/photo-b.png">"#;
        let url = pick_image(html, "https://example.com/x", &HINTS);
        assert_eq!(url.as_deref(), Some("https://example.com/photo-b.png"));
    }

    #[test]
    fn test_small_image_falls_back_to_keyword() {
        let html = r#"<img src="/tiny-portrait.png" width="10" height="10">"#;
        let url = pick_image(html, "https://example.com/x", &HINTS);
        assert_eq!(url.as_deref(), Some("https://example.com/tiny-portrait.png"));
    }

    #[test]
    fn test_no_candidate() {
        let html = r#"<img src="/spacer.gif"><p>no pictures</p>"#;
        assert!(pick_image(html, "https://example.com/x", &HINTS).is_none());
    }

    #[test]
    fn test_attribute_quoting_and_entities() {
        let attrs = ImgAttrs::parse(r#"<img alt="x" SRC='/a.jpg?x=1&amp;y=2' width=200 height="200">"#);
        assert_eq!(attrs.src.as_deref(), Some("/a.jpg?x=1&y=2"));
        assert_eq!(attrs.width.as_deref(), Some("200"));
        assert_eq!(attrs.height.as_deref(), Some("200"));
    }

    #[test]
    fn test_data_src_is_not_src() {
        let attrs = ImgAttrs::parse(r#"<img data-src="/lazy.jpg" src="/real.jpg">"#);
        assert_eq!(attrs.src.as_deref(), Some("/real.jpg"));
    }
}
