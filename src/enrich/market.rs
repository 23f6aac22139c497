//! Stock quotes for listed businesses, scraped from a public quote page.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::games::MarketQuote;
use crate::util::is_blank_value;

#[async_trait]
pub trait MarketData: Send + Sync {
    async fn quote(&self, ticker: &str) -> Result<Option<MarketQuote>>;
}

/// Reduce a model-written ticker ("NASDAQ: AAPL", "aapl, AAPL.L") to one
/// symbol safe to put in a URL.
pub fn normalize_ticker(raw: &str) -> Option<String> {
    if is_blank_value(raw) {
        return None;
    }
    let first = raw.split([',', ';', '/', ' ']).find(|s| !s.is_empty() && !s.ends_with(':'))?;
    let symbol = first.rsplit(':').next()?.trim().to_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= 12
        && symbol.chars().any(|c| c.is_ascii_alphanumeric())
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    valid.then_some(symbol)
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim_end_matches('%')
        .trim_start_matches('+')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse().ok()
}

/// Value of a quote field from `<fin-streamer data-field=...>` markup, falling
/// back to the page's embedded JSON.
fn field_value(html: &str, field: &str) -> Result<Option<f64>> {
    let attr_re = Regex::new(&format!(
        r#"(?is)<fin-streamer[^>]*data-field="{}"[^>]*\bvalue="([^"]+)""#,
        field
    ))?;
    let text_re = Regex::new(&format!(
        r#"(?is)<[a-z-]+[^>]*data-field="{}"[^>]*>\s*(?:<span[^>]*>)?\s*([-+(]?[0-9][0-9.,]*%?\)?)"#,
        field
    ))?;
    let json_re = Regex::new(&format!(
        r#""{}"\s*:\s*(?:\{{\s*"raw"\s*:\s*)?(-?[0-9][0-9.eE+-]*)"#,
        field
    ))?;

    for re in [&attr_re, &text_re, &json_re] {
        if let Some(value) = re
            .captures(html)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_number(m.as_str()))
        {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Extract a quote from a page; `None` when no price is present.
pub fn parse_quote(html: &str, ticker: &str, source_url: &str) -> Result<Option<MarketQuote>> {
    let Some(price) = field_value(html, "regularMarketPrice")? else {
        return Ok(None);
    };
    let currency_re = Regex::new(r#""currency"\s*:\s*"([A-Za-z]{3})""#)?;

    Ok(Some(MarketQuote {
        ticker: ticker.to_string(),
        price: Some(price),
        change: field_value(html, "regularMarketChange")?,
        change_percent: field_value(html, "regularMarketChangePercent")?,
        currency: currency_re
            .captures(html)
            .map(|c| c[1].to_uppercase()),
        source_url: source_url.to_string(),
    }))
}

pub struct QuotePageScraper {
    client: Client,
    url_template: String,
}

impl QuotePageScraper {
    /// `url_template` must contain `{ticker}`.
    pub fn new(url_template: String, timeout_secs: u64, user_agent: &str) -> Result<Self> {
        if !url_template.contains("{ticker}") {
            bail!("quote URL must contain {{ticker}}: {}", url_template);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            url_template,
        })
    }
}

#[async_trait]
impl MarketData for QuotePageScraper {
    async fn quote(&self, ticker: &str) -> Result<Option<MarketQuote>> {
        let Some(symbol) = normalize_ticker(ticker) else {
            return Ok(None);
        };
        let url = self.url_template.replace("{ticker}", &symbol);
        debug!("Fetching quote page {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", url))?;
        if !response.status().is_success() {
            bail!("quote page {} returned {}", url, response.status());
        }
        let html = response.text().await.context("failed to read quote page")?;
        parse_quote(&html, &symbol, &url)
    }
}
