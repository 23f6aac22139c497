//! Best-effort extras attached to a guess: pictures, map pins, stock quotes.
//!
//! Every lookup fails soft. An error is logged and the field stays empty.

pub mod geocode;
pub mod imagegen;
pub mod market;
pub mod page_image;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::games::prompts::illustration_prompt;
use crate::games::{GameKind, Guess, Location, MarketQuote, PlaceFields, ScrapeHints};
use crate::util::is_geocodable;

use geocode::{Geocoder, GoogleGeocoder};
use imagegen::{generate_or_placeholder, GeminiImageClient, ImageGenerator, PlaceholderImageGenerator};
use market::{MarketData, QuotePageScraper};
use page_image::{store_scraped, HttpPageImageScraper, PageImageSource};

#[derive(Default, Clone)]
pub struct Enricher {
    page_images: Option<Arc<dyn PageImageSource>>,
    geocoder: Option<Arc<dyn Geocoder>>,
    images: Option<Arc<dyn ImageGenerator>>,
    market: Option<Arc<dyn MarketData>>,
}

impl Enricher {
    /// An enricher that does nothing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_images(mut self, source: Arc<dyn PageImageSource>) -> Self {
        self.page_images = Some(source);
        self
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_image_generator(mut self, generator: Arc<dyn ImageGenerator>) -> Self {
        self.images = Some(generator);
        self
    }

    pub fn with_market_data(mut self, market: Arc<dyn MarketData>) -> Self {
        self.market = Some(market);
        self
    }

    pub fn image_generator(&self) -> Option<Arc<dyn ImageGenerator>> {
        self.images.clone()
    }

    /// Wire up the real services. Missing keys disable a service rather than
    /// failing; `dry_run` keeps everything offline.
    pub fn from_config(config: &Config, dry_run: bool) -> Result<Self> {
        if dry_run {
            return Ok(Self::new().with_image_generator(Arc::new(PlaceholderImageGenerator)));
        }

        let timeout = config.enrichment.http_timeout_secs;
        let user_agent = &config.enrichment.user_agent;
        let mut enricher = Self::new();

        if config.enrichment.scrape_images {
            enricher = enricher.with_page_images(Arc::new(HttpPageImageScraper::new(
                timeout, user_agent,
            )?));
        }

        if config.geocoding.enabled {
            match config.get_maps_api_key() {
                Some(key) => {
                    let geocoder = match &config.geocoding.base_url {
                        Some(base_url) => {
                            GoogleGeocoder::with_base_url(key, base_url.clone(), timeout)?
                        }
                        None => GoogleGeocoder::new(key, timeout)?,
                    };
                    enricher = enricher.with_geocoder(Arc::new(geocoder));
                }
                None => info!(
                    "Geocoding disabled: {} is not set",
                    config.geocoding.api_key_env
                ),
            }
        }

        if config.image.enabled {
            match config.get_image_api_key() {
                Ok(key) if !key.is_empty() => {
                    let model = config.image.model.clone();
                    let timeout = config.image.timeout_secs;
                    let client = match &config.image.base_url {
                        Some(base_url) => {
                            GeminiImageClient::with_base_url(key, model, base_url.clone(), timeout)?
                        }
                        None => GeminiImageClient::new(key, model, timeout)?,
                    };
                    enricher = enricher.with_image_generator(Arc::new(client));
                }
                Ok(_) => info!("Image generation disabled: no API key"),
                Err(e) => info!("Image generation disabled: {}", e),
            }
        }

        if config.enrichment.market_data {
            enricher = enricher.with_market_data(Arc::new(QuotePageScraper::new(
                config.enrichment.quote_url.clone(),
                timeout,
                user_agent,
            )?));
        }

        Ok(enricher)
    }

    /// Attach whatever extras `kind` calls for. Placeholder guesses are left
    /// untouched.
    pub async fn enrich(&self, kind: GameKind, guess: &mut Guess) {
        if guess.is_placeholder() {
            return;
        }

        let plan = kind.image_plan();
        let wikipedia_url = guess.wikipedia_url.clone();
        let places = place_queries(kind, guess);
        let ticker = if kind.wants_market_data() {
            guess.detail_str("ticker").map(str::to_string)
        } else {
            None
        };
        let prompt = illustration_prompt(kind, &guess.name);

        let generated = async {
            match (&self.images, plan.generate) {
                (Some(generator), true) => Some(
                    generate_or_placeholder(generator.as_ref(), &prompt, kind.accent_color())
                        .await,
                ),
                _ => None,
            }
        };
        let scraped = async {
            match (plan.scrape, wikipedia_url.as_deref()) {
                (Some(hints), Some(url)) => self.scrape(url, &hints).await,
                _ => None,
            }
        };
        let located = self.geocode_all(places);
        let quote = async {
            match ticker.as_deref() {
                Some(ticker) => self.quote(ticker).await,
                None => None,
            }
        };

        let (generated, scraped, located, quote) = tokio::join!(generated, scraped, located, quote);

        if let Some(url) = generated {
            guess.image_url = Some(url);
        }
        if let Some(url) = scraped {
            store_scraped(guess, url, plan.generate && guess.image_url.is_some());
        }
        if guess.image_url.is_none() {
            // city answers may carry their own picture
            if let Some(url) = guess.detail_str("image").filter(|u| u.starts_with("http")) {
                guess.image_url = Some(url.to_string());
            }
        }
        guess.locations = located;
        guess.market = quote;
    }

    async fn scrape(&self, url: &str, hints: &ScrapeHints) -> Option<String> {
        let source = self.page_images.as_ref()?;
        match source.find_image(url, hints).await {
            Ok(found) => {
                debug!("Image for {}: {:?}", url, found);
                found
            }
            Err(e) => {
                warn!("Image scrape failed for {}: {:#}", url, e);
                None
            }
        }
    }

    async fn geocode_all(&self, places: Vec<(String, String)>) -> Vec<Location> {
        let Some(geocoder) = &self.geocoder else {
            return Vec::new();
        };

        let mut locations = Vec::new();
        for (label, place) in places {
            match geocoder.geocode(&place).await {
                Ok(Some(coordinates)) => locations.push(Location {
                    label,
                    place,
                    coordinates,
                }),
                Ok(None) => debug!("No coordinates for {:?}", place),
                Err(e) => warn!("Geocoding failed for {:?}: {:#}", place, e),
            }
        }
        locations
    }

    async fn quote(&self, ticker: &str) -> Option<MarketQuote> {
        let market = self.market.as_ref()?;
        match market.quote(ticker).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!("Market data lookup failed for {}: {:#}", ticker, e);
                None
            }
        }
    }
}

/// `(label, place)` pairs worth geocoding for this guess.
pub fn place_queries(kind: GameKind, guess: &Guess) -> Vec<(String, String)> {
    match kind.place_fields() {
        PlaceFields::None => Vec::new(),
        PlaceFields::Labeled(fields) => fields
            .iter()
            .filter_map(|(label, field)| {
                guess
                    .detail_str(field)
                    .filter(|p| is_geocodable(p))
                    .map(|p| (label.to_string(), p.to_string()))
            })
            .collect(),
        PlaceFields::FirstOf(fields) => fields
            .iter()
            .find_map(|field| guess.detail_str(field).filter(|p| is_geocodable(p)))
            .map(|p| vec![("center".to_string(), p.to_string())])
            .unwrap_or_default(),
        PlaceFields::EachOf(field) => guess
            .detail_list(field)
            .into_iter()
            .filter(|p| is_geocodable(p))
            .map(|p| (field.to_string(), p.to_string()))
            .collect(),
    }
}
