use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::GameKind;
use crate::util::is_blank_value;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A geocoded place mentioned by a guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Role of the place ("birthplace", "headquarters", "cities", ...)
    pub label: String,
    /// The place name as the model wrote it
    pub place: String,
    #[serde(flatten)]
    pub coordinates: LatLng,
}

/// Stock data scraped for a listed business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub ticker: String,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub currency: Option<String>,
    pub source_url: String,
}

/// One candidate answer.
///
/// `name` and `reasoning` are always present. Everything else the model
/// returned that has no dedicated field is kept in `details` and serialised
/// flat alongside the fixed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guess {
    pub name: String,
    pub reasoning: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub wikipedia_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub wikipedia_image_url: Option<String>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub market: Option<MarketQuote>,
    /// Set when this is a placeholder standing in for a failed generation
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Keys owned by the fixed fields; model output under these names is dropped
/// from `details` so the flattened JSON has no duplicates.
const RESERVED_KEYS: &[&str] = &[
    "name",
    "reasoning",
    "overview",
    "wikipedia_url",
    "image_url",
    "wikipedia_image_url",
    "locations",
    "coordinates",
    "market",
    "error",
];

fn non_blank_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !is_blank_value(s))
        .map(str::to_string)
}

impl Guess {
    /// Validate a model response object and lift it into a `Guess`.
    pub fn from_model(kind: GameKind, mut data: Map<String, Value>) -> Result<Self> {
        let Some(name) = non_blank_string(data.get("name")) else {
            bail!("Missing required field: name");
        };
        let Some(reasoning) = non_blank_string(data.get("reasoning")) else {
            bail!("Missing required field: reasoning");
        };
        for field in kind.required_fields() {
            if non_blank_string(data.get(*field)).is_none() {
                bail!("Missing required field: {}", field);
            }
        }

        let overview = non_blank_string(data.get("overview"));
        let wikipedia_url =
            non_blank_string(data.get("wikipedia_url")).filter(|u| u.starts_with("http"));

        for key in RESERVED_KEYS {
            data.remove(*key);
        }

        let mut guess = Self {
            name,
            reasoning,
            overview,
            wikipedia_url,
            image_url: None,
            wikipedia_image_url: None,
            locations: Vec::new(),
            market: None,
            error: None,
            details: data,
        };
        if guess.overview.is_none() {
            guess.overview = Some(guess.default_overview(kind));
        }
        Ok(guess)
    }

    /// Stand-in returned when generation or parsing fails.
    pub fn placeholder(name: &str, reasoning_prefix: &str, error: String) -> Self {
        Self {
            name: name.to_string(),
            reasoning: format!("{}: {}", reasoning_prefix, error),
            overview: Some("There was an error processing your request.".to_string()),
            wikipedia_url: None,
            image_url: None,
            wikipedia_image_url: None,
            locations: Vec::new(),
            market: None,
            error: Some(error),
            details: Map::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.error.is_some()
    }

    /// A string detail, ignoring "N/A"-style answers.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !is_blank_value(s))
    }

    /// The string entries of an array detail.
    pub fn detail_list(&self, key: &str) -> Vec<&str> {
        self.details
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !is_blank_value(s))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn default_overview(&self, kind: GameKind) -> String {
        match kind {
            GameKind::City => match self.detail_str("country") {
                Some(country) => format!("{} is a city in {}.", self.name, country),
                None => format!("{} is a city.", self.name),
            },
            GameKind::Business => {
                let industry = self.detail_list("industry");
                if industry.is_empty() {
                    format!("{} is a business.", self.name)
                } else {
                    format!(
                        "{} is a business in the {} industry.",
                        self.name,
                        industry.join(", ")
                    )
                }
            }
            _ => format!("{} is a {}.", self.name, kind.noun()),
        }
    }
}
