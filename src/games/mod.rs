//! The seven text-driven guessing games plus the odd-situation image game.

pub mod guess;
pub mod guesser;
pub mod hub;
pub mod odd;
pub mod prompts;

pub use guess::{Guess, LatLng, Location, MarketQuote};
pub use guesser::{GuessRecord, Guesser, SessionSnapshot, Turn};
pub use hub::GameHub;
pub use odd::OddGame;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Person,
    City,
    Business,
    Invention,
    Movie,
    TvShow,
    Event,
}

/// How a page scrape decides which `<img>` is "the" picture of the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeHints {
    /// Minimum width and height when both attributes are present
    pub min_size: u32,
    /// Substrings of `src` that mark a plausible picture when sizes are absent
    pub keywords: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePlan {
    /// Ask the image model for an illustration (becomes `image_url`)
    pub generate: bool,
    /// Scrape the guess's Wikipedia page. Lands in `image_url`, or in
    /// `wikipedia_image_url` when an illustration is generated too.
    pub scrape: Option<ScrapeHints>,
}

/// Which model fields name places worth a map pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceFields {
    None,
    /// Every listed field that has a value, each with its own label
    Labeled(&'static [(&'static str, &'static str)]),
    /// The first listed field that has a value, labelled "center"
    FirstOf(&'static [&'static str]),
    /// Every entry of an array field, labelled by the field name
    EachOf(&'static str),
}

impl GameKind {
    pub const ALL: [GameKind; 7] = [
        GameKind::Person,
        GameKind::City,
        GameKind::Business,
        GameKind::Invention,
        GameKind::Movie,
        GameKind::TvShow,
        GameKind::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Person => "person",
            GameKind::City => "city",
            GameKind::Business => "business",
            GameKind::Invention => "invention",
            GameKind::Movie => "movie",
            GameKind::TvShow => "tvshow",
            GameKind::Event => "event",
        }
    }

    /// Singular noun used in prompts and default overviews
    pub fn noun(&self) -> &'static str {
        match self {
            GameKind::Person => "famous person",
            GameKind::City => "city",
            GameKind::Business => "business",
            GameKind::Invention => "invention",
            GameKind::Movie => "movie",
            GameKind::TvShow => "TV show",
            GameKind::Event => "historical event",
        }
    }

    /// Plural used in the exclusion line of the prompt
    pub fn plural(&self) -> &'static str {
        match self {
            GameKind::Person => "people",
            GameKind::City => "cities",
            GameKind::Business => "businesses",
            GameKind::Invention => "inventions",
            GameKind::Movie => "movies",
            GameKind::TvShow => "TV shows",
            GameKind::Event => "events",
        }
    }

    /// Fields beyond `name` and `reasoning` that a guess must carry
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            GameKind::City => &["country"],
            _ => &[],
        }
    }

    pub fn image_plan(&self) -> ImagePlan {
        const PHOTO: ScrapeHints = ScrapeHints {
            min_size: 100,
            keywords: &["photo", "portrait", "image", "jpg", "jpeg", "png"],
        };
        const LOGO: ScrapeHints = ScrapeHints {
            min_size: 100,
            keywords: &[
                "logo", "image", "company", "business", "corporate", "jpg", "jpeg", "png",
            ],
        };
        const DEVICE: ScrapeHints = ScrapeHints {
            min_size: 100,
            keywords: &["photo", "image", "jpg", "jpeg", "png", "invention", "device"],
        };
        const POSTER: ScrapeHints = ScrapeHints {
            min_size: 150,
            keywords: &["poster", "show", "series", "tv", "image", "jpg", "jpeg", "png"],
        };
        const ARCHIVE: ScrapeHints = ScrapeHints {
            min_size: 100,
            keywords: &["upload.wikimedia.org", "photo", "image", "jpg", "jpeg", "png"],
        };

        match self {
            GameKind::Person => ImagePlan {
                generate: false,
                scrape: Some(PHOTO),
            },
            GameKind::Business => ImagePlan {
                generate: false,
                scrape: Some(LOGO),
            },
            GameKind::TvShow => ImagePlan {
                generate: false,
                scrape: Some(POSTER),
            },
            GameKind::Invention => ImagePlan {
                generate: true,
                scrape: Some(DEVICE),
            },
            GameKind::Event => ImagePlan {
                generate: true,
                scrape: Some(ARCHIVE),
            },
            GameKind::City | GameKind::Movie => ImagePlan {
                generate: false,
                scrape: None,
            },
        }
    }

    pub fn place_fields(&self) -> PlaceFields {
        match self {
            GameKind::Person => PlaceFields::Labeled(&[
                ("birthplace", "place_of_birth"),
                ("deathplace", "place_of_death"),
                ("residence", "place_of_residence"),
                ("burial", "place_of_burial"),
            ]),
            GameKind::Business => PlaceFields::Labeled(&[("headquarters", "current_headquarters")]),
            GameKind::Invention => PlaceFields::FirstOf(&["city", "place_invented"]),
            GameKind::Event => PlaceFields::FirstOf(&["city", "location"]),
            GameKind::TvShow => PlaceFields::EachOf("cities"),
            GameKind::City | GameKind::Movie => PlaceFields::None,
        }
    }

    pub fn wants_market_data(&self) -> bool {
        matches!(self, GameKind::Business)
    }

    /// Placeholder colour for generated-image fallbacks
    pub fn accent_color(&self) -> &'static str {
        match self {
            GameKind::Invention => "059669",
            _ => "4F46E5",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "person" | "people" | "famous-person" => Ok(GameKind::Person),
            "city" | "cities" => Ok(GameKind::City),
            "business" | "company" => Ok(GameKind::Business),
            "invention" => Ok(GameKind::Invention),
            "movie" | "film" => Ok(GameKind::Movie),
            "tvshow" | "tv" | "tv-show" | "show" => Ok(GameKind::TvShow),
            "event" | "history" => Ok(GameKind::Event),
            _ => bail!("Unknown game: {}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_aliases() {
        assert_eq!(GameKind::from_str("Person").unwrap(), GameKind::Person);
        assert_eq!(GameKind::from_str("tv").unwrap(), GameKind::TvShow);
        assert_eq!(GameKind::from_str("film").unwrap(), GameKind::Movie);
        assert_eq!(GameKind::from_str("company").unwrap(), GameKind::Business);
    }

    #[test]
    fn test_from_str_unknown() {
        let err = GameKind::from_str("odd").unwrap_err();
        assert!(err.to_string().contains("Unknown game"));
    }

    #[test]
    fn test_as_str_round_trips_through_from_str() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_tv_posters_need_bigger_images() {
        assert_eq!(GameKind::TvShow.image_plan().scrape.unwrap().min_size, 150);
        assert_eq!(GameKind::Person.image_plan().scrape.unwrap().min_size, 100);
    }

    #[test]
    fn test_only_illustrated_games_generate() {
        let generating: Vec<_> = GameKind::ALL
            .into_iter()
            .filter(|k| k.image_plan().generate)
            .collect();
        assert_eq!(generating, vec![GameKind::Invention, GameKind::Event]);
    }

    #[test]
    fn test_city_requires_country() {
        assert_eq!(GameKind::City.required_fields(), &["country"]);
        assert!(GameKind::Movie.required_fields().is_empty());
    }
}
