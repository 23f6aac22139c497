//! The odd-situation game: a generated picture of a famous person in an
//! unlikely outfit and place; the player names the person.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::prompts::odd_situation_prompt;
use crate::config::OddConfig;
use crate::enrich::imagegen::{generate_or_placeholder, ImageGenerator, PlaceholderImageGenerator};
use crate::error::{GameError, GameResult};
use crate::session::{SessionId, SessionStore};

const DEFAULT_PERSON: &str = "Albert Einstein";
const DEFAULT_OUTFIT: &str = "space suit";
const DEFAULT_SCENE: &str = "on the moon";
const IMAGE_COLOR: &str = "4F46E5";

#[derive(Debug, Clone, Serialize)]
pub struct OddGuess {
    pub guess: String,
    pub correct: bool,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct OddSession {
    person: String,
    outfit: String,
    scene: String,
    guesses: Vec<OddGuess>,
    correct: bool,
    revealed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OddRound {
    pub session_id: SessionId,
    pub image_url: String,
    pub game_over: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OddVerdict {
    pub session_id: SessionId,
    pub correct: bool,
    pub game_over: bool,
    pub total_guesses: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OddReveal {
    pub session_id: SessionId,
    pub correct_person: String,
    pub outfit: String,
    pub setting: String,
    pub full_situation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OddStatus {
    pub session_id: SessionId,
    pub guesses: Vec<OddGuess>,
    pub correct: bool,
    pub revealed: bool,
    pub can_reveal: bool,
}

/// Loose name match: either string contains the other, or some word of the
/// guess longer than two characters appears in the answer. Case-insensitive.
pub fn is_match(guess: &str, answer: &str) -> bool {
    let guess = guess.trim().to_lowercase();
    let answer = answer.trim().to_lowercase();
    if guess.is_empty() {
        return false;
    }
    answer.contains(&guess)
        || guess.contains(&answer)
        || guess
            .split_whitespace()
            .filter(|w| w.chars().count() > 2)
            .any(|w| answer.contains(w))
}

/// Non-blank trimmed lines of `path`; empty when the file is missing.
fn load_lines(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Err(e) => {
            warn!("Could not read {}: {}. Using default data.", path.display(), e);
            Vec::new()
        }
    }
}

fn pick(options: &[String], fallback: &str) -> String {
    if options.is_empty() {
        return fallback.to_string();
    }
    options[rand::random_range(0..options.len())].clone()
}

pub struct OddGame {
    people: Vec<String>,
    outfits: Vec<String>,
    scenes: Vec<String>,
    images: Arc<dyn ImageGenerator>,
    sessions: SessionStore<OddSession>,
}

impl OddGame {
    pub fn new(
        people: Vec<String>,
        outfits: Vec<String>,
        scenes: Vec<String>,
        images: Option<Arc<dyn ImageGenerator>>,
    ) -> Self {
        Self {
            people,
            outfits,
            scenes,
            images: images.unwrap_or_else(|| Arc::new(PlaceholderImageGenerator)),
            sessions: SessionStore::new(),
        }
    }

    pub fn from_config(config: &OddConfig, images: Option<Arc<dyn ImageGenerator>>) -> Self {
        Self::new(
            load_lines(&config.people_file),
            load_lines(&config.outfits_file),
            load_lines(&config.settings_file),
            images,
        )
    }

    pub async fn start(&self) -> OddRound {
        let person = pick(&self.people, DEFAULT_PERSON);
        let outfit = pick(&self.outfits, DEFAULT_OUTFIT);
        let scene = pick(&self.scenes, DEFAULT_SCENE);

        let prompt = odd_situation_prompt(&person, &outfit, &scene);
        let image_url = generate_or_placeholder(self.images.as_ref(), &prompt, IMAGE_COLOR).await;

        let session_id = self
            .sessions
            .insert(OddSession {
                person,
                outfit,
                scene,
                guesses: Vec::new(),
                correct: false,
                revealed: false,
            })
            .await;
        info!("Started odd-situation session {}", session_id);

        OddRound {
            session_id,
            image_url,
            game_over: false,
        }
    }

    pub async fn guess(&self, session_id: SessionId, text: &str) -> GameResult<OddVerdict> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GameError::EmptyInput);
        }

        self.sessions
            .with(session_id, |s| {
                if s.correct || s.revealed {
                    return Err(GameError::SessionFinished(session_id));
                }
                let correct = is_match(text, &s.person);
                s.guesses.push(OddGuess {
                    guess: text.to_lowercase(),
                    correct,
                    at: Utc::now(),
                });
                s.correct = correct;
                Ok(OddVerdict {
                    session_id,
                    correct,
                    game_over: correct,
                    total_guesses: s.guesses.len(),
                })
            })
            .await?
    }

    pub async fn reveal(&self, session_id: SessionId) -> GameResult<OddReveal> {
        self.sessions
            .with(session_id, |s| {
                s.revealed = true;
                OddReveal {
                    session_id,
                    correct_person: s.person.clone(),
                    outfit: s.outfit.clone(),
                    setting: s.scene.clone(),
                    full_situation: format!("{} wearing {} {}", s.person, s.outfit, s.scene),
                }
            })
            .await
    }

    pub async fn status(&self, session_id: SessionId) -> GameResult<OddStatus> {
        self.sessions
            .with(session_id, |s| OddStatus {
                session_id,
                guesses: s.guesses.clone(),
                correct: s.correct,
                revealed: s.revealed,
                can_reveal: !s.guesses.is_empty() && !s.correct,
            })
            .await
    }

    pub async fn end(&self, session_id: SessionId) -> GameResult<()> {
        self.sessions
            .remove(session_id)
            .await
            .map(|_| ())
            .ok_or(GameError::UnknownSession(session_id))
    }
}
