//! Per-user voice preferences, one JSON file per user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{GameError, GameResult};

pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

/// The prebuilt Gemini text-to-speech voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Voice {
    Achernar,
    Achird,
    Algenib,
    Algieba,
    Alnilam,
    Aoede,
    Autonoe,
    Callirrhoe,
    Charon,
    Despina,
    Enceladus,
    Erinome,
    Fenrir,
    Gacrux,
    Iapetus,
    Kore,
    Laomedeia,
    Leda,
    Orus,
    Puck,
    Pulcherrima,
    Rasalgethi,
    Sadachbia,
    Sadaltager,
    Schedar,
    Sulafat,
    Umbriel,
    Vindemiatrix,
    #[default]
    Zephyr,
    Zubenelgenubi,
}

impl Voice {
    pub const ALL: [Voice; 30] = [
        Voice::Achernar,
        Voice::Achird,
        Voice::Algenib,
        Voice::Algieba,
        Voice::Alnilam,
        Voice::Aoede,
        Voice::Autonoe,
        Voice::Callirrhoe,
        Voice::Charon,
        Voice::Despina,
        Voice::Enceladus,
        Voice::Erinome,
        Voice::Fenrir,
        Voice::Gacrux,
        Voice::Iapetus,
        Voice::Kore,
        Voice::Laomedeia,
        Voice::Leda,
        Voice::Orus,
        Voice::Puck,
        Voice::Pulcherrima,
        Voice::Rasalgethi,
        Voice::Sadachbia,
        Voice::Sadaltager,
        Voice::Schedar,
        Voice::Sulafat,
        Voice::Umbriel,
        Voice::Vindemiatrix,
        Voice::Zephyr,
        Voice::Zubenelgenubi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Achernar => "Achernar",
            Voice::Achird => "Achird",
            Voice::Algenib => "Algenib",
            Voice::Algieba => "Algieba",
            Voice::Alnilam => "Alnilam",
            Voice::Aoede => "Aoede",
            Voice::Autonoe => "Autonoe",
            Voice::Callirrhoe => "Callirrhoe",
            Voice::Charon => "Charon",
            Voice::Despina => "Despina",
            Voice::Enceladus => "Enceladus",
            Voice::Erinome => "Erinome",
            Voice::Fenrir => "Fenrir",
            Voice::Gacrux => "Gacrux",
            Voice::Iapetus => "Iapetus",
            Voice::Kore => "Kore",
            Voice::Laomedeia => "Laomedeia",
            Voice::Leda => "Leda",
            Voice::Orus => "Orus",
            Voice::Puck => "Puck",
            Voice::Pulcherrima => "Pulcherrima",
            Voice::Rasalgethi => "Rasalgethi",
            Voice::Sadachbia => "Sadachbia",
            Voice::Sadaltager => "Sadaltager",
            Voice::Schedar => "Schedar",
            Voice::Sulafat => "Sulafat",
            Voice::Umbriel => "Umbriel",
            Voice::Vindemiatrix => "Vindemiatrix",
            Voice::Zephyr => "Zephyr",
            Voice::Zubenelgenubi => "Zubenelgenubi",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = GameError;

    /// Exact, case-sensitive voice name.
    fn from_str(s: &str) -> GameResult<Self> {
        Voice::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| GameError::InvalidVoice(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSettings {
    pub voice: Voice,
    pub language_code: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            voice: Voice::default(),
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// On-disk shape; lenient so stale or hand-edited files still load.
#[derive(Debug, Deserialize)]
struct StoredSettings {
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    language_code: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// A fresh random user id.
pub fn new_user_id() -> String {
    Uuid::new_v4().to_string()
}

fn parse_user_id(user_id: &str) -> GameResult<Uuid> {
    Uuid::parse_str(user_id.trim()).map_err(|_| GameError::InvalidUserId(user_id.to_string()))
}

pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    /// Open (and create if needed) the settings directory.
    pub fn new(dir: impl AsRef<Path>) -> GameResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("Settings directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn available_voices(&self) -> &'static [Voice] {
        &Voice::ALL
    }

    /// File holding `user_id`'s settings. The id must be a UUID, which also
    /// keeps it from naming anything outside the directory.
    pub fn path_for(&self, user_id: &str) -> GameResult<PathBuf> {
        let id = parse_user_id(user_id)?;
        Ok(self.dir.join(format!("user_{}.json", id.hyphenated())))
    }

    /// Stored settings, or defaults when there are none or they can't be read.
    pub fn load(&self, user_id: &str) -> GameResult<UserSettings> {
        let path = self.path_for(user_id)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings for user {}, using defaults", user_id);
                return Ok(UserSettings::default());
            }
            Err(e) => {
                warn!("Error reading settings for user {}: {}", user_id, e);
                return Ok(UserSettings::default());
            }
        };

        let stored: StoredSettings = match serde_json::from_str(&content) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Corrupt settings file {}: {}", path.display(), e);
                return Ok(UserSettings::default());
            }
        };

        let voice = match stored.voice.as_deref().map(Voice::from_str) {
            Some(Ok(voice)) => voice,
            Some(Err(_)) => {
                warn!(
                    "User {} has invalid voice {:?}, resetting to {}",
                    user_id,
                    stored.voice,
                    Voice::default()
                );
                Voice::default()
            }
            None => Voice::default(),
        };

        Ok(UserSettings {
            voice,
            language_code: stored
                .language_code
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string()),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }

    /// Write settings, stamping `created_at` once and `updated_at` every time.
    pub fn save(&self, user_id: &str, mut settings: UserSettings) -> GameResult<UserSettings> {
        let path = self.path_for(user_id)?;
        let now = Utc::now();
        settings.created_at.get_or_insert(now);
        settings.updated_at = Some(now);
        if settings.language_code.trim().is_empty() {
            settings.language_code = DEFAULT_LANGUAGE_CODE.to_string();
        }

        fs::write(&path, serde_json::to_string_pretty(&settings)?)?;
        info!("Settings saved for user {}", user_id);
        Ok(settings)
    }

    pub fn update_voice(&self, user_id: &str, voice: &str) -> GameResult<UserSettings> {
        let voice = Voice::from_str(voice)?;
        let mut settings = self.load(user_id)?;
        settings.voice = voice;
        self.save(user_id, settings)
    }

    pub fn voice(&self, user_id: &str) -> GameResult<Voice> {
        Ok(self.load(user_id)?.voice)
    }

    pub fn language_code(&self, user_id: &str) -> GameResult<String> {
        Ok(self.load(user_id)?.language_code)
    }

    /// Remove a user's settings. Returns whether a file existed.
    pub fn delete(&self, user_id: &str) -> GameResult<bool> {
        let path = self.path_for(user_id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Settings deleted for user {}", user_id);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_names() {
        assert_eq!(Voice::ALL.len(), 30);
        assert_eq!(Voice::default(), Voice::Zephyr);
        assert_eq!(Voice::from_str("Puck").unwrap(), Voice::Puck);
        for near_miss in ["puck", "PUCK", " Puck"] {
            assert!(matches!(
                Voice::from_str(near_miss),
                Err(GameError::InvalidVoice(_))
            ));
        }
        assert!(matches!(
            Voice::from_str("Robot"),
            Err(GameError::InvalidVoice(_))
        ));
        for voice in Voice::ALL {
            assert_eq!(Voice::from_str(voice.as_str()).unwrap(), voice);
        }
    }

    #[test]
    fn test_voice_serializes_as_name() {
        assert_eq!(serde_json::to_string(&Voice::Kore).unwrap(), "\"Kore\"");
    }

    #[test]
    fn test_user_id_must_be_uuid() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.path_for("../../etc/passwd"),
            Err(GameError::InvalidUserId(_))
        ));
        let id = new_user_id();
        let path = store.path_for(&id).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("user_{}.json", id)
        );
    }
}
