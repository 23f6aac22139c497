use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub odd: OddConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "gemini" or "openai-compatible"
    pub provider: String,
    pub model: String,
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,

    /// Optional: Override max_tokens for generation requests.
    /// Defaults to 8192 for gemini and 4096 otherwise.
    #[serde(default)]
    pub max_tokens: Option<u32>,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn get_max_tokens(&self) -> u32 {
        if let Some(tokens) = self.max_tokens {
            return tokens;
        }
        match self.provider.as_str() {
            "gemini" => 8192,
            _ => 4096,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash-lite".to_string(),
            api_key_env: Some("GEMINI_API_KEY".to_string()),
            base_url: None,
            max_tokens: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Image generation for the event, invention and odd-situation games.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_image_model")]
    pub model: String,
    /// Falls back to `llm.api_key_env` when unset
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_image_model(),
            api_key_env: None,
            base_url: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_maps_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: default_maps_key_env(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Timeout for page scrapes and geocoding requests (default: 10)
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_true")]
    pub scrape_images: bool,

    #[serde(default = "default_true")]
    pub market_data: bool,

    /// Quote page for business tickers; `{ticker}` is substituted.
    #[serde(default = "default_quote_url")]
    pub quote_url: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            user_agent: default_user_agent(),
            scrape_images: true,
            market_data: true,
            quote_url: default_quote_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_settings_dir")]
    pub dir: PathBuf,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            dir: default_settings_dir(),
        }
    }
}

/// Line files feeding the odd-situation game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddConfig {
    #[serde(default = "default_people_file")]
    pub people_file: PathBuf,
    #[serde(default = "default_outfits_file")]
    pub outfits_file: PathBuf,
    #[serde(default = "default_scenes_file")]
    pub settings_file: PathBuf,
}

impl Default for OddConfig {
    fn default() -> Self {
        Self {
            people_file: default_people_file(),
            outfits_file: default_outfits_file(),
            settings_file: default_scenes_file(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_http_timeout() -> u64 {
    10
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

fn default_maps_key_env() -> String {
    "GOOGLE_MAPS_API_KEY".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_quote_url() -> String {
    "https://finance.yahoo.com/quote/{ticker}".to_string()
}

fn default_settings_dir() -> PathBuf {
    PathBuf::from("user_settings")
}

fn default_people_file() -> PathBuf {
    PathBuf::from("people.txt")
}

fn default_outfits_file() -> PathBuf {
    PathBuf::from("outfits.txt")
}

fn default_scenes_file() -> PathBuf {
    PathBuf::from("settings.txt")
}

impl Config {
    /// Load configuration from a specific path, or use default search paths
    pub fn load_with_path(path: Option<String>) -> Result<Self> {
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path);
            return Self::load_from_path(&config_path);
        }

        if let Ok(config) = Self::load_from_path("guesswork.toml") {
            debug!("Loaded config from ./guesswork.toml");
            return Ok(config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("guesswork").join("config.toml");
            if let Ok(config) = Self::load_from_path(&config_path) {
                debug!("Loaded config from {:?}", config_path);
                return Ok(config);
            }
        }

        debug!("Using default config");
        Ok(Self::default())
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the generation API key from the environment variable named in config
    pub fn get_api_key(&self) -> Result<String> {
        match &self.llm.api_key_env {
            Some(env_var) => {
                if env_var.to_lowercase() == "none" {
                    return Ok(String::new());
                }

                // Local OpenAI-compatible servers usually run without a key
                if self.llm.provider == "openai-compatible" {
                    return Ok(env::var(env_var).unwrap_or_default());
                }

                env::var(env_var).map_err(|_| {
                    anyhow::anyhow!("API key not found in environment variable: {}", env_var)
                })
            }
            None => Ok(String::new()),
        }
    }

    /// Image generation key; shares the generation key unless overridden.
    pub fn get_image_api_key(&self) -> Result<String> {
        match &self.image.api_key_env {
            Some(env_var) => env::var(env_var).map_err(|_| {
                anyhow::anyhow!("API key not found in environment variable: {}", env_var)
            }),
            None => self.get_api_key(),
        }
    }

    /// Geocoding is optional: a missing key disables it instead of failing startup.
    pub fn get_maps_api_key(&self) -> Option<String> {
        env::var(&self.geocoding.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}
