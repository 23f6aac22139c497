//! Configuration loading from files and defaults

use anyhow::Result;
use guesswork::config::Config;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_config_has_defaults() -> Result<()> {
    let config = Config::default();

    assert!(!config.llm.provider.is_empty());
    assert!(!config.llm.model.is_empty());
    assert!(config.llm.timeout_secs > 0);
    assert!(config.image.enabled);
    assert!(config.geocoding.enabled);
    assert!(config.enrichment.scrape_images);
    assert!(config.enrichment.market_data);

    Ok(())
}

#[test]
fn test_load_full_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("guesswork.toml");
    fs::write(
        &path,
        r#"
[llm]
provider = "openai-compatible"
model = "llama3.1"
api_key_env = "none"
base_url = "http://localhost:11434/v1"
max_tokens = 2048

[image]
enabled = false

[geocoding]
api_key_env = "MY_MAPS_KEY"

[enrichment]
http_timeout_secs = 3
market_data = false
quote_url = "https://quotes.example/{ticker}"

[settings]
dir = "/var/lib/guesswork/users"

[odd]
people_file = "data/people.txt"
"#,
    )?;

    let config = Config::load_with_path(Some(path.to_string_lossy().into_owned()))?;
    assert_eq!(config.llm.provider, "openai-compatible");
    assert_eq!(config.llm.get_max_tokens(), 2048);
    assert_eq!(config.get_api_key()?, "");
    assert!(!config.image.enabled);
    assert_eq!(config.geocoding.api_key_env, "MY_MAPS_KEY");
    assert_eq!(config.enrichment.http_timeout_secs, 3);
    assert!(!config.enrichment.market_data);
    assert!(config.enrichment.scrape_images);
    assert_eq!(config.settings.dir, PathBuf::from("/var/lib/guesswork/users"));
    assert_eq!(config.odd.people_file, PathBuf::from("data/people.txt"));
    assert_eq!(config.odd.outfits_file, PathBuf::from("outfits.txt"));

    Ok(())
}

#[test]
fn test_explicit_missing_path_is_an_error() {
    let result = Config::load_with_path(Some("/nonexistent/guesswork.toml".to_string()));
    assert!(result.is_err());
}

#[test]
fn test_invalid_toml_is_an_error() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[llm\nprovider = ")?;
    assert!(Config::load_from_path(&path).is_err());
    Ok(())
}

#[test]
fn test_llm_section_requires_provider_and_model() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("partial.toml");
    fs::write(&path, "[llm]\nmodel = \"gemini-2.5-flash\"\n")?;
    assert!(Config::load_from_path(&path).is_err());
    Ok(())
}
