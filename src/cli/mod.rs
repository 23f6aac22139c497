pub mod config_check;
pub mod odd;
pub mod play;
pub mod settings;

use anyhow::Result;
use serde_json::Value;
use tracing::info;

use crate::config::Config;

/// Load config and apply the global command-line overrides.
pub fn load_config(
    config_path: Option<String>,
    model_override: Option<String>,
    provider_override: Option<String>,
) -> Result<Config> {
    let mut config = Config::load_with_path(config_path)?;

    if let Some(provider) = provider_override {
        info!("CLI override: provider = {}", provider);
        config.llm.provider = provider;
    }
    if let Some(model) = model_override {
        info!("CLI override: model = {}", model);
        config.llm.model = model;
    }
    Ok(config)
}

/// Shorten inline `data:` images so terminal output stays readable.
pub fn abbreviate_data_urls(value: &mut Value) {
    match value {
        Value::String(s) if s.starts_with("data:") && s.len() > 64 => {
            let header = s.split(',').next().unwrap_or("data:");
            *s = format!("{},... ({} bytes)", header, s.len());
        }
        Value::Array(items) => items.iter_mut().for_each(abbreviate_data_urls),
        Value::Object(map) => map.values_mut().for_each(abbreviate_data_urls),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_abbreviate_data_urls() {
        let long = format!("data:image/png;base64,{}", "A".repeat(100));
        let mut value = json!({"image_url": long, "name": "x", "nested": ["data:short"]});
        abbreviate_data_urls(&mut value);
        assert_eq!(value["image_url"], "data:image/png;base64,... (122 bytes)");
        assert_eq!(value["nested"][0], "data:short");
        assert_eq!(value["name"], "x");
    }

    #[test]
    fn test_load_config_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guesswork.toml");
        std::fs::write(&path, "[llm]\nprovider = \"gemini\"\nmodel = \"a\"\n").unwrap();
        let config = load_config(
            Some(path.to_string_lossy().into_owned()),
            Some("b".to_string()),
            Some("openai-compatible".to_string()),
        )
        .unwrap();
        assert_eq!(config.llm.model, "b");
        assert_eq!(config.llm.provider, "openai-compatible");
    }
}
