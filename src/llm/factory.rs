use anyhow::{bail, Result};
use std::sync::Arc;

use super::client::{LlmClient, MockLlmClient};
use super::client_impl::{GeminiClient, OpenAIClient};
use crate::config::Config;

/// Create the generation client based on configuration.
/// Returned as an `Arc` because every game shares it.
pub fn create_client(config: &Config, dry_run: bool) -> Result<Arc<dyn LlmClient>> {
    if dry_run {
        return Ok(Arc::new(MockLlmClient::new()));
    }

    let api_key = config.get_api_key()?;
    let max_tokens = config.llm.get_max_tokens();
    let timeout = config.llm.timeout_secs;

    match config.llm.provider.as_str() {
        "gemini" => {
            let client = match &config.llm.base_url {
                Some(base_url) => GeminiClient::with_base_url(
                    api_key,
                    config.llm.model.clone(),
                    base_url.clone(),
                    max_tokens,
                    timeout,
                )?,
                None => GeminiClient::new(api_key, config.llm.model.clone(), max_tokens, timeout)?,
            };
            Ok(Arc::new(client))
        }

        "openai-compatible" => {
            let base_url = config
                .llm
                .base_url
                .clone()
                .unwrap_or_else(|| "http://localhost:11434/v1".to_string());

            Ok(Arc::new(OpenAIClient::with_base_url(
                api_key,
                config.llm.model.clone(),
                base_url,
                max_tokens,
                timeout,
            )?))
        }

        unknown => bail!("Unknown LLM provider: {}", unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    fn test_create_mock_client_for_dry_run() {
        let mut config = Config::default();
        config.llm.api_key_env = Some("GUESSWORK_TEST_NONEXISTENT_KEY_FACTORY".to_string());
        // Dry run never looks at the key
        create_client(&config, true).unwrap();
    }

    #[test]
    #[serial]
    fn test_create_gemini_client() {
        env::set_var("GUESSWORK_FACTORY_KEY", "test_key");
        let mut config = Config::default();
        config.llm.api_key_env = Some("GUESSWORK_FACTORY_KEY".to_string());
        assert!(create_client(&config, false).is_ok());
        env::remove_var("GUESSWORK_FACTORY_KEY");
    }

    #[test]
    fn test_create_openai_compatible_client_without_key() {
        let mut config = Config::default();
        config.llm.provider = "openai-compatible".to_string();
        config.llm.api_key_env = Some("GUESSWORK_TEST_NONEXISTENT_KEY_LOCAL".to_string());
        assert!(create_client(&config, false).is_ok());
    }

    #[test]
    fn test_create_client_with_unknown_provider() {
        let mut config = Config::default();
        config.llm.provider = "unknown_provider".to_string();
        config.llm.api_key_env = Some("none".to_string());
        let result = create_client(&config, false);
        match result {
            Err(e) => assert!(e.to_string().contains("Unknown LLM provider")),
            Ok(_) => panic!("expected unknown provider error"),
        }
    }

    #[test]
    fn test_create_client_without_api_key() {
        let mut config = Config::default();
        config.llm.api_key_env = Some("GUESSWORK_TEST_NONEXISTENT_KEY_FACTORY_99999".to_string());
        match create_client(&config, false) {
            Err(e) => assert!(e.to_string().contains("API key not found")),
            Ok(_) => panic!("expected missing key error"),
        }
    }
}
