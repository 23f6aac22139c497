use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use tracing::{debug, warn};

use crate::llm::client_impl::{
    build_http_client, gemini_generate, GeminiContent, GeminiGenerationConfig, GeminiPart,
    GeminiRequest, GEMINI_BASE_URL,
};
use crate::util::SecretString;

pub const NO_IMAGE_TEXT: &str = "No Image Generated";
pub const FAILED_IMAGE_TEXT: &str = "Image Generation Failed";
pub const FAILURE_COLOR: &str = "EF4444";

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// A `data:` URL for the generated picture, or `None` when the model
    /// answered without one.
    async fn generate(&self, prompt: &str) -> Result<Option<String>>;
}

/// Stand-in picture URL for when generation produced nothing.
pub fn placeholder_url(color: &str, text: &str) -> String {
    format!(
        "https://via.placeholder.com/400x400/{}/FFFFFF?text={}",
        color,
        text.replace(' ', "+")
    )
}

/// Generate a picture, substituting a placeholder URL for "no image" and for
/// errors. Never fails.
pub async fn generate_or_placeholder(
    generator: &dyn ImageGenerator,
    prompt: &str,
    color: &str,
) -> String {
    match generator.generate(prompt).await {
        Ok(Some(url)) => url,
        Ok(None) => {
            debug!("Image model returned no image");
            placeholder_url(color, NO_IMAGE_TEXT)
        }
        Err(e) => {
            warn!("Image generation failed: {:#}", e);
            placeholder_url(FAILURE_COLOR, FAILED_IMAGE_TEXT)
        }
    }
}

/// Split a `data:<mime>;base64,<payload>` URL into its MIME type and bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let Some(rest) = url.strip_prefix("data:") else {
        bail!("not a data URL");
    };
    let Some((header, payload)) = rest.split_once(',') else {
        bail!("data URL has no payload");
    };
    let Some(mime) = header.strip_suffix(";base64") else {
        bail!("data URL is not base64-encoded");
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .context("invalid base64 in data URL")?;
    Ok((mime.to_string(), bytes))
}

pub struct GeminiImageClient {
    api_key: SecretString,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String, timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(api_key, model, GEMINI_BASE_URL.to_string(), timeout_secs)
    }

    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_http_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: None,
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
            }),
        };

        debug!("Requesting image from {}", self.model);
        let response = gemini_generate(
            &self.client,
            &self.base_url,
            &self.model,
            &self.api_key,
            &request,
        )
        .await?;

        let url = response
            .parts()
            .find_map(|p| p.inline_data.as_ref())
            .map(|inline| format!("data:{};base64,{}", inline.mime_type, inline.data));
        Ok(url)
    }
}

/// Offline generator for `--dry-run`.
pub struct PlaceholderImageGenerator;

#[async_trait]
impl ImageGenerator for PlaceholderImageGenerator {
    async fn generate(&self, _prompt: &str) -> Result<Option<String>> {
        Ok(None)
    }
}
