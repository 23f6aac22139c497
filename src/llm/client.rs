use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Offline client for `--dry-run`: answers each game with a small roster of
/// canned guesses, skipping any name the prompt says was already rejected.
pub struct MockLlmClient;

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self
    }

    fn roster(prompt: &str) -> &'static [&'static str] {
        if prompt.contains("famous person") {
            &[
                r#"{"name": "Albert Einstein", "date_of_birth": "1879-03-14", "place_of_birth": "Ulm, Württemberg, Germany", "date_of_death": "1955-04-18", "place_of_death": "Princeton, New Jersey, United States", "parents": ["Hermann Einstein", "Pauline Koch"], "wikipedia_url": "https://en.wikipedia.org/wiki/Albert_Einstein", "reasoning": "Physicist known for relativity.", "overview": "German-born theoretical physicist."}"#,
                r#"{"name": "Marie Curie", "date_of_birth": "1867-11-07", "place_of_birth": "Warsaw, Masovian, Poland", "wikipedia_url": "https://en.wikipedia.org/wiki/Marie_Curie", "reasoning": "Pioneer of radioactivity research.", "overview": "Polish-French physicist and chemist."}"#,
            ]
        } else if prompt.contains("identifying cities") {
            &[
                r#"{"name": "Paris", "region": "Île-de-France", "country": "France", "population": 2102650, "reasoning": "Capital on the Seine.", "overview": "Capital of France."}"#,
                r#"{"name": "Lyon", "region": "Auvergne-Rhône-Alpes", "country": "France", "reasoning": "Gastronomic capital.", "overview": "Third-largest city in France."}"#,
            ]
        } else if prompt.contains("identifying businesses") {
            &[
                r#"{"name": "Apple Inc.", "type": "public", "stock_exchange": "NASDAQ", "ticker": "AAPL", "industry": ["Consumer electronics"], "current_headquarters": "Cupertino, California, United States", "wikipedia_url": "https://en.wikipedia.org/wiki/Apple_Inc.", "reasoning": "Maker of the iPhone."}"#,
                r#"{"name": "Microsoft", "type": "public", "ticker": "MSFT", "industry": ["Software"], "current_headquarters": "Redmond, Washington, United States", "reasoning": "Maker of Windows."}"#,
            ]
        } else if prompt.contains("the invention is") {
            &[
                r#"{"name": "Printing press", "year_invented": "1440", "place_invented": "Mainz, Rhineland-Palatinate, Germany", "inventors": ["Johannes Gutenberg"], "city": "Mainz, Rhineland-Palatinate, Germany", "reasoning": "Movable type.", "overview": "Mechanical device for printing."}"#,
                r#"{"name": "Telephone", "year_invented": "1876", "inventors": ["Alexander Graham Bell"], "reasoning": "Voice over wire.", "overview": "Telecommunications device."}"#,
            ]
        } else if prompt.contains("identifying movies") {
            &[
                r#"{"name": "Jaws", "directed_by": ["Steven Spielberg"], "running_time": 124, "reasoning": "Shark thriller.", "overview": "A great white shark terrorizes Amity Island."}"#,
                r#"{"name": "The Meg", "directed_by": ["Jon Turteltaub"], "reasoning": "Another shark movie.", "overview": "A megalodon resurfaces."}"#,
            ]
        } else if prompt.contains("identifying TV shows") {
            &[
                r#"{"name": "Breaking Bad", "genre": ["Crime drama"], "number_of_seasons": 5, "cities": ["Albuquerque, New Mexico, United States"], "reasoning": "Chemistry teacher turned drug lord.", "overview": "Walter White's descent."}"#,
                r#"{"name": "Better Call Saul", "genre": ["Crime drama"], "reasoning": "Spin-off.", "overview": "Jimmy McGill's transformation."}"#,
            ]
        } else if prompt.contains("historical events") {
            &[
                r#"{"name": "Apollo 11", "start": "1969-07-16", "end": "1969-07-24", "location": "Moon", "city": "Houston, Texas, United States", "key_figures": ["Neil Armstrong", "Buzz Aldrin"], "reasoning": "First crewed Moon landing.", "overview": "NASA's first Moon landing."}"#,
                r#"{"name": "Fall of the Berlin Wall", "start": "1989-11-09", "city": "Berlin, Berlin, Germany", "reasoning": "End of the Cold War divide.", "overview": "Opening of the border."}"#,
            ]
        } else {
            &[r#"{"name": "Unknown", "reasoning": "mock"}"#]
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        // The exclusion line is the only place rejected names appear
        let excluded = prompt
            .lines()
            .find(|l| l.contains("Do NOT guess"))
            .unwrap_or("");
        let roster = Self::roster(prompt);
        let pick = roster
            .iter()
            .find(|candidate| {
                serde_json::from_str::<serde_json::Value>(candidate)
                    .ok()
                    .and_then(|v| v["name"].as_str().map(|n| !excluded.contains(n)))
                    .unwrap_or(false)
            })
            .unwrap_or(&roster[roster.len() - 1]);
        Ok(format!("```json\n{}\n```", pick))
    }
}

/// Test client that replays a fixed sequence of responses and records prompts.
pub struct ScriptedLlmClient {
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlmClient {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a failing call after the current responses.
    pub fn then_fail(self, message: &str) -> Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(Err(anyhow!(message.to_string())));
        }
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.responses
            .lock()
            .map_err(|_| anyhow!("scripted client poisoned"))?
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("scripted client has no responses left")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_skips_excluded_names() {
        let client = MockLlmClient::new();
        let first = client
            .complete("guess who the famous person is.\nInformation: physicist")
            .await
            .unwrap();
        assert!(first.contains("Albert Einstein"));

        let second = client
            .complete(
                "guess who the famous person is.\n\nIMPORTANT: Do NOT guess any of these people (they have already been marked as incorrect): Albert Einstein",
            )
            .await
            .unwrap();
        assert!(second.contains("Marie Curie"));
    }

    #[tokio::test]
    async fn test_mock_wraps_in_fence() {
        let client = MockLlmClient::new();
        let out = client.complete("identifying movies").await.unwrap();
        assert!(out.starts_with("```json"));
        assert!(out.ends_with("```"));
    }

    #[tokio::test]
    async fn test_scripted_replays_in_order_then_errors() {
        let client = ScriptedLlmClient::new(["one", "two"]).then_fail("boom");
        assert_eq!(client.complete("a").await.unwrap(), "one");
        assert_eq!(client.complete("b").await.unwrap(), "two");
        let err = client.complete("c").await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert!(client.complete("d").await.is_err());
        assert_eq!(client.prompts(), vec!["a", "b", "c", "d"]);
    }
}
