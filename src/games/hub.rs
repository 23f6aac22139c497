use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use super::{GameKind, Guesser, OddGame};
use crate::config::Config;
use crate::enrich::Enricher;
use crate::llm::client::LlmClient;
use crate::llm::factory::create_client;

/// Every game, sharing one generation client and one enricher.
pub struct GameHub {
    guessers: [Guesser; 7],
    odd: OddGame,
}

impl GameHub {
    pub fn new(llm: Arc<dyn LlmClient>, enricher: Arc<Enricher>, odd: OddGame) -> Self {
        let guessers = GameKind::ALL.map(|kind| Guesser::new(kind, llm.clone(), enricher.clone()));
        Self { guessers, odd }
    }

    pub fn from_config(config: &Config, dry_run: bool) -> Result<Self> {
        let llm = create_client(config, dry_run)?;
        let enricher = Arc::new(Enricher::from_config(config, dry_run)?);
        let odd = OddGame::from_config(&config.odd, enricher.image_generator());
        debug!(
            "Game hub ready (provider: {}, model: {}, dry run: {})",
            config.llm.provider, config.llm.model, dry_run
        );
        Ok(Self::new(llm, enricher, odd))
    }

    pub fn guesser(&self, kind: GameKind) -> &Guesser {
        // ALL lists the kinds in declaration order
        &self.guessers[kind as usize]
    }

    pub fn odd(&self) -> &OddGame {
        &self.odd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::MockLlmClient;

    #[test]
    fn test_guesser_lookup_matches_kind() {
        let hub = GameHub::new(
            Arc::new(MockLlmClient::new()),
            Arc::new(Enricher::new()),
            OddGame::new(vec![], vec![], vec![], None),
        );
        for kind in GameKind::ALL {
            assert_eq!(hub.guesser(kind).kind(), kind);
        }
    }

    #[tokio::test]
    async fn test_dry_run_hub_plays_offline() {
        let hub = GameHub::from_config(&Config::default(), true).unwrap();
        let turn = hub.guesser(GameKind::Person).start("physicist").await.unwrap();
        assert_eq!(turn.guess.unwrap().name, "Albert Einstein");
    }
}
