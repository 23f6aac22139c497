//! One text-driven guessing game: prompt, generate, parse, enrich, and keep
//! score of what the player has rejected.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::prompts::guess_prompt;
use super::{GameKind, Guess};
use crate::enrich::Enricher;
use crate::error::{GameError, GameResult};
use crate::llm::client::LlmClient;
use crate::llm::json::parse_json_object;
use crate::session::{SessionId, SessionStore};

pub const CALL_FAILED_NAME: &str = "Error occurred";
pub const PARSE_FAILED_NAME: &str = "Unable to parse response";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessRecord {
    pub guess: Guess,
    /// `None` until the player votes on it
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone)]
struct Session {
    user_input: String,
    guesses: Vec<GuessRecord>,
    /// Rejected names in rejection order, without duplicates. Never shrinks.
    incorrect_names: Vec<String>,
    game_over: bool,
}

/// The result of `start` or `feedback`.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub session_id: SessionId,
    pub guess: Option<Guess>,
    pub is_correct: Option<bool>,
    pub game_over: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub incorrect_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub user_input: String,
    pub guesses: Vec<GuessRecord>,
    pub incorrect_names: Vec<String>,
    pub total_guesses: usize,
    pub game_over: bool,
}

enum Vote {
    Won(String),
    Retry {
        context: String,
        exclusions: Vec<String>,
        /// Guess count when the vote was recorded
        seen: usize,
    },
}

pub struct Guesser {
    kind: GameKind,
    llm: Arc<dyn LlmClient>,
    enricher: Arc<Enricher>,
    sessions: SessionStore<Session>,
}

impl Guesser {
    pub fn new(kind: GameKind, llm: Arc<dyn LlmClient>, enricher: Arc<Enricher>) -> Self {
        Self {
            kind,
            llm,
            enricher,
            sessions: SessionStore::new(),
        }
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    /// Open a session from the player's description and make the first guess.
    pub async fn start(&self, text: &str) -> GameResult<Turn> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GameError::EmptyInput);
        }

        let guess = self.make_guess(text, &[]).await;
        let session_id = self
            .sessions
            .insert(Session {
                user_input: text.to_string(),
                guesses: vec![GuessRecord {
                    guess: guess.clone(),
                    is_correct: None,
                }],
                incorrect_names: Vec::new(),
                game_over: false,
            })
            .await;

        info!(
            "Started {} session {} with guess {:?}",
            self.kind, session_id, guess.name
        );

        Ok(Turn {
            session_id,
            guess: Some(guess),
            is_correct: None,
            game_over: false,
            message: None,
            incorrect_names: Vec::new(),
        })
    }

    /// Record the player's verdict on the latest guess. A wrong guess is
    /// excluded and another one is made.
    pub async fn feedback(&self, session_id: SessionId, correct: bool) -> GameResult<Turn> {
        let vote = self
            .sessions
            .with(session_id, |s| record_vote(s, session_id, correct))
            .await??;

        match vote {
            Vote::Won(name) => {
                info!("{} session {} solved: {}", self.kind, session_id, name);
                let incorrect_names = self
                    .sessions
                    .with(session_id, |s| s.incorrect_names.clone())
                    .await?;
                Ok(Turn {
                    session_id,
                    guess: None,
                    is_correct: Some(true),
                    game_over: true,
                    message: Some(format!("Congratulations! I guessed correctly: {}", name)),
                    incorrect_names,
                })
            }
            Vote::Retry {
                context,
                exclusions,
                seen,
            } => {
                debug!(
                    "{} session {} excluding {:?}",
                    self.kind, session_id, exclusions
                );
                // generation runs without holding the session lock
                let guess = self.make_guess(&context, &exclusions).await;
                let incorrect_names = self
                    .sessions
                    .with(session_id, |s| {
                        // the player may have voted again while we were generating
                        if s.game_over {
                            return Err(GameError::SessionFinished(session_id));
                        }
                        if s.guesses.len() != seen {
                            return Err(GameError::StaleFeedback(session_id));
                        }
                        s.guesses.push(GuessRecord {
                            guess: guess.clone(),
                            is_correct: None,
                        });
                        Ok(s.incorrect_names.clone())
                    })
                    .await??;

                Ok(Turn {
                    session_id,
                    guess: Some(guess),
                    is_correct: None,
                    game_over: false,
                    message: None,
                    incorrect_names,
                })
            }
        }
    }

    pub async fn status(&self, session_id: SessionId) -> GameResult<SessionSnapshot> {
        self.sessions
            .with(session_id, |s| SessionSnapshot {
                session_id,
                user_input: s.user_input.clone(),
                guesses: s.guesses.clone(),
                incorrect_names: s.incorrect_names.clone(),
                total_guesses: s.guesses.len(),
                game_over: s.game_over,
            })
            .await
    }

    /// Forget a session.
    pub async fn end(&self, session_id: SessionId) -> GameResult<()> {
        self.sessions
            .remove(session_id)
            .await
            .map(|_| ())
            .ok_or(GameError::UnknownSession(session_id))
    }

    /// Generate, parse and enrich one guess. Failures come back as a
    /// placeholder guess rather than an error.
    pub async fn make_guess(&self, context: &str, exclusions: &[String]) -> Guess {
        let prompt = guess_prompt(self.kind, context, exclusions);

        let raw = match self.llm.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("{} generation failed: {:#}", self.kind, e);
                return Guess::placeholder(CALL_FAILED_NAME, "Error making guess", format!("{:#}", e));
            }
        };
        debug!("Raw {} response: {}", self.kind, raw);

        let parsed = parse_json_object(&raw).and_then(|data| Guess::from_model(self.kind, data));
        let mut guess = match parsed {
            Ok(guess) => guess,
            Err(e) => {
                warn!("Could not parse {} response: {:#}", self.kind, e);
                return Guess::placeholder(
                    PARSE_FAILED_NAME,
                    "Error parsing AI response",
                    format!("{:#}", e),
                );
            }
        };

        self.enricher.enrich(self.kind, &mut guess).await;
        guess
    }
}

fn record_vote(s: &mut Session, session_id: SessionId, correct: bool) -> GameResult<Vote> {
    if s.game_over {
        return Err(GameError::SessionFinished(session_id));
    }

    let last_name = s.guesses.last_mut().map(|last| {
        last.is_correct = Some(correct);
        (last.guess.name.clone(), last.guess.is_placeholder())
    });

    if correct {
        s.game_over = true;
        return Ok(Vote::Won(last_name.map(|(name, _)| name).unwrap_or_default()));
    }

    if let Some((name, false)) = last_name {
        if !s.incorrect_names.contains(&name) {
            s.incorrect_names.push(name);
        }
    }

    let mut context = s.user_input.clone();
    if !s.incorrect_names.is_empty() {
        context.push_str(&format!(
            " (Previous incorrect guesses: {})",
            s.incorrect_names.join(", ")
        ));
    }

    Ok(Vote::Retry {
        context,
        exclusions: s.incorrect_names.clone(),
        seen: s.guesses.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::ScriptedLlmClient;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{Notify, Semaphore};

    fn guesser(responses: Vec<&str>) -> (Guesser, Arc<ScriptedLlmClient>) {
        let llm = Arc::new(ScriptedLlmClient::new(responses));
        let guesser = Guesser::new(GameKind::Movie, llm.clone(), Arc::new(Enricher::new()));
        (guesser, llm)
    }

    #[tokio::test]
    async fn test_start_rejects_blank_text() {
        let (g, llm) = guesser(vec![]);
        assert!(matches!(g.start("   ").await, Err(GameError::EmptyInput)));
        assert!(llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_guess_is_excluded_from_next_prompt() {
        let (g, llm) = guesser(vec![
            r#"{"name": "Jaws", "reasoning": "shark"}"#,
            r#"{"name": "The Meg", "reasoning": "bigger shark"}"#,
        ]);
        let turn = g.start("shark movie").await.unwrap();
        assert_eq!(turn.guess.unwrap().name, "Jaws");

        let next = g.feedback(turn.session_id, false).await.unwrap();
        assert_eq!(next.guess.unwrap().name, "The Meg");
        assert_eq!(next.incorrect_names, vec!["Jaws"]);

        let prompts = llm.prompts();
        assert!(!prompts[0].contains("Do NOT guess"));
        assert!(prompts[1].contains("Do NOT guess any of these movies"));
        assert!(prompts[1].contains("(Previous incorrect guesses: Jaws)"));
    }

    #[tokio::test]
    async fn test_correct_feedback_finishes_session() {
        let (g, _) = guesser(vec![r#"{"name": "Jaws", "reasoning": "shark"}"#]);
        let turn = g.start("shark movie").await.unwrap();
        let done = g.feedback(turn.session_id, true).await.unwrap();
        assert!(done.game_over);
        assert!(done.guess.is_none());
        assert_eq!(done.is_correct, Some(true));

        assert!(matches!(
            g.feedback(turn.session_id, false).await,
            Err(GameError::SessionFinished(_))
        ));
        let status = g.status(turn.session_id).await.unwrap();
        assert!(status.game_over);
        assert_eq!(status.guesses[0].is_correct, Some(true));
    }

    #[tokio::test]
    async fn test_placeholder_names_are_not_excluded() {
        let (g, llm) = guesser(vec!["not json at all", r#"{"name": "Jaws", "reasoning": "x"}"#]);
        let turn = g.start("shark movie").await.unwrap();
        let first = turn.guess.unwrap();
        assert_eq!(first.name, PARSE_FAILED_NAME);
        assert!(first.is_placeholder());

        let next = g.feedback(turn.session_id, false).await.unwrap();
        assert!(next.incorrect_names.is_empty());
        assert!(!llm.prompts()[1].contains("Do NOT guess"));
    }

    #[tokio::test]
    async fn test_call_failure_becomes_placeholder() {
        let llm = Arc::new(ScriptedLlmClient::new(Vec::<String>::new()).then_fail("connection reset"));
        let g = Guesser::new(GameKind::City, llm, Arc::new(Enricher::new()));
        let turn = g.start("river and bridges").await.unwrap();
        let guess = turn.guess.unwrap();
        assert_eq!(guess.name, CALL_FAILED_NAME);
        assert!(guess.error.unwrap().contains("connection reset"));
    }

    /// Answers the first call at once and holds every later call until a
    /// `release` permit is added.
    struct GatedLlmClient {
        responses: std::sync::Mutex<std::collections::VecDeque<&'static str>>,
        calls: AtomicUsize,
        entered: Notify,
        release: Semaphore,
    }

    #[async_trait::async_trait]
    impl LlmClient for GatedLlmClient {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
                self.entered.notify_one();
                self.release.acquire().await?.forget();
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("no responses left"))
        }
    }

    #[tokio::test]
    async fn test_win_during_pending_retry_drops_the_retry() {
        let llm = Arc::new(GatedLlmClient {
            responses: std::sync::Mutex::new(
                [
                    r#"{"name": "Jaws", "reasoning": "shark"}"#,
                    r#"{"name": "The Meg", "reasoning": "bigger shark"}"#,
                ]
                .into(),
            ),
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Semaphore::new(0),
        });
        let g = Arc::new(Guesser::new(GameKind::Movie, llm.clone(), Arc::new(Enricher::new())));
        let id = g.start("shark movie").await.unwrap().session_id;

        let retry = tokio::spawn({
            let g = g.clone();
            async move { g.feedback(id, false).await }
        });
        llm.entered.notified().await;

        let won = g.feedback(id, true).await.unwrap();
        assert!(won.game_over);

        llm.release.add_permits(1);
        assert!(matches!(
            retry.await.unwrap(),
            Err(GameError::SessionFinished(_))
        ));

        let status = g.status(id).await.unwrap();
        assert!(status.game_over);
        assert_eq!(status.total_guesses, 1);
        assert_eq!(status.guesses[0].guess.name, "Jaws");
        assert_eq!(status.guesses[0].is_correct, Some(true));
    }

    #[tokio::test]
    async fn test_second_rejection_during_pending_retry_is_stale() {
        let llm = Arc::new(GatedLlmClient {
            responses: std::sync::Mutex::new(
                [
                    r#"{"name": "Jaws", "reasoning": "shark"}"#,
                    r#"{"name": "The Meg", "reasoning": "bigger shark"}"#,
                    r#"{"name": "Sharknado", "reasoning": "tornado"}"#,
                ]
                .into(),
            ),
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Semaphore::new(0),
        });
        let g = Arc::new(Guesser::new(GameKind::Movie, llm.clone(), Arc::new(Enricher::new())));
        let id = g.start("shark movie").await.unwrap().session_id;

        let first = tokio::spawn({
            let g = g.clone();
            async move { g.feedback(id, false).await }
        });
        llm.entered.notified().await;
        let second = tokio::spawn({
            let g = g.clone();
            async move { g.feedback(id, false).await }
        });
        llm.entered.notified().await;

        llm.release.add_permits(2);
        let first = first.await.unwrap();
        let second = second.await.unwrap();

        // exactly one of the two retries lands
        let outcomes = [&first, &second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(GameError::StaleFeedback(_)))));
        assert_eq!(g.status(id).await.unwrap().total_guesses, 2);
    }

    #[tokio::test]
    async fn test_end_removes_session() {
        let (g, _) = guesser(vec![r#"{"name": "Jaws", "reasoning": "x"}"#]);
        let turn = g.start("shark").await.unwrap();
        g.end(turn.session_id).await.unwrap();
        assert!(matches!(
            g.status(turn.session_id).await,
            Err(GameError::UnknownSession(_))
        ));
        assert!(g.end(turn.session_id).await.is_err());
    }
}
