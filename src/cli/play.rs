use anyhow::Result;
use std::io::Write;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

use super::{abbreviate_data_urls, load_config};
use crate::games::{GameHub, GameKind, Guess, Guesser};

#[derive(Debug, Clone, PartialEq)]
pub struct PlayOutcome {
    pub solved: bool,
    pub total_guesses: usize,
    pub incorrect_names: Vec<String>,
}

pub async fn run(
    game: String,
    text: Vec<String>,
    config_path: Option<String>,
    model_override: Option<String>,
    provider_override: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let kind = GameKind::from_str(&game)?;
    let config = load_config(config_path, model_override, provider_override)?;
    let hub = GameHub::from_config(&config, dry_run)?;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    let outcome = play_loop(hub.guesser(kind), &text.join(" "), stdin, &mut stdout).await?;

    info!(
        "{} game finished after {} guess(es), solved: {}",
        kind, outcome.total_guesses, outcome.solved
    );
    Ok(())
}

fn render(guess: &Guess) -> Result<String> {
    let mut value = serde_json::to_value(guess)?;
    abbreviate_data_urls(&mut value);
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Drive one session: show each guess, read `y`/`n`/`q` until the guess is
/// confirmed, the player quits, or input runs out.
pub async fn play_loop<R, W>(
    guesser: &Guesser,
    text: &str,
    input: R,
    out: &mut W,
) -> Result<PlayOutcome>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let turn = guesser.start(text).await?;
    let session_id = turn.session_id;
    let mut lines = input.lines();
    let mut pending = turn.guess;
    let mut solved = false;

    loop {
        if let Some(guess) = pending.take() {
            writeln!(out, "{}", render(&guess)?)?;
        }
        write!(out, "Is this correct? [y/n/q] ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => {
                let done = guesser.feedback(session_id, true).await?;
                writeln!(out, "{}", done.message.unwrap_or_default())?;
                solved = true;
                break;
            }
            "n" | "no" => {
                let next = guesser.feedback(session_id, false).await?;
                pending = next.guess;
            }
            "q" | "quit" => break,
            _ => writeln!(out, "Please answer y, n or q.")?,
        }
    }

    let status = guesser.status(session_id).await?;
    guesser.end(session_id).await?;
    Ok(PlayOutcome {
        solved,
        total_guesses: status.total_guesses,
        incorrect_names: status.incorrect_names,
    })
}
