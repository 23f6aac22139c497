use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

use super::load_config;
use crate::enrich::imagegen::decode_data_url;
use crate::enrich::Enricher;
use crate::games::OddGame;
use crate::session::SessionId;

pub async fn run(
    save: Option<PathBuf>,
    config_path: Option<String>,
    model_override: Option<String>,
    provider_override: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let config = load_config(config_path, model_override, provider_override)?;
    let enricher = Enricher::from_config(&config, dry_run)?;
    let game = OddGame::from_config(&config.odd, enricher.image_generator());

    let round = game.start().await;
    let mut stdout = std::io::stdout();

    match (&save, round.image_url.starts_with("data:")) {
        (Some(path), true) => {
            let (mime, bytes) = decode_data_url(&round.image_url)?;
            fs::write(path, &bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            writeln!(stdout, "Saved {} picture to {}", mime, path.display())?;
        }
        _ => writeln!(stdout, "Picture: {}", round.image_url)?,
    }

    let stdin = BufReader::new(tokio::io::stdin());
    guess_loop(&game, round.session_id, stdin, &mut stdout).await?;
    game.end(round.session_id).await?;
    Ok(())
}

/// Read guesses until one matches, the player types `reveal` or `q`, or
/// input runs out.
pub async fn guess_loop<R, W>(
    game: &OddGame,
    session_id: SessionId,
    input: R,
    out: &mut W,
) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(out, "Who is this? (or 'reveal', 'q') ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            return Ok(false);
        };
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => continue,
            "q" | "quit" => return Ok(false),
            "reveal" => {
                let reveal = game.reveal(session_id).await?;
                writeln!(out, "It was {}.", reveal.full_situation)?;
                return Ok(false);
            }
            _ => {}
        }

        let verdict = game.guess(session_id, line).await?;
        if verdict.correct {
            let reveal = game.reveal(session_id).await?;
            writeln!(
                out,
                "Correct after {} guess(es)! {}.",
                verdict.total_guesses, reveal.full_situation
            )?;
            info!("Odd-situation session {} solved", session_id);
            return Ok(true);
        }

        let status = game.status(session_id).await?;
        writeln!(
            out,
            "Not quite. {} guess(es) so far{}",
            verdict.total_guesses,
            if status.can_reveal {
                "; type 'reveal' to see the answer."
            } else {
                "."
            }
        )?;
    }
}
