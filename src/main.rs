use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use guesswork::cli;

#[derive(Parser)]
#[command(name = "guesswork", version)]
#[command(about = "Guessing games played against a generation model", long_about = None)]
struct Cli {
    /// Path to config file (defaults to ./guesswork.toml or ~/.config/guesswork/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Override LLM model (e.g., "gemini-2.5-flash")
    #[arg(long, global = true)]
    model: Option<String>,

    /// Override LLM provider (gemini, openai-compatible)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Use offline mock clients instead of network services
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe something and let the model guess what it is
    Play {
        /// person, city, business, invention, movie, tvshow or event
        game: String,

        /// Description of the thing to guess
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Name the famous person in a generated odd-situation picture
    Odd {
        /// Write the generated picture to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Manage per-user voice settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Check configuration and API keys
    Config,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print a user's settings
    Show {
        #[arg(long)]
        user: String,
    },
    /// Choose a text-to-speech voice
    SetVoice {
        #[arg(long)]
        user: String,
        voice: String,
    },
    /// List the available voices
    Voices,
    /// Delete a user's saved settings
    Reset {
        #[arg(long)]
        user: String,
    },
    /// Mint a new user id
    NewUser,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Play { game, text } => {
            cli::play::run(game, text, cli.config, cli.model, cli.provider, cli.dry_run).await?;
        }
        Commands::Odd { save } => {
            cli::odd::run(save, cli.config, cli.model, cli.provider, cli.dry_run).await?;
        }
        Commands::Settings { action } => {
            let config = cli::load_config(cli.config, cli.model, cli.provider)?;
            match action {
                SettingsAction::Show { user } => cli::settings::show(&config, &user, &mut stdout)?,
                SettingsAction::SetVoice { user, voice } => {
                    cli::settings::set_voice(&config, &user, &voice, &mut stdout)?
                }
                SettingsAction::Voices => cli::settings::voices(&mut stdout)?,
                SettingsAction::Reset { user } => cli::settings::reset(&config, &user, &mut stdout)?,
                SettingsAction::NewUser => cli::settings::new_user(&mut stdout)?,
            }
        }
        Commands::Config => cli::config_check::run(cli.config)?,
    }

    Ok(())
}
