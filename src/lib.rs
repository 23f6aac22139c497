//! guesswork - LLM-backed guessing games
//!
//! Describe a famous person, city, business, invention, movie, TV show or
//! historical event and a generation model guesses it; every wrong answer is
//! excluded from the next attempt. Guesses are enriched with pictures, map
//! locations and stock quotes. Also hosts the odd-situation picture game and
//! a per-user voice settings store.

pub mod cli;
pub mod config;
pub mod enrich;
pub mod error;
pub mod games;
pub mod llm;
pub mod session;
pub mod settings;
pub mod util;
