use anyhow::Result;
use std::io::Write;

use crate::config::Config;
use crate::settings::{new_user_id, SettingsStore, Voice};

fn open_store(config: &Config) -> Result<SettingsStore> {
    Ok(SettingsStore::new(&config.settings.dir)?)
}

pub fn show<W: Write>(config: &Config, user: &str, out: &mut W) -> Result<()> {
    let settings = open_store(config)?.load(user)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&settings)?)?;
    Ok(())
}

pub fn set_voice<W: Write>(config: &Config, user: &str, voice: &str, out: &mut W) -> Result<()> {
    let settings = open_store(config)?.update_voice(user, voice)?;
    writeln!(out, "Voice for {} set to {}", user, settings.voice)?;
    Ok(())
}

pub fn voices<W: Write>(out: &mut W) -> Result<()> {
    for voice in Voice::ALL {
        let marker = if voice == Voice::default() { " (default)" } else { "" };
        writeln!(out, "{}{}", voice, marker)?;
    }
    Ok(())
}

pub fn reset<W: Write>(config: &Config, user: &str, out: &mut W) -> Result<()> {
    if open_store(config)?.delete(user)? {
        writeln!(out, "Settings for {} removed", user)?;
    } else {
        writeln!(out, "No saved settings for {}", user)?;
    }
    Ok(())
}

pub fn new_user<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "{}", new_user_id())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.settings.dir = dir.to_path_buf();
        config
    }

    #[test]
    fn test_set_show_reset() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let user = new_user_id();
        let mut out = Vec::new();

        set_voice(&config, &user, "Kore", &mut out).unwrap();
        show(&config, &user, &mut out).unwrap();
        reset(&config, &user, &mut out).unwrap();
        reset(&config, &user, &mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("set to Kore"));
        assert!(printed.contains("\"voice\": \"Kore\""));
        assert!(printed.contains("removed"));
        assert!(printed.contains("No saved settings"));
    }

    #[test]
    fn test_invalid_voice_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let err = set_voice(&config, &new_user_id(), "HAL", &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("invalid voice selection: HAL"));
    }

    #[test]
    fn test_voices_marks_default() {
        let mut out = Vec::new();
        voices(&mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.lines().count(), 30);
        assert!(printed.contains("Zephyr (default)"));
    }
}
