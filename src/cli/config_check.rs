use anyhow::Result;
use std::env;
use std::fs;

use crate::config::Config;

struct CheckResult {
    passed: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl CheckResult {
    fn new() -> Self {
        Self {
            passed: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn pass(&mut self, msg: impl Into<String>) {
        self.passed.push(msg.into());
    }

    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }
}

pub fn run(config_path: Option<String>) -> Result<()> {
    let mut results = CheckResult::new();

    let config = match Config::load_with_path(config_path.clone()) {
        Ok(config) => {
            let source = config_path.as_deref().unwrap_or("default search path");
            results.pass(format!("Config loaded from {}", source));
            config
        }
        Err(e) => {
            // reported, not propagated, so it prints once
            results.error(format!("Failed to load config: {}", e));
            print_results(&results);
            return Ok(());
        }
    };

    check_config(&config, &mut results);
    print_results(&results);

    if !results.errors.is_empty() {
        anyhow::bail!("{} config error(s) found", results.errors.len());
    }
    Ok(())
}

fn check_config(config: &Config, results: &mut CheckResult) {
    // 1. Generation provider
    match config.llm.provider.as_str() {
        "gemini" | "openai-compatible" => results.pass(format!(
            "LLM provider: {} (model: {})",
            config.llm.provider, config.llm.model
        )),
        other => results.error(format!(
            "Unknown LLM provider '{}' (expected gemini or openai-compatible)",
            other
        )),
    }

    // 2. Generation key
    let local = config.llm.provider == "openai-compatible";
    check_api_key(config.llm.api_key_env.as_deref(), "Main LLM", local, results);

    if local && config.llm.base_url.is_none() {
        results.warn(
            "openai-compatible provider without base_url, will use default http://localhost:11434/v1",
        );
    }

    // 3. Image generation
    if config.image.enabled {
        match config.image.api_key_env.as_deref() {
            Some(env_var) => check_api_key(Some(env_var), "Image model", false, results),
            None if local => results.warn(
                "Image generation shares the openai-compatible key; set image.api_key_env for Gemini images",
            ),
            None => results.pass(format!(
                "Image model: {} (shares the main LLM key)",
                config.image.model
            )),
        }
    } else {
        results.pass("Image generation disabled");
    }

    // 4. Geocoding is optional
    if config.geocoding.enabled {
        match config.get_maps_api_key() {
            Some(_) => results.pass(format!("Geocoding: {} is set", config.geocoding.api_key_env)),
            None => results.warn(format!(
                "Geocoding: {} is not set, guesses will have no map locations",
                config.geocoding.api_key_env
            )),
        }
    } else {
        results.pass("Geocoding disabled");
    }

    // 5. Scraping
    if config.enrichment.market_data && !config.enrichment.quote_url.contains("{ticker}") {
        results.error(format!(
            "enrichment.quote_url must contain {{ticker}}: {}",
            config.enrichment.quote_url
        ));
    }
    if config.enrichment.http_timeout_secs < 3 {
        results.warn(format!(
            "HTTP timeout {}s is very short, page scrapes may fail",
            config.enrichment.http_timeout_secs
        ));
    }

    // 6. Settings directory
    match fs::create_dir_all(&config.settings.dir) {
        Ok(()) => results.pass(format!(
            "Settings directory: {}",
            config.settings.dir.display()
        )),
        Err(e) => results.error(format!(
            "Settings directory {} is not usable: {}",
            config.settings.dir.display(),
            e
        )),
    }

    // 7. Odd-situation word lists
    for (label, path) in [
        ("people", &config.odd.people_file),
        ("outfits", &config.odd.outfits_file),
        ("settings", &config.odd.settings_file),
    ] {
        if path.is_file() {
            results.pass(format!("Odd-situation {} list: {}", label, path.display()));
        } else {
            results.warn(format!(
                "Odd-situation {} list {} not found, the built-in default is used",
                label,
                path.display()
            ));
        }
    }
}

fn check_api_key(api_key_env: Option<&str>, label: &str, local: bool, results: &mut CheckResult) {
    match api_key_env {
        Some(env_var) if env_var.eq_ignore_ascii_case("none") => {
            results.pass(format!("{}: no API key needed", label));
        }
        Some(env_var) => match env::var(env_var) {
            Ok(v) if !v.trim().is_empty() => {
                results.pass(format!("{}: {} is set", label, env_var));
            }
            Ok(_) if local => results.warn(format!(
                "{}: {} is set but empty (OK for local models)",
                label, env_var
            )),
            Ok(_) => results.error(format!("{}: {} is set but empty", label, env_var)),
            Err(_) if local => results.warn(format!(
                "{}: {} is not set (OK for local models)",
                label, env_var
            )),
            Err(_) => results.error(format!("{}: {} is not set", label, env_var)),
        },
        None => results.pass(format!("{}: no API key configured", label)),
    }
}

fn print_results(results: &CheckResult) {
    println!();
    for msg in &results.passed {
        println!("  \u{2713} {}", msg);
    }
    for msg in &results.warnings {
        println!("  ! {}", msg);
    }
    for msg in &results.errors {
        println!("  \u{2717} {}", msg);
    }
    println!();
    println!(
        "{} passed, {} warnings, {} errors",
        results.passed.len(),
        results.warnings.len(),
        results.errors.len()
    );
}
