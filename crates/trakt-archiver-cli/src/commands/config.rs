use super::prompts;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use media_sync_config::credentials::{NOTION_TOKEN, OMDB_API_KEY, REQUIRED_KEYS, TMDB_API_KEY, TRAKT_ACCESS_TOKEN, TRAKT_API_KEY};
use media_sync_config::{default_scheduler_config, Config, CredentialStore, PathManager};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output).await,
        crate::ConfigCommands::Init => init_config(output).await,
    }
}

fn section_table(title: &str, rows: Vec<(&str, String)>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn or_not_set(value: &str) -> String {
    if value.is_empty() {
        "<not set>".to_string()
    } else {
        value.to_string()
    }
}

async fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    let credentials_file = path_manager.credentials_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Showing defaults. Run 'trakt-archiver config init' to create one.");
    }

    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    let mut creds = CredentialStore::new(credentials_file.clone());
    creds
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    let secret = |key: &str| -> String {
        match creds.resolve(key) {
            Some(value) if full => value,
            Some(value) => mask_string(&value),
            None => "<not set>".to_string(),
        }
    };
    let scheduler = config.scheduler.clone().unwrap_or_else(default_scheduler_config);

    match output.format() {
        crate::output::OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            let tables = [
                section_table(
                    "Files",
                    vec![
                        ("Config File", config_file.display().to_string()),
                        ("Credentials File", credentials_file.display().to_string()),
                        ("Daemon Log", path_manager.daemon_log_file().display().to_string()),
                    ],
                ),
                section_table(
                    "Trakt",
                    vec![
                        ("Username", or_not_set(&config.trakt.username)),
                        ("API Base", config.trakt.api_base.clone()),
                        ("API Key", secret(TRAKT_API_KEY)),
                        ("Access Token", secret(TRAKT_ACCESS_TOKEN)),
                    ],
                ),
                section_table(
                    "Notion",
                    vec![
                        ("Database ID", or_not_set(&config.notion.database_id)),
                        ("API Base", config.notion.api_base.clone()),
                        ("API Version", config.notion.version.clone()),
                        ("Token", secret(NOTION_TOKEN)),
                    ],
                ),
                section_table(
                    "Enrichment",
                    vec![
                        ("TMDB API Base", config.tmdb.api_base.clone()),
                        ("TMDB Poster", format!("{}/{}", config.tmdb.image_base, config.tmdb.poster_size)),
                        ("TMDB API Key", secret(TMDB_API_KEY)),
                        ("OMDb API Base", config.omdb.api_base.clone()),
                        ("OMDb API Key", secret(OMDB_API_KEY)),
                    ],
                ),
                section_table(
                    "Archive",
                    vec![
                        ("Capacity", config.archive.capacity.to_string()),
                        (
                            "Dry Run",
                            if config.archive.dry_run { "✓".green().to_string() } else { "✗".red().to_string() },
                        ),
                        ("Time Zone", config.archive.timezone.clone()),
                        ("Status Label", config.archive.status_label.clone()),
                        ("Source Tag", config.archive.source_tag.clone()),
                    ],
                ),
                section_table(
                    "HTTP",
                    vec![
                        ("Max Attempts", config.http.max_attempts.to_string()),
                        ("Backoff Factor", config.http.backoff_factor.to_string()),
                        ("Connect Timeout", format!("{}s", config.http.connect_timeout_secs)),
                        ("Request Timeout", format!("{}s", config.http.timeout_secs)),
                    ],
                ),
                section_table(
                    "Scheduler",
                    vec![
                        ("Schedule (UTC)", scheduler.schedule.clone()),
                        (
                            "Run On Startup",
                            if scheduler.run_on_startup { "✓".green().to_string() } else { "✗".red().to_string() },
                        ),
                    ],
                ),
            ];

            for table in tables {
                println!("{}\n", table);
            }

            let missing = creds.missing_keys();
            if !missing.is_empty() {
                output.warn(format!("Missing credentials: {}", missing.join(", ")));
            }
            if !config.is_configured() {
                output.warn("Configuration is incomplete; run 'trakt-archiver config init' or fix the values above");
            }
        }
        _ => {
            let credentials: serde_json::Map<String, serde_json::Value> =
                REQUIRED_KEYS.iter().map(|key| (key.to_string(), json!(secret(*key)))).collect();

            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "credentials_file": credentials_file.display().to_string(),
                "config": config,
                "scheduler": scheduler,
                "credentials": credentials,
            }));
        }
    }

    Ok(())
}

async fn init_config(output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create config directory: {}", e))?;

    let config_file = path_manager.config_file();
    let credentials_file = path_manager.credentials_file();

    let mut config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let mut creds = CredentialStore::new(credentials_file.clone());
    creds
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    output.info("Configure the Trakt watchlist archiver.");

    config.trakt.username = prompts::prompt_string("Trakt username", Some(&config.trakt.username))?;
    config.notion.database_id = prompts::prompt_string("Notion database ID", Some(&config.notion.database_id))?;
    config.archive.capacity = prompts::prompt_positive_number("Watchlist capacity", config.archive.capacity)?;
    config.archive.timezone = prompts::prompt_string("Archive date time zone", Some(&config.archive.timezone))?;

    let secrets = [
        (TRAKT_API_KEY, "Trakt API key (client ID)"),
        (TRAKT_ACCESS_TOKEN, "Trakt access token"),
        (NOTION_TOKEN, "Notion integration token"),
        (TMDB_API_KEY, "TMDB API key"),
        (OMDB_API_KEY, "OMDb API key"),
    ];
    for (key, label) in secrets {
        let existing = creds.get(key).cloned();
        let value = prompts::prompt_secret(label, existing.as_deref())?;
        if value.is_empty() {
            creds.remove(key);
        } else {
            creds.set(key.to_string(), value);
        }
    }

    config.archive.dry_run = prompts::prompt_yes_no("Only preview runs (dry run) by default?", Some(config.archive.dry_run))?;

    if let Err(e) = config.validate() {
        output.warn(format!("Configuration is not complete yet: {}", e));
    }

    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;
    creds
        .save()
        .map_err(|e| eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;

    output.success(format!("Configuration saved to {}", config_file.display()));
    output.success(format!("Credentials saved to {}", credentials_file.display()));
    Ok(())
}

/// Keep the first and last two characters of a secret
fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return "<not set>".to_string();
    }
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
