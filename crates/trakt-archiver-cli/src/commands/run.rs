use crate::output::Output;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use media_sync_config::{Config, CredentialStore, PathManager};
use media_sync_core::{ArchiveRun, ArchiveWriter, EnrichmentResolver, RecordLabels, RemovalOutcome, RunReport, RunStatus};
use media_sync_sources::{HttpClient, NotionClient, OmdbClient, RetryPolicy, TmdbClient, TraktClient};
use std::sync::Arc;
use std::time::Duration;

/// Per-invocation flags that win over config.toml
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub dry_run: bool,
    pub capacity: Option<usize>,
    pub user: Option<String>,
}

impl RunOverrides {
    pub fn apply(&self, config: &mut Config) {
        if self.dry_run {
            config.archive.dry_run = true;
        }
        if let Some(capacity) = self.capacity {
            config.archive.capacity = capacity;
        }
        if let Some(user) = &self.user {
            config.trakt.username = user.clone();
        }
    }
}

/// Config file (or defaults), then environment, then flags; validated
pub fn load_settings(overrides: &RunOverrides) -> Result<(Config, CredentialStore)> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    let mut config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config.apply_env_overrides()?;
    overrides.apply(&mut config);
    config
        .validate()
        .wrap_err_with(|| format!("Invalid configuration (config file: {})", config_file.display()))?;

    let credentials_file = path_manager.credentials_file();
    let mut creds = CredentialStore::new(credentials_file.clone());
    creds
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    let missing = creds.missing_keys();
    if !missing.is_empty() {
        return Err(eyre!(
            "Missing credentials: {}. Set them in {} or as environment variables ({}).",
            missing.join(", "),
            credentials_file.display(),
            missing.iter().map(|k| k.to_uppercase()).collect::<Vec<_>>().join(", ")
        ));
    }

    Ok((config, creds))
}

fn secret(value: Option<String>, key: &str) -> Result<String> {
    value.ok_or_else(|| eyre!("Missing credential: {}", key))
}

/// Wire the shared HTTP client and every remote collaborator into a run
pub fn build_run(config: &Config, creds: &CredentialStore) -> Result<ArchiveRun> {
    use media_sync_config::credentials::{NOTION_TOKEN, OMDB_API_KEY, TMDB_API_KEY, TRAKT_ACCESS_TOKEN, TRAKT_API_KEY};

    let trakt_api_key = secret(creds.get_trakt_api_key(), TRAKT_API_KEY)?;
    let trakt_access_token = secret(creds.get_trakt_access_token(), TRAKT_ACCESS_TOKEN)?;
    let tmdb_api_key = secret(creds.get_tmdb_api_key(), TMDB_API_KEY)?;
    let omdb_api_key = secret(creds.get_omdb_api_key(), OMDB_API_KEY)?;
    let notion_token = secret(creds.get_notion_token(), NOTION_TOKEN)?;

    let policy = RetryPolicy::new(config.http.max_attempts, config.http.backoff_factor);
    let http = Arc::new(HttpClient::new(
        policy,
        Duration::from_secs(config.http.connect_timeout_secs),
        Duration::from_secs(config.http.timeout_secs),
    )?);

    let trakt = Arc::new(
        TraktClient::new(http.clone(), trakt_api_key, trakt_access_token)
            .with_base_url(&config.trakt.api_base),
    );
    let tmdb = Arc::new(TmdbClient::new(http.clone(), tmdb_api_key).with_base_url(&config.tmdb.api_base));
    let omdb = Arc::new(OmdbClient::new(http.clone(), omdb_api_key).with_base_url(&config.omdb.api_base));
    let notion = Arc::new(
        NotionClient::new(http, notion_token)
            .with_base_url(&config.notion.api_base)
            .with_version(&config.notion.version),
    );

    let resolver = EnrichmentResolver::new(tmdb, omdb).with_poster_base(&config.tmdb.image_base, &config.tmdb.poster_size);
    let labels = RecordLabels {
        status_label: config.archive.status_label.clone(),
        source_tag: config.archive.source_tag.clone(),
        ..RecordLabels::default()
    };
    let writer = ArchiveWriter::new(notion, resolver, &config.notion.database_id)
        .with_labels(labels)
        .with_timezone_name(&config.archive.timezone)?;

    Ok(ArchiveRun::new(trakt, writer, &config.trakt.username)
        .with_capacity(config.archive.capacity)
        .with_dry_run(config.archive.dry_run))
}

pub async fn run_once(overrides: RunOverrides, output: &Output) -> Result<()> {
    tracing::debug!("Run command started");

    let (config, creds) = load_settings(&overrides)?;
    let run = build_run(&config, &creds)?;

    let report = run.run().await;
    print_report(&report, output)?;

    if report.status == RunStatus::FetchFailed {
        return Err(eyre!(
            "Could not fetch the watchlist for '{}': {}",
            report.user,
            report.fetch_error.as_deref().unwrap_or("unknown error")
        ));
    }
    Ok(())
}

pub fn print_report(report: &RunReport, output: &Output) -> Result<()> {
    if !output.is_human() {
        output.json(&serde_json::to_value(report)?);
        return Ok(());
    }

    if report.status == RunStatus::FetchFailed {
        output.error("Watchlist fetch failed; nothing was archived or removed");
        return Ok(());
    }

    output.info(format!(
        "Watchlist of '{}': {} entries, capacity {}",
        report.user, report.fetched, report.capacity
    ));
    if report.overflow == 0 {
        output.success("Within capacity, nothing to archive");
        return Ok(());
    }

    let verb = if report.dry_run { "Would archive" } else { "Archiving" };
    output.info(format!("{} {} oldest entries:", verb, report.overflow));
    for title in &report.evicted {
        output.info(format!("  - {}", title));
    }

    match &report.removal {
        Some(RemovalOutcome::Removed { summary }) => output.success(format!(
            "Archived {} / {}, removed {} from Trakt ({} not found) in {} ms",
            report.archived,
            report.overflow,
            summary.deleted.total(),
            summary.not_found.total(),
            report.duration_ms
        )),
        Some(RemovalOutcome::DryRun { count }) => output.success(format!(
            "Dry run: {} archive records and a removal of {} entries were skipped",
            report.dry_run_intents, count
        )),
        Some(RemovalOutcome::Failed { reason }) => output.error(format!("Removal from Trakt failed: {}", reason)),
        Some(RemovalOutcome::Skipped) | None => {}
    }

    if report.archive_failed > 0 {
        output.warn(format!(
            "{} of {} archive writes failed; see the log for details",
            report.archive_failed, report.overflow
        ));
    }
    Ok(())
}
