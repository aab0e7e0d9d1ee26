use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Timezone assumed when nothing is configured. The assistant talks to a
/// Brazilian audience, so wall-clock phrases default to BRT.
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub availability: AvailabilityConfig,
    #[serde(default)]
    pub calcom: CalComConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SchedulingConfig {
    pub timezone: String,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self { timezone: DEFAULT_TIMEZONE.to_string() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityProvider {
    Mock,
    CalCom,
}

impl Default for AvailabilityProvider {
    fn default() -> Self {
        AvailabilityProvider::Mock
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct AvailabilityConfig {
    #[serde(default)]
    pub provider: AvailabilityProvider,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CalComConfig {
    pub username: Option<String>,
    pub event_type_slug: Option<String>,
    pub event_type_id: Option<i64>,
    /// `cal-api-version` header for slot queries. Bookings are pinned to the
    /// one version that accepts start-only payloads and ignore this.
    pub api_version: Option<String>,
}

impl Config {
    /// Loads the config file, creating a default one on first run, then
    /// applies environment overrides on top.
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        let mut config: Config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            let default_config = Config::default();
            default_config.save()?;
            default_config
        };

        config.apply_env_overrides();
        config.scheduling.timezone = sanitize_time_zone(&config.scheduling.timezone);
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(tz) = env::var("TIMEZONE") {
            self.scheduling.timezone = tz;
        }
        if let Ok(flag) = env::var("MOCK_EXTERNALS") {
            self.availability.provider = if flag.trim().eq_ignore_ascii_case("true") {
                AvailabilityProvider::Mock
            } else {
                AvailabilityProvider::CalCom
            };
        }
        if let Ok(username) = env::var("CAL_USERNAME") {
            self.calcom.username = Some(username);
        }
        if let Ok(slug) = env::var("CAL_EVENT_TYPE_SLUG") {
            self.calcom.event_type_slug = Some(slug);
        }
        if let Ok(id) = env::var("CAL_EVENT_TYPE_ID") {
            self.calcom.event_type_id = id.parse().ok();
        }
        if let Ok(version) = env::var("CAL_API_VERSION") {
            self.calcom.api_version = Some(version);
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "agendai", "agendai")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Normalizes a timezone name for use with chrono-tz and the booking APIs.
/// Some shells export TZ-style values with a leading colon (":America/Bahia");
/// those and blank values would otherwise be rejected downstream.
pub fn sanitize_time_zone(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix(':').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        "UTC".to_string()
    } else {
        trimmed.to_string()
    }
}
