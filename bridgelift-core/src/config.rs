//! bridgelift configuration.
//!
//! Read from `~/.config/bridgelift/config.toml` (platform config dir) and
//! overridden by `BRIDGELIFT_*` environment variables, e.g.
//! `BRIDGELIFT_DATA_PATH` or `BRIDGELIFT_ANNOUNCE__MINUTES_BEFORE`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use config::{Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{BridgeLiftError, BridgeLiftResult};
use crate::source::DEFAULT_URL;

static DEFAULT_DATA_PATH: &str = "~/.local/share/bridgelift/lifts.json";
static DEFAULT_TIMEZONE: &str = "Europe/London";
static DEFAULT_FETCH_TIMEOUT: &str = "30s";

/// Upper bound for minute offsets in settings (one day).
const MAX_MINUTES: i64 = 24 * 60;

fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("bridgelift").join("lifts.json"))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
}

fn default_source_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_fetch_timeout() -> String {
    DEFAULT_FETCH_TIMEOUT.to_string()
}

/// `BRIDGELIFT_` followed by the key; `__` separates nested keys.
fn env_overrides() -> Environment {
    Environment::with_prefix("BRIDGELIFT")
        .prefix_separator("_")
        .separator("__")
}

/// Top-level configuration, passed explicitly to everything that needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the lift record lives. `~` is expanded.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Page listing upcoming lifts.
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// IANA timezone the schedule is published in.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// How long a fetch may take before the cycle is abandoned (e.g. "30s").
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: String,

    #[serde(default)]
    pub calendar: CalendarSettings,

    #[serde(default)]
    pub announce: AnnounceSettings,
}

/// How lifts are rendered as calendar events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Calendar display name (X-WR-CALNAME).
    pub name: String,
    pub summary: String,
    pub location: String,
    pub duration_minutes: i64,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        CalendarSettings {
            name: "Tower Bridge Lift Times".to_string(),
            summary: "Tower Bridge Lift".to_string(),
            location: "Tower Bridge Rd, London SE1 2UP".to_string(),
            duration_minutes: 10,
        }
    }
}

/// Announcement schedule settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnounceSettings {
    /// Local time of the daily summary, "HH:MM".
    pub daily_time: String,
    /// How long before each lift its notice goes out.
    pub minutes_before: i64,
    /// Pool that two hashtags are drawn from for each post.
    pub hashtags: Vec<String>,
}

impl Default for AnnounceSettings {
    fn default() -> Self {
        AnnounceSettings {
            daily_time: "08:00".to_string(),
            minutes_before: 15,
            hashtags: [
                "#GetLifting",
                "#ItsLiftingTime",
                "#LiftingAllDay",
                "#LiftIsLife",
                "#YouOnlyLiftOnce",
                "#GottaGetLifting",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl AnnounceSettings {
    pub fn daily_time(&self) -> BridgeLiftResult<NaiveTime> {
        NaiveTime::parse_from_str(&self.daily_time, "%H:%M").map_err(|_| {
            BridgeLiftError::Config(format!(
                "Invalid announce.daily_time '{}'. Expected HH:MM",
                self.daily_time
            ))
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_path: default_data_path(),
            source_url: default_source_url(),
            timezone: default_timezone(),
            fetch_timeout: default_fetch_timeout(),
            calendar: CalendarSettings::default(),
            announce: AnnounceSettings::default(),
        }
    }
}

impl Config {
    pub fn config_path() -> BridgeLiftResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| BridgeLiftError::Config("Could not determine config directory".into()))?
            .join("bridgelift");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented-out config file
    /// on first use.
    pub fn load() -> BridgeLiftResult<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
        }

        Self::load_from(&path)
    }

    /// Load from an explicit file (which may be missing), plus environment overrides.
    pub fn load_from(path: &Path) -> BridgeLiftResult<Self> {
        Self::load_layered(path, env_overrides())
    }

    fn load_layered(path: &Path, env: Environment) -> BridgeLiftResult<Self> {
        let config: Config = config::Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(env)
            .build()
            .map_err(|e| BridgeLiftError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| BridgeLiftError::Config(e.to_string()))?;

        config.validate()?;
        tracing::debug!(path = %path.display(), data_path = %config.data_path().display(), "Loaded config");

        Ok(config)
    }

    fn validate(&self) -> BridgeLiftResult<()> {
        self.timezone()?;
        self.fetch_timeout()?;
        self.announce.daily_time()?;
        if !(1..=MAX_MINUTES).contains(&self.calendar.duration_minutes) {
            return Err(BridgeLiftError::Config(format!(
                "calendar.duration_minutes must be between 1 and {MAX_MINUTES}"
            )));
        }
        if !(0..=MAX_MINUTES).contains(&self.announce.minutes_before) {
            return Err(BridgeLiftError::Config(format!(
                "announce.minutes_before must be between 0 and {MAX_MINUTES}"
            )));
        }
        Ok(())
    }

    /// Data file path with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_path.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn timezone(&self) -> BridgeLiftResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| BridgeLiftError::Config(format!("Unknown timezone '{}'", self.timezone)))
    }

    pub fn fetch_timeout(&self) -> BridgeLiftResult<Duration> {
        humantime::parse_duration(&self.fetch_timeout).map_err(|e| {
            BridgeLiftError::Config(format!("Invalid fetch_timeout '{}': {e}", self.fetch_timeout))
        })
    }

    /// Current wall-clock time in the schedule's timezone.
    ///
    /// This is the only place the clock is read; the result is passed into
    /// reconciliation as `now`.
    pub fn now(&self) -> BridgeLiftResult<NaiveDateTime> {
        Ok(Utc::now().with_timezone(&self.timezone()?).naive_local())
    }

    /// Effective configuration (after defaults and overrides) as TOML.
    pub fn to_toml(&self) -> BridgeLiftResult<String> {
        toml::to_string_pretty(self).map_err(|e| BridgeLiftError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> BridgeLiftResult<()> {
        let contents = format!(
            "\
# bridgelift configuration

# Where the lift record is stored:
# data_path = \"{DEFAULT_DATA_PATH}\"

# Page listing upcoming lifts:
# source_url = \"{DEFAULT_URL}\"

# Timezone the schedule is published in:
# timezone = \"{DEFAULT_TIMEZONE}\"

# Give up on a fetch after:
# fetch_timeout = \"{DEFAULT_FETCH_TIMEOUT}\"

# [calendar]
# name = \"Tower Bridge Lift Times\"
# summary = \"Tower Bridge Lift\"
# location = \"Tower Bridge Rd, London SE1 2UP\"
# duration_minutes = 10

# [announce]
# daily_time = \"08:00\"
# minutes_before = 15
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BridgeLiftError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| BridgeLiftError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
