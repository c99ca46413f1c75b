use crate::ConfigError;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Host serving embedded archive replays; blocked by default
pub const DEFAULT_BLOCKED_HOST: &str = "wayback.archive-it.org";

/// Main configuration structure for Site Mapper
///
/// Every section is optional; missing sections and keys fall back to their
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    pub analysis: AnalysisConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Hosts that discovered links may be followed to (empty = unrestricted)
    #[serde(rename = "allowed-hosts")]
    pub allowed_hosts: BTreeSet<String>,

    /// Maximum number of pages to visit
    #[serde(rename = "page-limit")]
    pub page_limit: usize,

    /// Minimum time between successive page fetches (seconds)
    pub delay: f64,

    /// Total navigation attempts per page when navigation times out
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Host patterns whose requests are aborted (supports "*." wildcards)
    #[serde(rename = "blocked-hosts")]
    pub blocked_hosts: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: BTreeSet::new(),
            page_limit: 100,
            delay: 1.0,
            max_retries: 3,
            blocked_hosts: vec![DEFAULT_BLOCKED_HOST.to_string()],
        }
    }
}

impl CrawlerConfig {
    /// The inter-request delay as a duration
    ///
    /// Values that are not valid durations (rejected by validation) map to zero.
    pub fn delay_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or(Duration::ZERO)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the crawl artifacts are written to
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./results"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of DEBUG, INFO, WARNING, ERROR
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parses the configured level
    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.level.parse()
    }
}

/// Markers identifying faceted-search containers in page markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Class names that mark a faceted-search container
    #[serde(rename = "facet-classes")]
    pub facet_classes: Vec<String>,

    /// Attribute carrying a test id
    #[serde(rename = "facet-test-id-attribute")]
    pub facet_test_id_attribute: String,

    /// Substring of the test id that marks a faceted-search container
    #[serde(rename = "facet-test-id-substring")]
    pub facet_test_id_substring: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            facet_classes: vec![
                "faceted-search".to_string(),
                "filters".to_string(),
                "sorting".to_string(),
            ],
            facet_test_id_attribute: "data-testid".to_string(),
            facet_test_id_substring: "facet".to_string(),
        }
    }
}

/// Log verbosity accepted by the config file and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// The `tracing_subscriber::EnvFilter` directive for this level
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Self::Debug => "site_mapper=debug,info",
            Self::Info => "site_mapper=info,warn",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}
