mod api;
mod defaults;
mod session;
mod validation;

use crate::cli::Args;
use crate::error::{Result, StockError};
use crate::guard::{
    GuardConfig, DEFAULT_CHECK_INTERVAL_MS, DEFAULT_RENEWAL_TIMEOUT_SECS,
    DEFAULT_WARNING_THRESHOLD_SECS,
};
use crate::session::FilesystemTokenStore;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub use api::ApiConfig;
pub use defaults::DEFAULT_API_BASE_URL;
pub use session::{LoggingConfig, SessionConfig};
pub use validation::{expand_with, parse_flag};

/// Deployment mode. Development sessions time out sooner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl Mode {
    pub fn default_idle_timeout(self) -> u64 {
        match self {
            Mode::Development => defaults::default_idle_timeout_development(),
            Mode::Production => defaults::default_idle_timeout_production(),
        }
    }
}

impl FromStr for Mode {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            other => Err(StockError::Config(format!(
                "unknown mode '{}', expected development or production",
                other
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Development => f.write_str("development"),
            Mode::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub mode: Mode,
    pub guard: GuardConfig,
    pub token_file: PathBuf,
    pub verbose: bool,
    pub log_level: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let file_config = FileConfig::load()?;
        Self::from_sources(args, &file_config, |name| env::var(name).ok())
    }

    /// Resolve every setting: CLI args > environment > config file > default.
    pub fn from_sources<F>(args: &Args, file: &FileConfig, env_lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expand = |value: String| expand_with(&value, &env_lookup);

        let api_base_url = args
            .api_url
            .clone()
            .or_else(|| env_lookup("STOCKCTL_API_URL"))
            .or_else(|| file.api.base_url.clone())
            .map(expand)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let request_timeout = Duration::from_secs(
            file.api
                .request_timeout
                .unwrap_or_else(defaults::default_request_timeout),
        );

        let mode = match env_lookup("STOCKCTL_ENV").or_else(|| file.session.mode.clone()) {
            Some(raw) => raw.parse()?,
            None => Mode::default(),
        };

        let idle_timeout = args
            .idle_timeout
            .or(parse_secs(&env_lookup, "STOCKCTL_IDLE_TIMEOUT")?)
            .or(file.session.idle_timeout)
            .unwrap_or_else(|| mode.default_idle_timeout());

        let warning_threshold = args
            .warning_threshold
            .or(parse_secs(&env_lookup, "STOCKCTL_WARNING_THRESHOLD")?)
            .or(file.session.warning_threshold)
            .unwrap_or(DEFAULT_WARNING_THRESHOLD_SECS);

        let renewal_timeout = parse_secs(&env_lookup, "STOCKCTL_RENEWAL_TIMEOUT")?
            .or(file.session.renewal_timeout)
            .unwrap_or(DEFAULT_RENEWAL_TIMEOUT_SECS);

        let check_interval_ms = file
            .session
            .check_interval_ms
            .unwrap_or(DEFAULT_CHECK_INTERVAL_MS);

        let guard = GuardConfig::new(
            Duration::from_secs(idle_timeout),
            Duration::from_secs(warning_threshold),
        )
        .with_check_interval(Duration::from_millis(check_interval_ms))
        .with_renewal_timeout(Duration::from_secs(renewal_timeout));
        guard.validate()?;

        let token_file = match args
            .token_file
            .clone()
            .or_else(|| env_lookup("STOCKCTL_TOKEN_FILE").map(PathBuf::from))
            .or_else(|| file.session.token_file.clone().map(|p| PathBuf::from(expand(p))))
        {
            Some(path) => path,
            None => FilesystemTokenStore::default_path()?,
        };

        let verbose = args.verbose
            || env_lookup("STOCKCTL_VERBOSE")
                .and_then(|v| parse_flag(&v))
                .or(file.logging.verbose)
                .unwrap_or(false);

        let log_level = file
            .logging
            .level
            .clone()
            .unwrap_or_else(defaults::default_log_level);

        Ok(Config {
            api_base_url,
            request_timeout,
            mode,
            guard,
            token_file,
            verbose,
            log_level,
        })
    }
}

fn parse_secs<F>(env_lookup: &F, name: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match env_lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| StockError::Config(format!("{} must be a number of seconds, got '{}'", name, raw))),
        None => Ok(None),
    }
}

impl FileConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(FileConfig::default())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            StockError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );

        let config = if is_yaml {
            serde_yaml::from_str(&contents).map_err(|e| {
                StockError::Config(format!("Failed to parse YAML config file {}: {}", path.display(), e))
            })?
        } else {
            serde_json::from_str(&contents).map_err(|e| {
                StockError::Config(format!("Failed to parse JSON config file {}: {}", path.display(), e))
            })?
        };

        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            // 1. Current directory (local override)
            PathBuf::from(".stockctl.yaml"),
            PathBuf::from(".stockctl.yml"),
            PathBuf::from(".stockctl.json"),
        ];

        // 2. User's config directory
        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("stockctl");
            paths.push(config_dir.join("stockctl.yaml"));
            paths.push(config_dir.join("stockctl.yml"));
            paths.push(config_dir.join("stockctl.json"));
        }

        paths
    }
}
