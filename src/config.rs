//! Command line, optional TOML file, and the resolved runtime settings.
//!
//! Precedence is flag/environment first, then the config file, then the
//! built-in defaults.

use crate::error::{DashboardError, Result};
use crate::localtime::{DEFAULT_TIMEZONE, LocalClock};
use crate::palette::Theme;
use crate::probe::{DEFAULT_PROBE_INTERVAL, DEFAULT_PROBE_TIMEOUT, ProbeTarget, default_probes};
use crate::schedule::DEFAULT_REFRESH_INTERVAL;
use crate::sources::github::{
    COMMITS_PER_BRANCH, FeedTarget, GITHUB_API_BASE_URL, default_targets,
};
use crate::sources::log_source::{DEFAULT_LOG_SOURCE, LogSource};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const LOG_FILE_NAME: &str = "epochwatch.log";

#[derive(Debug, Parser)]
#[command(
    name = "epochwatch",
    version,
    about = "Epoch server status and commit activity dashboard"
)]
pub struct Cli {
    /// TOML file with feeds, probed services and dashboard overrides
    #[arg(long, short = 'c', global = true, env = "EPOCHWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive terminal dashboard (default)
    Dashboard(DashboardArgs),

    /// Render the dashboard once as a static HTML page
    Snapshot {
        #[command(flatten)]
        dashboard: DashboardArgs,

        /// Write the page here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Check the configured services and append rows to the status log
    Probe(ProbeArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct DashboardArgs {
    /// Status log location, an http(s) URL or a file path
    #[arg(long, env = "EPOCHWATCH_LOG_SOURCE")]
    pub log_source: Option<String>,

    /// Seconds between refreshes of both views
    #[arg(long, env = "EPOCHWATCH_REFRESH_SECS")]
    pub refresh_secs: Option<u64>,

    /// IANA zone used for every displayed timestamp
    #[arg(long, env = "EPOCHWATCH_TIMEZONE")]
    pub timezone: Option<String>,

    #[arg(long, value_enum, env = "EPOCHWATCH_THEME")]
    pub theme: Option<Theme>,

    /// GitHub REST API base URL
    #[arg(long, env = "EPOCHWATCH_GITHUB_API")]
    pub github_api: Option<String>,

    /// Where the dashboard writes its own diagnostics
    #[arg(long, env = "EPOCHWATCH_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct ProbeArgs {
    /// Run a single pass, log every service and exit
    #[arg(long)]
    pub once: bool,

    /// Markdown log to append to
    #[arg(long, short = 'o', default_value = DEFAULT_LOG_SOURCE)]
    pub output: PathBuf,

    #[arg(long)]
    pub interval_secs: Option<u64>,

    #[arg(long)]
    pub timeout_millis: Option<u64>,

    /// Skip desktop notifications on start and on status changes
    #[arg(long)]
    pub no_notify: bool,
}

impl Cli {
    pub fn load_file(&self) -> Result<FileConfig> {
        match &self.config {
            Some(path) => FileConfig::load(path),
            None => Ok(FileConfig::default()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub dashboard: DashboardFile,
    pub probe: ProbeFile,
    pub feeds: Option<Vec<FeedTarget>>,
    pub services: Option<Vec<ProbeTarget>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardFile {
    pub log_source: Option<String>,
    pub refresh_secs: Option<u64>,
    pub timezone: Option<String>,
    pub theme: Option<Theme>,
    pub github_api: Option<String>,
    pub commits_per_branch: Option<u8>,
    pub http_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProbeFile {
    pub interval_secs: Option<u64>,
    pub timeout_millis: Option<u64>,
    pub notify: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| DashboardError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DashboardError::Config(e.to_string()))
    }
}

/// Resolved settings for the dashboard and the snapshot writer
#[derive(Debug, Clone)]
pub struct Settings {
    pub log_source: LogSource,
    pub refresh_interval: Duration,
    pub clock: LocalClock,
    pub theme: Theme,
    pub github_api: String,
    pub commits_per_branch: u8,
    pub http_timeout: Duration,
    pub feeds: Vec<FeedTarget>,
    pub log_file: PathBuf,
}

impl Settings {
    pub fn resolve(args: &DashboardArgs, file: &FileConfig) -> Result<Self> {
        let d = &file.dashboard;

        let log_source = args
            .log_source
            .as_deref()
            .or(d.log_source.as_deref())
            .unwrap_or(DEFAULT_LOG_SOURCE);
        let timezone = args
            .timezone
            .as_deref()
            .or(d.timezone.as_deref())
            .unwrap_or(DEFAULT_TIMEZONE);

        let settings = Self {
            log_source: LogSource::parse(log_source),
            refresh_interval: args
                .refresh_secs
                .or(d.refresh_secs)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REFRESH_INTERVAL),
            clock: LocalClock::from_name(timezone)?,
            theme: args.theme.or(d.theme).unwrap_or_default(),
            github_api: args
                .github_api
                .clone()
                .or_else(|| d.github_api.clone())
                .unwrap_or_else(|| GITHUB_API_BASE_URL.to_string()),
            commits_per_branch: d.commits_per_branch.unwrap_or(COMMITS_PER_BRANCH),
            http_timeout: d
                .http_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_HTTP_TIMEOUT),
            feeds: file.feeds.clone().unwrap_or_else(default_targets),
            log_file: args
                .log_file
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join(LOG_FILE_NAME)),
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval.is_zero() {
            return Err(DashboardError::Config(
                "refresh interval must be greater than 0".to_string(),
            ));
        }

        if self.commits_per_branch == 0 || self.commits_per_branch > 100 {
            return Err(DashboardError::Config(
                "commits_per_branch must be between 1 and 100".to_string(),
            ));
        }

        if let Some(feed) = self
            .feeds
            .iter()
            .find(|f| f.repo.is_empty() || f.branch.is_empty())
        {
            return Err(DashboardError::Config(format!(
                "feed '{}' needs both repo and branch",
                feed.label
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub once: bool,
    pub output: PathBuf,
    pub interval: Duration,
    pub timeout: Duration,
    pub targets: Vec<ProbeTarget>,
    pub notify: bool,
}

impl ProbeSettings {
    pub fn resolve(args: &ProbeArgs, file: &FileConfig) -> Result<Self> {
        let settings = Self {
            once: args.once,
            output: args.output.clone(),
            interval: args
                .interval_secs
                .or(file.probe.interval_secs)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_PROBE_INTERVAL),
            timeout: args
                .timeout_millis
                .or(file.probe.timeout_millis)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_PROBE_TIMEOUT),
            targets: file.services.clone().unwrap_or_else(default_probes),
            notify: !args.no_notify && file.probe.notify.unwrap_or(true),
        };

        if settings.interval.is_zero() {
            return Err(DashboardError::Config(
                "probe interval must be greater than 0".to_string(),
            ));
        }

        if settings.targets.is_empty() {
            return Err(DashboardError::Config(
                "at least one service must be configured".to_string(),
            ));
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = r#"
[dashboard]
log_source = "https://status.example.org/epoch_dashboard_log.md"
refresh_secs = 60
theme = "light"
timezone = "UTC"

[probe]
interval_secs = 30

[[feeds]]
repo = "Project-Epoch/TrinityCore"
branch = "main"
label = "main"

[[services]]
name = "Website"
host = "127.0.0.1"
port = 8080
"#;

    #[test]
    fn defaults_match_the_epoch_setup() {
        let settings =
            Settings::resolve(&DashboardArgs::default(), &FileConfig::default()).unwrap();
        assert_eq!(
            settings.log_source,
            LogSource::File(PathBuf::from("epoch_dashboard_log.md"))
        );
        assert_eq!(settings.refresh_interval, Duration::from_secs(300));
        assert_eq!(settings.clock, LocalClock::default());
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.github_api, "https://api.github.com");
        assert_eq!(settings.commits_per_branch, 3);
        let labels: Vec<&str> = settings.feeds.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, ["only-fixes", "epoch-core"]);
    }

    #[test]
    fn file_values_apply() {
        let file = FileConfig::from_toml_str(FILE).unwrap();
        let settings = Settings::resolve(&DashboardArgs::default(), &file).unwrap();
        assert!(matches!(settings.log_source, LogSource::Http(_)));
        assert_eq!(settings.refresh_interval, Duration::from_secs(60));
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.feeds.len(), 1);
    }

    #[test]
    fn flags_override_file() {
        let file = FileConfig::from_toml_str(FILE).unwrap();
        let args = DashboardArgs {
            refresh_secs: Some(5),
            theme: Some(Theme::Dark),
            ..Default::default()
        };
        let settings = Settings::resolve(&args, &file).unwrap();
        assert_eq!(settings.refresh_interval, Duration::from_secs(5));
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn zero_refresh_is_rejected() {
        let args = DashboardArgs {
            refresh_secs: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            Settings::resolve(&args, &FileConfig::default()),
            Err(DashboardError::Config(_))
        ));
    }

    #[test]
    fn bad_timezone_is_rejected() {
        let args = DashboardArgs {
            timezone: Some("Nowhere/Land".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Settings::resolve(&args, &FileConfig::default()),
            Err(DashboardError::Timezone(_))
        ));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        assert!(matches!(
            FileConfig::from_toml_str("[dashboard\nrefresh_secs = "),
            Err(DashboardError::Config(_))
        ));
    }

    #[test]
    fn probe_settings_use_file_services() {
        let file = FileConfig::from_toml_str(FILE).unwrap();
        let args = ProbeArgs {
            once: true,
            output: PathBuf::from("out.md"),
            interval_secs: None,
            timeout_millis: Some(250),
            no_notify: false,
        };
        let settings = ProbeSettings::resolve(&args, &file).unwrap();
        assert!(settings.notify);
        assert_eq!(settings.interval, Duration::from_secs(30));
        assert_eq!(settings.timeout, Duration::from_millis(250));
        assert_eq!(settings.targets, vec![ProbeTarget::new("Website", "127.0.0.1", 8080)]);
    }

    #[test]
    fn notifications_can_be_switched_off() {
        let file = FileConfig::from_toml_str("[probe]\nnotify = false\n").unwrap();
        let cli = Cli::try_parse_from(["epochwatch", "probe"]).unwrap();
        let Some(Command::Probe(args)) = cli.command else {
            panic!("expected probe");
        };
        assert!(!ProbeSettings::resolve(&args, &file).unwrap().notify);

        let cli = Cli::try_parse_from(["epochwatch", "probe", "--no-notify"]).unwrap();
        let Some(Command::Probe(args)) = cli.command else {
            panic!("expected probe");
        };
        assert!(!ProbeSettings::resolve(&args, &FileConfig::default()).unwrap().notify);
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["epochwatch", "probe", "--once", "-o", "x.md"]).unwrap();
        match cli.command {
            Some(Command::Probe(args)) => {
                assert!(args.once);
                assert!(!args.no_notify);
                assert_eq!(args.output, PathBuf::from("x.md"));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["epochwatch"]).unwrap();
        assert!(cli.command.is_none());
    }
}
