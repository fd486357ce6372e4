use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "field-detection.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "field-detection",
    version,
    about = "Deterministic semantic classification of job-application form fields"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: field-detection.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify the fields of one or more document snapshots
    Detect {
        /// Snapshot JSON file; repeat for frames (the first is the primary context)
        #[arg(long = "snapshot", required = true, num_args = 1..)]
        snapshots: Vec<String>,

        /// Board to filter registry entries by (default: detected from the URL)
        #[arg(long)]
        board: Option<String>,

        /// Registry file (YAML or JSON) replacing the built-in registry
        #[arg(long)]
        registry: Option<String>,

        /// Output format: console, json
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Append a decision trace event to this JSONL file
        #[arg(long)]
        trace: Option<String>,
    },

    /// Print the board detected for an application URL
    Board {
        #[arg(long)]
        url: String,
    },

    /// Inspect a selector registry
    Registry {
        #[command(subcommand)]
        action: RegistryAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum RegistryAction {
    /// Load and validate a registry, printing its fingerprint
    Validate {
        #[arg(long)]
        registry: Option<String>,
    },

    /// List the entries that participate for a board, in trial order
    List {
        #[arg(long)]
        registry: Option<String>,

        #[arg(long)]
        board: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `field-detection.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub detect: DetectConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectConfig {
    #[serde(default = "default_console")]
    pub format: String,

    pub board: Option<String>,

    pub registry: Option<String>,

    pub trace: Option<String>,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            format: "console".to_string(),
            board: None,
            registry: None,
            trace: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// Serde default helpers
fn default_console() -> String { "console".to_string() }
fn default_level() -> String { "warn".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. A missing file yields defaults; a malformed
/// one is an error.
pub fn try_load_config(path: Option<&str>) -> Result<AppConfig, serde_yaml::Error> {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content),
        Err(_) => Ok(AppConfig::default()),
    }
}

/// Load config from a YAML file. Returns defaults if the file is missing or
/// malformed (malformed also warns).
pub fn load_config(path: Option<&str>) -> AppConfig {
    try_load_config(path).unwrap_or_else(|e| {
        warn!(
            path = path.unwrap_or(DEFAULT_CONFIG_PATH),
            error = %e,
            "malformed config file; using defaults"
        );
        AppConfig::default()
    })
}

/// Log level from `-v` count, falling back to the configured level.
pub fn resolve_log_level(verbose: u8, config: &AppConfig) -> String {
    match verbose {
        0 => config.log.level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Values for one `detect` run after merging CLI > config > defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectSettings {
    pub board: Option<String>,
    pub registry: Option<String>,
    pub format: OutputFormat,
    pub trace: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "console" => Some(OutputFormat::Console),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

pub fn build_detect_settings(
    board: Option<&str>,
    registry: Option<&str>,
    format: Option<&str>,
    trace: Option<&str>,
    config: &AppConfig,
) -> anyhow::Result<DetectSettings> {
    let format_name = format.unwrap_or(&config.detect.format);
    let format = OutputFormat::parse(format_name)
        .ok_or_else(|| anyhow::anyhow!("unknown output format \"{}\"", format_name))?;

    Ok(DetectSettings {
        board: board.or(config.detect.board.as_deref()).map(str::to_string),
        registry: registry
            .or(config.detect.registry.as_deref())
            .map(str::to_string),
        format,
        trace: trace.or(config.detect.trace.as_deref()).map(str::to_string),
    })
}
