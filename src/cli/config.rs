use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "field-autofill",
    version,
    about = "Detect form fields in a document snapshot and write suggested values into them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: field-autofill.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a document snapshot and print the detected field batch
    Detect {
        /// Document snapshot (JSON)
        #[arg(long)]
        document: String,

        /// Write the batch here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Apply suggestions to a document snapshot
    Apply {
        /// Document snapshot (JSON)
        #[arg(long)]
        document: String,

        /// Suggestions file (JSON array)
        #[arg(long)]
        suggestions: String,

        /// Write the filled document snapshot here
        #[arg(short, long)]
        output: Option<String>,

        /// Append one JSON line per applied suggestion to this file
        #[arg(long)]
        trace: Option<String>,

        /// Do not keep unresolved suggestions as pending
        #[arg(long, default_value_t = false)]
        no_retry: bool,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `field-autofill.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub fill: FillConfig,
}

/// Host/path signature of the question-form page variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionFormSignature {
    #[serde(default = "default_question_host")]
    pub host_contains: String,
    #[serde(default = "default_question_path")]
    pub path_contains: String,
}

impl Default for QuestionFormSignature {
    fn default() -> Self {
        Self {
            host_contains: default_question_host(),
            path_contains: default_question_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Add controls must be strictly closer than this (layout units).
    #[serde(default = "default_proximity")]
    pub proximity_threshold: f64,

    #[serde(default = "default_add_vocabulary")]
    pub add_vocabulary: Vec<String>,

    /// Case-insensitive regular expressions matched against trigger text.
    #[serde(default = "default_trigger_patterns")]
    pub trigger_patterns: Vec<String>,

    #[serde(default)]
    pub question_form: QuestionFormSignature,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: default_proximity(),
            add_vocabulary: default_add_vocabulary(),
            trigger_patterns: default_trigger_patterns(),
            question_form: QuestionFormSignature::default(),
        }
    }
}

/// Settle pauses, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
    #[serde(default = "default_focus")]
    pub focus_ms: u64,
    #[serde(default = "default_component_focus")]
    pub component_focus_ms: u64,
    #[serde(default = "default_value_settle")]
    pub value_settle_ms: u64,
    #[serde(default = "default_add_commit")]
    pub add_commit_ms: u64,
    #[serde(default = "default_enter_commit")]
    pub enter_commit_ms: u64,
    #[serde(default = "default_scroll")]
    pub scroll_ms: u64,
    #[serde(default = "default_trigger_reveal")]
    pub trigger_reveal_ms: u64,
    #[serde(default = "default_trigger_retry")]
    pub trigger_retry_ms: u64,
    #[serde(default = "default_choice")]
    pub choice_ms: u64,
    #[serde(default = "default_item")]
    pub item_ms: u64,
    #[serde(default = "default_highlight")]
    pub highlight_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            focus_ms: default_focus(),
            component_focus_ms: default_component_focus(),
            value_settle_ms: default_value_settle(),
            add_commit_ms: default_add_commit(),
            enter_commit_ms: default_enter_commit(),
            scroll_ms: default_scroll(),
            trigger_reveal_ms: default_trigger_reveal(),
            trigger_retry_ms: default_trigger_retry(),
            choice_ms: default_choice(),
            item_ms: default_item(),
            highlight_ms: default_highlight(),
        }
    }
}

impl TimingConfig {
    pub fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillConfig {
    #[serde(default = "default_trigger_attempts")]
    pub trigger_attempts: u32,

    /// Keep unresolved suggestions as pending until their field appears.
    #[serde(default = "default_true")]
    pub retry_on_failure: bool,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            trigger_attempts: default_trigger_attempts(),
            retry_on_failure: true,
        }
    }
}

// Serde default helpers
fn default_question_host() -> String { "docs.google.com".to_string() }
fn default_question_path() -> String { "/forms/".to_string() }
fn default_proximity() -> f64 { 200.0 }
fn default_add_vocabulary() -> Vec<String> {
    ["add", "+", "add more", "insert"].iter().map(|s| s.to_string()).collect()
}
fn default_trigger_patterns() -> Vec<String> {
    [r"\+\s*add", r"add\s+\w+", r"new\s+\w+", r"more\s+\w+", "additional", "another"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_debounce() -> u64 { 500 }
fn default_focus() -> u64 { 50 }
fn default_component_focus() -> u64 { 100 }
fn default_value_settle() -> u64 { 150 }
fn default_add_commit() -> u64 { 400 }
fn default_enter_commit() -> u64 { 300 }
fn default_scroll() -> u64 { 200 }
fn default_trigger_reveal() -> u64 { 800 }
fn default_trigger_retry() -> u64 { 500 }
fn default_choice() -> u64 { 200 }
fn default_item() -> u64 { 100 }
fn default_highlight() -> u64 { 2000 }
fn default_trigger_attempts() -> u32 { 3 }
fn default_true() -> bool { true }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("field-autofill.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = config_path, error = %e, "malformed config, using defaults");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}
