use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::TallyResult;
use crate::output::OutputFormat;
use crate::tally::{CountStrategy, FrequencyGrammar};

/// How to treat invalid UTF-8 in the text and pattern sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    /// Stop with an error on the first invalid sequence
    #[default]
    FailFast,
    /// Replace invalid sequences with U+FFFD and keep going
    Lossy,
}

/// Configuration for a tally run.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.wordtally.yaml` in the current directory
/// 3. Global `$HOME/.config/wordtally/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Whitespace-separated words to count
/// text_path: "resources/text.txt"
///
/// # Whitespace-separated patterns, e.g. "ap" (quoted) or a2b2
/// patterns_path: "resources/patterns.txt"
///
/// # Where to write the table (stdout when omitted)
/// output_path: "resources/output.txt"
///
/// # Lowercase both sources before counting
/// lowercase: true
///
/// # Frequency pattern grammar (legacy, strict)
/// grammar: legacy
///
/// # Inner loop per pattern (sequential, parallel)
/// count_strategy: parallel
///
/// # Output format (tsv, json)
/// output_format: tsv
///
/// # Invalid UTF-8 handling (failfast, lossy)
/// encoding_mode: failfast
///
/// # Thread count (default: CPU cores)
/// thread_count: 4
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// Command-line arguments take precedence over config file values; see
/// [`TallyConfig::merge_with_cli`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// File holding the words to count
    pub text_path: PathBuf,

    /// File holding the raw patterns
    pub patterns_path: PathBuf,

    /// Destination for the result table; stdout when None
    pub output_path: Option<PathBuf>,

    /// Lowercase words and patterns when reading them
    pub lowercase: bool,

    /// Grammar for frequency patterns
    pub grammar: FrequencyGrammar,

    /// Sequential or chunked-parallel counting per pattern
    pub count_strategy: CountStrategy,

    /// Result table format
    pub output_format: OutputFormat,

    /// Invalid UTF-8 handling for the input files
    pub encoding_mode: EncodingMode,

    /// Number of threads to use.
    /// Defaults to number of CPU cores if not specified
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_text_path() -> PathBuf {
    PathBuf::from("text.txt")
}

fn default_patterns_path() -> PathBuf {
    PathBuf::from("patterns.txt")
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            text_path: default_text_path(),
            patterns_path: default_patterns_path(),
            output_path: None,
            lowercase: false,
            grammar: FrequencyGrammar::default(),
            count_strategy: CountStrategy::default(),
            output_format: OutputFormat::default(),
            encoding_mode: EncodingMode::default(),
            thread_count: default_thread_count(),
            log_level: default_log_level(),
        }
    }
}

/// Values given on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub text_path: Option<PathBuf>,
    pub patterns_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub lowercase: Option<bool>,
    pub grammar: Option<FrequencyGrammar>,
    pub count_strategy: Option<CountStrategy>,
    pub output_format: Option<OutputFormat>,
    pub encoding_mode: Option<EncodingMode>,
    pub thread_count: Option<NonZeroUsize>,
    pub log_level: Option<String>,
}

impl TallyConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus a specific file.
    ///
    /// The default locations are optional; an explicit `config_path` must exist.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let default_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("wordtally/config.yaml")),
            // Local config
            Some(PathBuf::from(".wordtally.yaml")),
        ];

        for path in default_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values.
    ///
    /// Every value given on the command line wins, including one equal to the
    /// built-in default.
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(text_path) = cli.text_path {
            self.text_path = text_path;
        }
        if let Some(patterns_path) = cli.patterns_path {
            self.patterns_path = patterns_path;
        }
        if cli.output_path.is_some() {
            self.output_path = cli.output_path;
        }
        if let Some(lowercase) = cli.lowercase {
            self.lowercase = lowercase;
        }
        if let Some(grammar) = cli.grammar {
            self.grammar = grammar;
        }
        if let Some(count_strategy) = cli.count_strategy {
            self.count_strategy = count_strategy;
        }
        if let Some(output_format) = cli.output_format {
            self.output_format = output_format;
        }
        if let Some(encoding_mode) = cli.encoding_mode {
            self.encoding_mode = encoding_mode;
        }
        if let Some(thread_count) = cli.thread_count {
            self.thread_count = thread_count;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        self
    }

    /// Renders the effective configuration as YAML
    pub fn to_yaml(&self) -> TallyResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
