use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::{io, num::NonZeroUsize, path::PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wordtally::{
    config::{CliOverrides, EncodingMode, TallyConfig},
    output::{write_table, write_table_to_file, OutputFormat},
    results::TallyOutput,
    tally::{parse_with, CountStrategy, FrequencyGrammar, Pattern},
    run_config, TallyError,
};

type Result<T> = std::result::Result<T, TallyError>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GrammarArg {
    Legacy,
    Strict,
}

impl From<GrammarArg> for FrequencyGrammar {
    fn from(arg: GrammarArg) -> Self {
        match arg {
            GrammarArg::Legacy => FrequencyGrammar::Legacy,
            GrammarArg::Strict => FrequencyGrammar::Strict,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Sequential,
    Parallel,
}

impl From<StrategyArg> for CountStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Sequential => CountStrategy::Sequential,
            StrategyArg::Parallel => CountStrategy::Parallel,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Tsv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Tsv => OutputFormat::Tsv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    Failfast,
    Lossy,
}

impl From<EncodingArg> for EncodingMode {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Failfast => EncodingMode::FailFast,
            EncodingArg::Lossy => EncodingMode::Lossy,
        }
    }
}

#[derive(Parser)]
struct CliCountConfig {
    /// File with the words to count
    #[arg(short = 't', long = "text")]
    text: Option<PathBuf>,

    /// File with the patterns, e.g. "ap" (quoted substring) or a2b2 (letter counts)
    #[arg(short = 'p', long = "patterns")]
    patterns: Option<PathBuf>,

    /// Write the table here instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Lowercase words and patterns before counting
    #[arg(short = 'l', long, overrides_with = "no_lowercase")]
    lowercase: bool,

    /// Keep words and patterns as written, even if the config lowercases them
    #[arg(long, overrides_with = "lowercase")]
    no_lowercase: bool,

    /// Grammar for frequency patterns [default: legacy]
    #[arg(long, value_enum)]
    grammar: Option<GrammarArg>,

    /// How each pattern walks the word list [default: parallel]
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Output format [default: tsv]
    #[arg(short = 'f', long, value_enum)]
    format: Option<FormatArg>,

    /// How to handle invalid UTF-8 sequences [default: failfast]
    #[arg(long, value_enum)]
    encoding: Option<EncodingArg>,

    /// Number of threads to use
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Exit successfully even if some patterns failed
    #[arg(long)]
    allow_failures: bool,

    /// Print a summary to stderr
    #[arg(short, long)]
    stats: bool,
}

impl CliCountConfig {
    fn lowercase_override(&self) -> Option<bool> {
        if self.lowercase {
            Some(true)
        } else if self.no_lowercase {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Count the words matching each pattern
    Count(Box<CliCountConfig>),

    /// Show how patterns are parsed
    Explain {
        /// Raw patterns to explain
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Grammar for frequency patterns
        #[arg(long, value_enum, default_value = "legacy")]
        grammar: GrammarArg,
    },

    /// Print the effective configuration as YAML
    ShowConfig {
        /// Configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Count(args) => {
            let overrides = CliOverrides {
                lowercase: args.lowercase_override(),
                text_path: args.text,
                patterns_path: args.patterns,
                output_path: args.output,
                grammar: args.grammar.map(Into::into),
                count_strategy: args.strategy.map(Into::into),
                output_format: args.format.map(Into::into),
                encoding_mode: args.encoding.map(Into::into),
                thread_count: args.threads,
                log_level: args.log_level,
            };

            let config = load_config(args.config.as_ref())?.merge_with_cli(overrides);
            init_tracing(&config.log_level);
            debug!("Effective configuration: {:?}", config);

            let output = run_config(&config)?;
            match &config.output_path {
                Some(path) => write_table_to_file(path, &output.table, config.output_format)?,
                None => write_table(&mut io::stdout().lock(), &output.table, config.output_format)?,
            }

            if args.stats {
                print_summary(&output);
            }
            print_failures(&output);
            output.check_failures(args.allow_failures)
        }
        Commands::Explain { patterns, grammar } => {
            let grammar = FrequencyGrammar::from(grammar);
            for raw in &patterns {
                print_pattern(raw, &parse_with(raw, grammar));
            }
            Ok(())
        }
        Commands::ShowConfig { config } => {
            let config = load_config(config.as_ref())?;
            print!("{}", config.to_yaml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<TallyConfig> {
    TallyConfig::load_from(path.map(PathBuf::as_path))
        .map_err(|e| TallyError::config_error(e.to_string()))
}

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    // Logs go to stderr so the table on stdout stays clean
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn print_pattern(raw: &str, pattern: &Pattern) {
    match pattern {
        Pattern::Substring { sequence } => {
            println!(
                "{}\t{}\tcontains {:?}",
                raw.blue(),
                pattern.kind().green(),
                sequence
            );
        }
        Pattern::Frequency { .. } => {
            let requirements = pattern.sorted_requirements();
            let rendered = if requirements.is_empty() {
                "matches every word".to_string()
            } else {
                requirements
                    .iter()
                    .map(|(c, n)| format!("{:?}>={}", c, n))
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            println!("{}\t{}\t{}", raw.blue(), pattern.kind().green(), rendered);
        }
    }
}

fn print_summary(output: &TallyOutput) {
    eprintln!(
        "Counted {} patterns over {} words ({} matches)",
        output.table.len().to_string().green(),
        output.words_scanned.to_string().green(),
        output.table.total_matches().to_string().green()
    );
}

fn print_failures(output: &TallyOutput) {
    for failure in &output.failures {
        eprintln!(
            "{} pattern {}: {}",
            "failed".red(),
            failure.pattern.blue(),
            failure.message
        );
    }
}
