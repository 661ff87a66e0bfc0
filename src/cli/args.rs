use crate::core::consumer::{ConsumerConfig, DEFAULT_QUEUE_NAME};
use crate::logging::LogFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Ingest fixed-width clearing files and consume them idempotently
#[derive(Parser, Debug)]
#[command(name = "clearing-engine", version)]
#[command(about = "Ingest fixed-width clearing files and consume them idempotently", long_about = None)]
pub struct CliArgs {
    /// Log output format
    #[arg(
        long = "log-format",
        value_name = "FORMAT",
        env = "CLEARING_LOG_FORMAT",
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormat,

    /// Default log filter, overridden by RUST_LOG
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        env = "CLEARING_LOG_LEVEL",
        default_value = "info",
        global = true
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a flat file and print every valid record as a JSON line
    Parse(ParseArgs),
    /// Ingest a flat file into an in-process queue and consume it
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Input flat file path containing clearing records
    #[arg(value_name = "INPUT")]
    pub input_file: PathBuf,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input flat file path containing clearing records
    #[arg(value_name = "INPUT")]
    pub input_file: PathBuf,

    /// Ingest strategy used to read the file
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Ingest strategy: 'sync' parses the whole file first, 'async' streams batches"
    )]
    pub strategy: StrategyType,

    /// Queue name to publish to and consume from
    #[arg(
        long = "queue-name",
        value_name = "NAME",
        env = "CLEARING_QUEUE_NAME",
        default_value = DEFAULT_QUEUE_NAME
    )]
    pub queue_name: String,

    /// Maximum messages per receive call
    #[arg(long = "batch-size", value_name = "SIZE")]
    pub batch_size: Option<usize>,

    /// Maximum messages of one batch handled concurrently
    #[arg(long = "max-concurrent", value_name = "COUNT")]
    pub max_concurrent: Option<usize>,

    /// Long-poll wait per receive call, in seconds
    #[arg(long = "wait-secs", value_name = "SECS", default_value_t = 10)]
    pub wait_secs: u64,

    /// Pause after a failed receive call, in seconds
    #[arg(long = "backoff-secs", value_name = "SECS", default_value_t = 5)]
    pub backoff_secs: u64,

    /// Seconds an unacknowledged message stays hidden before redelivery
    #[arg(long = "visibility-timeout-secs", value_name = "SECS", default_value_t = 30)]
    pub visibility_timeout_secs: u64,

    /// Records read per batch by the async ingest strategy
    #[arg(long = "ingest-batch-size", value_name = "SIZE")]
    pub ingest_batch_size: Option<usize>,

    /// Stop once the queue is drained instead of waiting for Ctrl-C
    #[arg(long = "drain")]
    pub drain: bool,
}

/// Available ingest strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl RunArgs {
    /// Create a ConsumerConfig from CLI arguments
    ///
    /// Missing sizes fall back to the defaults; zero sizes fall back with a
    /// warning (see [`ConsumerConfig::new`]).
    pub fn to_consumer_config(&self) -> ConsumerConfig {
        let default = ConsumerConfig::default();
        ConsumerConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent.unwrap_or(default.max_concurrent),
        )
        .with_queue_name(self.queue_name.clone())
        .with_wait_time(Duration::from_secs(self.wait_secs))
        .with_backoff(Duration::from_secs(self.backoff_secs))
    }

    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.visibility_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn run_args(args: &[&str]) -> RunArgs {
        match CliArgs::try_parse_from(args).unwrap().command {
            Command::Run(run) => run,
            other => panic!("Expected run command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_command() {
        let parsed = CliArgs::try_parse_from(["program", "parse", "batch.txt"]).unwrap();
        match parsed.command {
            Command::Parse(args) => assert_eq!(args.input_file, PathBuf::from("batch.txt")),
            other => panic!("Expected parse command, got {:?}", other),
        }
        assert_eq!(parsed.log_format, LogFormat::Pretty);
        assert_eq!(parsed.log_level, "info");
    }

    #[rstest]
    #[case::default_strategy(&["program", "run", "batch.txt"], StrategyType::Async)]
    #[case::explicit_sync(&["program", "run", "--strategy", "sync", "batch.txt"], StrategyType::Sync)]
    #[case::explicit_async(&["program", "run", "--strategy", "async", "batch.txt"], StrategyType::Async)]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        assert_eq!(run_args(args).strategy, expected);
    }

    #[rstest]
    #[case::pretty(&["program", "--log-format", "pretty", "parse", "a.txt"], LogFormat::Pretty)]
    #[case::json(&["program", "--log-format", "json", "parse", "a.txt"], LogFormat::Json)]
    #[case::global_after_subcommand(&["program", "parse", "a.txt", "--log-format", "json"], LogFormat::Json)]
    fn test_log_format_parsing(#[case] args: &[&str], #[case] expected: LogFormat) {
        assert_eq!(CliArgs::try_parse_from(args).unwrap().log_format, expected);
    }

    #[rstest]
    #[case::all_defaults(&["program", "run", "batch.txt"], 10, num_cpus::get(), 10, 5)]
    #[case::custom_batch_size(&["program", "run", "--batch-size", "5", "batch.txt"], 5, num_cpus::get(), 10, 5)]
    #[case::custom_concurrency(&["program", "run", "--max-concurrent", "2", "batch.txt"], 10, 2, 10, 5)]
    #[case::zero_batch_size(&["program", "run", "--batch-size", "0", "batch.txt"], 10, num_cpus::get(), 10, 5)]
    #[case::custom_timings(
        &["program", "run", "--wait-secs", "1", "--backoff-secs", "2", "batch.txt"],
        10,
        num_cpus::get(),
        1,
        2
    )]
    fn test_consumer_config_conversion(
        #[case] args: &[&str],
        #[case] batch_size: usize,
        #[case] max_concurrent: usize,
        #[case] wait_secs: u64,
        #[case] backoff_secs: u64,
    ) {
        let config = run_args(args).to_consumer_config();

        assert_eq!(config.batch_size, batch_size);
        assert_eq!(config.max_concurrent, max_concurrent);
        assert_eq!(config.wait_time, Duration::from_secs(wait_secs));
        assert_eq!(config.backoff, Duration::from_secs(backoff_secs));
        assert_eq!(config.queue_name, DEFAULT_QUEUE_NAME);
    }

    #[test]
    fn test_run_options() {
        let args = run_args(&[
            "program",
            "run",
            "--queue-name",
            "other-queue",
            "--visibility-timeout-secs",
            "3",
            "--ingest-batch-size",
            "50",
            "--drain",
            "batch.txt",
        ]);

        assert_eq!(args.to_consumer_config().queue_name, "other-queue");
        assert_eq!(args.visibility_timeout(), Duration::from_secs(3));
        assert_eq!(args.ingest_batch_size, Some(50));
        assert!(args.drain);
    }

    #[rstest]
    #[case::missing_command(&["program"])]
    #[case::missing_input(&["program", "run"])]
    #[case::invalid_strategy(&["program", "run", "--strategy", "invalid", "batch.txt"])]
    #[case::invalid_log_format(&["program", "--log-format", "xml", "parse", "batch.txt"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
