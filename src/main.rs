//! Clearing Engine CLI
//!
//! Command-line interface for parsing fixed-width clearing files and running
//! them through the idempotent queue consumer.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- parse batch.txt > records.jsonl
//! cargo run -- run batch.txt --drain
//! cargo run -- run batch.txt --strategy sync --batch-size 5 --drain
//! cargo run -- --log-format json run batch.txt --max-concurrent 8
//! ```
//!
//! # Commands
//!
//! - **parse**: Print every valid record of the file as a JSON line
//! - **run**: Publish the file into an in-process queue and consume it until
//!   the queue drains (`--drain`) or Ctrl-C is pressed, then print the stats
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, file not readable, queue unavailable, etc.)

use anyhow::Context;
use clearing_engine::cli::{self, Command, ParseArgs, RunArgs};
use clearing_engine::core::{
    Consumer, DedupStore, InMemoryDedupStore, LoggingProcessor, QueuePort, TransactionProcessor,
};
use clearing_engine::io::{wire_format, SyncReader};
use clearing_engine::logging;
use clearing_engine::queue::{InMemoryQueue, Producer};
use clearing_engine::strategy;
use clearing_engine::types::QueueHandle;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How often `--drain` checks whether the queue is empty
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() {
    let args = cli::parse_args();
    logging::init_logging(&args.log_level, args.log_format);

    let result = match args.command {
        Command::Parse(parse_args) => parse(parse_args),
        Command::Run(run_args) => run(run_args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn parse(args: ParseArgs) -> anyhow::Result<()> {
    let file = File::open(&args.input_file)
        .with_context(|| format!("failed to open '{}'", args.input_file.display()))?;

    let stdout = std::io::stdout();
    let mut output = BufWriter::new(stdout.lock());
    let mut printed = 0usize;
    let mut skipped = 0usize;

    for result in SyncReader::new(BufReader::new(file)) {
        match result {
            Ok(tx) => {
                output.write_all(&wire_format::encode(&tx)?)?;
                output.write_all(b"\n")?;
                printed += 1;
            }
            Err(e) if e.is_line_level() => {
                skipped += 1;
                tracing::debug!(error = %e, "skipping malformed line");
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read '{}'", args.input_file.display())
                })
            }
        }
    }

    output.flush()?;
    tracing::info!(printed, skipped, "parse finished");
    Ok(())
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let queue = Arc::new(InMemoryQueue::with_visibility_timeout(
        args.visibility_timeout(),
    ));
    let port: Arc<dyn QueuePort> = queue.clone();
    let dedup: Arc<dyn DedupStore> = Arc::new(InMemoryDedupStore::new());
    let processor: Arc<dyn TransactionProcessor> = Arc::new(LoggingProcessor);

    let consumer = Consumer::connect(port.clone(), dedup, processor, args.to_consumer_config())
        .await
        .context("failed to start consumer")?;
    let consumer = Arc::new(consumer);

    let shutdown = CancellationToken::new();
    let worker = tokio::spawn({
        let consumer = Arc::clone(&consumer);
        let shutdown = shutdown.clone();
        async move { consumer.run(shutdown).await }
    });

    let ingested = ingest(&args, port).await;
    if ingested.is_ok() {
        if args.drain {
            wait_for_drain(&queue, consumer.handle()).await?;
        } else {
            tracing::info!("consuming, press Ctrl-C to stop");
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for Ctrl-C")?;
        }
    }

    shutdown.cancel();
    let stats = worker.await.context("consumer task failed")?;
    let report = ingested?;

    println!(
        "parsed={} enqueued={} received={} processed={} duplicates={} discarded={} ack_failures={} poll_errors={}",
        report.parsed,
        report.enqueued,
        stats.received,
        stats.processed,
        stats.duplicates,
        stats.discarded,
        stats.ack_failures,
        stats.poll_errors,
    );
    Ok(())
}

async fn ingest(
    args: &RunArgs,
    port: Arc<dyn QueuePort>,
) -> anyhow::Result<strategy::IngestReport> {
    let producer = Producer::connect(port, &args.queue_name)
        .await
        .context("failed to start producer")?;
    let ingest_strategy = strategy::create_strategy(args.strategy.clone(), args.ingest_batch_size);

    let report = ingest_strategy
        .ingest(&args.input_file, &producer)
        .await
        .with_context(|| format!("failed to ingest '{}'", args.input_file.display()))?;

    tracing::info!(
        parsed = report.parsed,
        enqueued = report.enqueued,
        "file ingested"
    );
    Ok(report)
}

/// Wait until every published message has been acknowledged, or Ctrl-C
async fn wait_for_drain(queue: &InMemoryQueue, handle: &QueueHandle) -> anyhow::Result<()> {
    loop {
        if queue.pending(handle)? == 0 {
            tracing::info!("queue drained");
            return Ok(());
        }

        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                tracing::info!("interrupted before the queue drained");
                return Ok(());
            }
            _ = tokio::time::sleep(DRAIN_POLL_INTERVAL) => {}
        }
    }
}
