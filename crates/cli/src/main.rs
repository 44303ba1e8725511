mod cli;
mod metrics;
mod records;

use std::fs::File;
use std::io::{self, BufReader};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use trackfilter_core::{
    load_config, validate_config, CancelHandle, PipelineController, PipelineProgress,
    ProcessFilter,
};

use cli::Cli;

/// Buffer size for progress events
const PROGRESS_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(fmt_layer)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    info!("Loading configuration from {:?}", cli.config);
    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    if let Some(max_concurrency) = cli.max_concurrency {
        config.pipeline.max_concurrency = max_concurrency;
    }

    validate_config(&config).context("Configuration validation failed")?;

    let chain = config.filter_chain();
    if chain.is_empty() {
        warn!("No filters configured; every track will be kept unchanged");
    }
    for (index, spec) in chain.iter().enumerate() {
        info!(
            index,
            filter = %spec.display_name(),
            protocol = spec.protocol.as_str(),
            timeout_ms = spec.timeout.as_millis() as u64,
            "Filter configured"
        );
    }

    if cli.show_chain {
        println!("{}", serde_json::to_string_pretty(&chain)?);
        return Ok(());
    }

    // Read the batch
    let records = match &cli.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input {:?}", path))?;
            records::read_records(BufReader::new(file))?
        }
        None => records::read_records(io::stdin().lock())?,
    };
    info!("Read {} tracks", records.len());

    let controller = PipelineController::new(config.pipeline.clone(), Arc::new(ProcessFilter::new()));

    // Cancel the batch on Ctrl+C or SIGTERM
    let cancel = CancelHandle::new();
    let signal_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            warn!("Shutdown signal received, cancelling batch");
            cancel.cancel();
        })
    };

    let (progress_tx, mut progress_rx) = mpsc::channel(PROGRESS_BUFFER_SIZE);
    let progress_task = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            if let PipelineProgress::TrackFinished { index, outcome, .. } = event {
                debug!(index, outcome = outcome.as_str(), "Track finished");
            }
        }
    });

    let outcomes = controller
        .process_batch_with(
            records,
            chain,
            config.pipeline.max_concurrency,
            cancel.token(),
            Some(progress_tx),
        )
        .await;

    signal_task.abort();
    progress_task.await.ok();

    records::write_outcomes(io::stdout().lock(), &outcomes).context("Failed to write outcomes")?;

    if cli.print_metrics {
        eprint!("{}", metrics::encode_metrics()?);
    }

    if cancel.is_cancelled() {
        anyhow::bail!("Batch cancelled before completion");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
