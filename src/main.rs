use log::{error, info, warn};
use std::collections::HashMap;
use time::OffsetDateTime;

use bled112_light_id::bluetooth::scanner::{open_port, spawn_reader};
use bled112_light_id::config::ScannerConfig;
use bled112_light_id::sink::{CsvSink, PostgresSink, ResultSink};
use bled112_light_id::utils::{format_datetime, log_summaries, tally, StreamSummary};
use bled112_light_id::{Outcome, Pipeline};

async fn open_sinks(config: &ScannerConfig) -> Result<Vec<Box<dyn ResultSink>>, String> {
    let mut sinks: Vec<Box<dyn ResultSink>> = Vec::new();

    if let Some(path) = &config.csv_path {
        info!("Writing results to {}", path);
        sinks.push(Box::new(CsvSink::new(path)));
    }

    if let Some(database_url) = &config.database_url {
        match PostgresSink::connect(database_url).await {
            Ok(sink) => {
                info!("Writing results to PostgreSQL");
                sinks.push(Box::new(sink));
            }
            Err(e) => error!("Failed to prepare database: {}", e),
        }
    }

    if sinks.is_empty() {
        return Err("No usable result sink".into());
    }
    Ok(sinks)
}

async fn main_loop(
    config: ScannerConfig,
    summaries: &mut HashMap<String, StreamSummary>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sinks = open_sinks(&config).await?;
    let port = open_port(&config)?;
    let (mut bytes, _reader) = spawn_reader(port);

    let mut pipeline = Pipeline::new(config.filter.clone(), config.tags.clone());

    info!(
        "Starting scan for BLE advertisements at {}",
        format_datetime(&OffsetDateTime::now_utc())
    );

    while let Some(chunk) = bytes.recv().await {
        for outcome in pipeline.feed_all(&chunk) {
            let Outcome::Classified(record) = outcome else {
                continue;
            };

            info!(
                "{} ({}) #{}: {} at {} lux, {} K",
                record.device,
                record.stream_id,
                record.sequence_no,
                record.light_type,
                record.lux,
                record.color_temp
            );
            tally(summaries, &record);

            for sink in sinks.iter_mut() {
                if let Err(e) = sink.store(&record).await {
                    error!(
                        "Failed to store record {} from {} in {}: {}",
                        record.sequence_no,
                        record.stream_id,
                        sink.name(),
                        e
                    );
                }
            }
        }
    }

    Err("Serial stream ended".into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match ScannerConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Handle Ctrl+C gracefully
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        let _ = tx.send(());
    });

    let mut summaries = HashMap::new();

    // Run main loop or wait for shutdown signal
    tokio::select! {
        result = main_loop(config, &mut summaries) => {
            match result {
                Ok(_) => info!("Program completed successfully"),
                Err(e) => error!("Fatal error: {}", e),
            }
        }
        _ = &mut rx => {
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    if summaries.is_empty() {
        warn!("No light readings classified during this run!");
    } else {
        log_summaries(&summaries);
    }

    Ok(())
}
