//! Destinations for finished classification records
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::database::{ensure_schema, store_classification};
use crate::models::ClassificationRecord;
use crate::utils::format_timestamp;

pub const CSV_HEADER: [&str; 13] = [
    "device",
    "device_id",
    "received_time",
    "sequence_no",
    "rssi",
    "Light Type",
    "Color Temp",
    "Lux",
    "Red",
    "Green",
    "Blue",
    "Clear",
    "Comparing Ratios",
];

#[async_trait]
pub trait ResultSink: Send {
    fn name(&self) -> &str;

    async fn store(&mut self, record: &ClassificationRecord) -> Result<(), String>;
}

/// Appends one row per record to a CSV file, writing the header when the file is new
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line(fields: &[String]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Render a record in CSV_HEADER column order
pub fn csv_row(record: &ClassificationRecord) -> String {
    csv_line(&[
        record.device.clone(),
        record.stream_id.clone(),
        format_timestamp(&record.timestamp),
        record.sequence_no.to_string(),
        record.rssi.to_string(),
        record.light_type.to_string(),
        record.color_temp.to_string(),
        record.lux.to_string(),
        record.red.to_string(),
        record.green.to_string(),
        record.blue.to_string(),
        record.clear.to_string(),
        record.ratio_compare.to_string(),
    ])
}

#[async_trait]
impl ResultSink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    async fn store(&mut self, record: &ClassificationRecord) -> Result<(), String> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| format!("Failed to open {}: {}", self.path.display(), e))?;

        let is_new = file
            .metadata()
            .await
            .map_err(|e| format!("Failed to stat {}: {}", self.path.display(), e))?
            .len()
            == 0;

        let mut contents = String::new();
        if is_new {
            let header: Vec<String> = CSV_HEADER.iter().map(|h| h.to_string()).collect();
            contents.push_str(&csv_line(&header));
        }
        contents.push_str(&csv_row(record));

        file.write_all(contents.as_bytes())
            .await
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))?;
        file.flush()
            .await
            .map_err(|e| format!("Failed to flush {}: {}", self.path.display(), e))
    }
}

/// Inserts records into PostgreSQL
pub struct PostgresSink {
    database_url: String,
}

impl PostgresSink {
    /// Connect once to make sure the table exists
    pub async fn connect(database_url: &str) -> Result<Self, String> {
        ensure_schema(database_url).await?;
        Ok(Self {
            database_url: database_url.to_string(),
        })
    }
}

#[async_trait]
impl ResultSink for PostgresSink {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn store(&mut self, record: &ClassificationRecord) -> Result<(), String> {
        store_classification(record, &self.database_url).await
    }
}
