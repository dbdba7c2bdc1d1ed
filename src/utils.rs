/// Utility functions for timestamps and run summaries
use log::info;
use std::collections::HashMap;
use time::{format_description, OffsetDateTime};

use crate::models::{ClassificationRecord, LightType};

const RECORD_TIME_FORMAT: &str =
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z";
const LOG_TIME_FORMAT: &str = "[day].[month].[year] - [hour]:[minute]:[second]";

fn format_with(dt: &OffsetDateTime, description: &str) -> String {
    format_description::parse(description)
        .ok()
        .and_then(|format| dt.format(&format).ok())
        .unwrap_or_else(|| dt.to_string())
}

/// Format a record timestamp as YYYY-MM-DDTHH:MM:SS.ffffffZ
pub fn format_timestamp(dt: &OffsetDateTime) -> String {
    format_with(dt, RECORD_TIME_FORMAT)
}

/// Format a timestamp for human-readable logging (DD.MM.YYYY - HH:MM:SS)
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    format_with(dt, LOG_TIME_FORMAT)
}

/// Light type counts for one sensor stream
#[derive(Debug, Clone, Default)]
pub struct StreamSummary {
    pub device: String,
    pub samples: u32,
    pub counts: HashMap<LightType, u32>,
    pub last_light_type: Option<LightType>,
    lux_sum: f64,
}

impl StreamSummary {
    pub fn average_lux(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.lux_sum / self.samples as f64
    }

    /// Most frequent light type, ties broken by the fixed classification order
    pub fn dominant(&self) -> Option<LightType> {
        [
            LightType::Incandescent,
            LightType::Fluorescent,
            LightType::Led,
            LightType::Sunlight,
            LightType::Unknown,
        ]
        .into_iter()
        .filter_map(|t| self.counts.get(&t).map(|&n| (t, n)))
        .fold(None, |best: Option<(LightType, u32)>, (t, n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((t, n)),
        })
        .map(|(t, _)| t)
    }
}

/// Add a classified record to the per-stream summaries
pub fn tally(summaries: &mut HashMap<String, StreamSummary>, record: &ClassificationRecord) {
    let summary = summaries
        .entry(record.stream_id.clone())
        .or_insert_with(|| StreamSummary {
            device: record.device.clone(),
            ..Default::default()
        });

    summary.samples += 1;
    summary.lux_sum += record.lux as f64;
    *summary.counts.entry(record.light_type).or_insert(0) += 1;
    summary.last_light_type = Some(record.light_type);
}

/// Log the per-stream summaries
pub fn log_summaries(summaries: &HashMap<String, StreamSummary>) {
    for (stream_id, summary) in summaries {
        info!("Summary for {} ({}):", summary.device, stream_id);
        for (light_type, count) in &summary.counts {
            info!("  {}: {} readings", light_type, count);
        }
        if let Some(dominant) = summary.dominant() {
            info!("  Dominant light type: {}", dominant);
        }
        info!("  Average illuminance: {:.1} lux", summary.average_lux());
        info!("  Based on {} samples", summary.samples);
    }
}
