//! Byte stream to classification record pipeline
//!
//! Every stage is driven synchronously from [`Pipeline::feed`], so frames and
//! classifier updates happen strictly in byte arrival order.
use log::{debug, trace, warn};
use std::collections::HashMap;
use time::OffsetDateTime;

use crate::bluetooth::advertisement::{manufacturer_data, parse_ad_fields};
use crate::bluetooth::event::decode_event;
use crate::bluetooth::filter::FilterConfig;
use crate::bluetooth::framer::FrameAssembler;
use crate::error::{FilterRejection, IgnoreReason, PayloadError};
use crate::models::{ClassificationRecord, Frame};
use crate::sensor::classifier::LightClassifier;
use crate::sensor::payload::extract_reading;

/// What became of one complete frame
#[derive(Debug, Clone)]
pub enum Outcome {
    Classified(ClassificationRecord),
    Ignored(IgnoreReason),
    Filtered(FilterRejection),
    Rejected(PayloadError),
}

/// Owns all decoding and classification state for one serial stream
#[derive(Debug, Default)]
pub struct Pipeline {
    assembler: FrameAssembler,
    filter: FilterConfig,
    classifier: LightClassifier,
    device_names: HashMap<String, String>,
}

impl Pipeline {
    /// `device_names` maps display-order addresses (`C098E5405D4C`) to labels.
    /// When it is non-empty, advertisements from any other sender are ignored.
    pub fn new(filter: FilterConfig, device_names: HashMap<String, String>) -> Self {
        Self {
            assembler: FrameAssembler::new(),
            filter,
            classifier: LightClassifier::new(),
            device_names,
        }
    }

    /// Push one byte; returns an outcome when the byte completes a frame
    pub fn feed(&mut self, byte: u8) -> Option<Outcome> {
        let frame = self.assembler.feed(byte)?;
        Some(self.process(&frame))
    }

    pub fn feed_all(&mut self, bytes: &[u8]) -> Vec<Outcome> {
        bytes.iter().filter_map(|&b| self.feed(b)).collect()
    }

    pub fn classifier(&self) -> &LightClassifier {
        &self.classifier
    }

    /// Run one complete frame through decode, filter, extract and classify
    pub fn process(&mut self, frame: &Frame) -> Outcome {
        let report = match decode_event(frame) {
            Ok(report) => report,
            Err(reason) => {
                trace!("Ignoring frame: {}", reason);
                return Outcome::Ignored(reason);
            }
        };

        let fields = parse_ad_fields(&report.raw_ad_data);

        if let Err(rejection) = self.filter.evaluate(&report, &fields) {
            debug!("Filtered advertisement: {}", rejection);
            return Outcome::Filtered(rejection);
        }

        // With configured tags only those devices are sensors
        let stream_id = report.sender.to_string();
        let device = match self.device_names.get(&stream_id) {
            Some(name) => name.clone(),
            None if self.device_names.is_empty() => "Unknown".to_string(),
            None => {
                trace!("Ignoring untagged sender {}", stream_id);
                return Outcome::Ignored(IgnoreReason::UnknownDevice(stream_id));
            }
        };

        if manufacturer_data(&fields).is_none() {
            debug!("No manufacturer data from {}", report.sender);
            return Outcome::Ignored(IgnoreReason::NoManufacturerData);
        }

        let reading = match extract_reading(&report.raw_ad_data) {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Rejected payload from {}: {}", report.sender, e);
                return Outcome::Rejected(e);
            }
        };

        let classification = self.classifier.classify(report.sender, &reading);
        debug!(
            "Reading {} from {} ({}): {}",
            reading.sequence_no, device, stream_id, classification.light_type
        );

        Outcome::Classified(ClassificationRecord {
            device,
            stream_id,
            sensor_id: reading.sensor_id,
            timestamp: OffsetDateTime::now_utc(),
            sequence_no: reading.sequence_no,
            rssi: report.rssi,
            light_type: classification.light_type,
            color_temp: reading.color_temp,
            lux: reading.lux,
            red: reading.red,
            green: reading.green,
            blue: reading.blue,
            clear: reading.clear,
            ratio_compare: classification.ratio_compare,
        })
    }
}
