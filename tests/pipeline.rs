use std::collections::HashMap;

use bled112_light_id::bluetooth::FilterConfig;
use bled112_light_id::error::{FilterRejection, IgnoreReason, PayloadError};
use bled112_light_id::models::{LightType, SensorReading};
use bled112_light_id::sensor::payload::encode_ad_data;
use bled112_light_id::{Outcome, Pipeline};

const LPCSB_1: [u8; 6] = [0xC0, 0x98, 0xE5, 0x40, 0x60, 0x6C];
const LPCSB_0: [u8; 6] = [0xC0, 0x98, 0xE5, 0x40, 0x34, 0xA4];
const BLUEGIGA: [u8; 6] = [0x00, 0x07, 0x80, 0x81, 0x44, 0x94];

/// gap_scan_response event frame for an advertiser given in display order
fn scan_event(rssi: i8, sender: [u8; 6], ad_data: &[u8]) -> Vec<u8> {
    let mut payload = vec![rssi as u8, 0x00];
    payload.extend(sender.iter().rev());
    payload.extend_from_slice(&[0x00, 0xFF, ad_data.len() as u8]);
    payload.extend_from_slice(ad_data);

    let mut frame = vec![0x80, payload.len() as u8, 0x06, 0x00];
    frame.extend(payload);
    frame
}

fn reading(sequence_no: u16, rgb: (u16, u16, u16), lux: u16) -> SensorReading {
    SensorReading {
        sensor_id: 0x44,
        sequence_no,
        clear: rgb.0 + rgb.1 + rgb.2,
        red: rgb.0,
        green: rgb.1,
        blue: rgb.2,
        color_temp: 3100,
        lux,
    }
}

fn sensor_event(sender: [u8; 6], reading: &SensorReading) -> Vec<u8> {
    scan_event(-60, sender, &encode_ad_data(reading))
}

fn classified(outcomes: &[Outcome]) -> Vec<(String, u16, LightType)> {
    outcomes
        .iter()
        .filter_map(|o| match o {
            Outcome::Classified(r) => Some((r.stream_id.clone(), r.sequence_no, r.light_type)),
            _ => None,
        })
        .collect()
}

#[test]
fn classifies_reading_from_noisy_stream() {
    let mut names = HashMap::new();
    names.insert("C098E540606C".to_string(), "LPCSB_1".to_string());
    let mut pipeline = Pipeline::new(FilterConfig::default(), names);

    let mut stream = vec![0x13, 0x37]; // line noise
    stream.extend_from_slice(&[0x00, 0x02, 0x06, 0x02, 0x00, 0x00]); // gap_discover response
    stream.extend_from_slice(&[0x80, 0x01, 0x00, 0x00, 0x01]); // system_boot-like event
    stream.extend(sensor_event(LPCSB_1, &reading(1, (100, 90, 95), 1500)));

    let outcomes = pipeline.feed_all(&stream);
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(
        outcomes[0],
        Outcome::Ignored(IgnoreReason::Response { class: 0x06, command: 0x02 })
    ));
    assert!(matches!(
        outcomes[1],
        Outcome::Ignored(IgnoreReason::UnhandledEvent { class: 0x00, command: 0x00 })
    ));

    let Outcome::Classified(record) = &outcomes[2] else {
        panic!("expected a classification, got {:?}", outcomes[2]);
    };
    assert_eq!(record.device, "LPCSB_1");
    assert_eq!(record.stream_id, "C098E540606C");
    assert_eq!(record.sensor_id, 68);
    assert_eq!(record.sequence_no, 1);
    assert_eq!(record.rssi, -60);
    assert_eq!(record.light_type, LightType::Led);
    assert_eq!((record.red, record.green, record.blue), (100, 90, 95));
    assert_eq!(record.clear, 285);
    assert_eq!(record.lux, 1500);
    assert_eq!(record.color_temp, 3100);
}

#[test]
fn unknown_device_gets_default_name() {
    let mut pipeline = Pipeline::new(FilterConfig::default(), HashMap::new());
    let outcomes = pipeline.feed_all(&sensor_event(LPCSB_0, &reading(1, (100, 90, 95), 1500)));
    match &outcomes[..] {
        [Outcome::Classified(record)] => assert_eq!(record.device, "Unknown"),
        other => panic!("unexpected outcomes {:?}", other),
    }
}

#[test]
fn untagged_senders_are_ignored_when_tags_are_configured() {
    let mut names = HashMap::new();
    names.insert("C098E540606C".to_string(), "LPCSB_1".to_string());
    let mut pipeline = Pipeline::new(FilterConfig::default(), names);

    // iBeacon-style advertisement from a nearby phone
    let phone = [0x66, 0x55, 0x44, 0x33, 0x22, 0x11];
    let mut ibeacon = vec![0x02, 0x01, 0x06, 0x1A, 0xFF, 0x4C, 0x00, 0x02, 0x15];
    ibeacon.extend_from_slice(&[0xAB; 21]);

    let mut stream = scan_event(-55, phone, &ibeacon);
    // Same layout as a sensor, but not one of ours
    stream.extend(sensor_event(LPCSB_0, &reading(1, (100, 90, 95), 1500)));
    stream.extend(sensor_event(LPCSB_1, &reading(1, (100, 90, 95), 1500)));

    let outcomes = pipeline.feed_all(&stream);
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(
        &outcomes[0],
        Outcome::Ignored(IgnoreReason::UnknownDevice(sender)) if sender == "665544332211"
    ));
    assert!(matches!(
        &outcomes[1],
        Outcome::Ignored(IgnoreReason::UnknownDevice(sender)) if sender == "C098E54034A4"
    ));
    match &outcomes[2] {
        Outcome::Classified(record) => assert_eq!(record.device, "LPCSB_1"),
        other => panic!("expected a classification, got {:?}", other),
    }
    assert_eq!(pipeline.classifier().stream_count(), 1);
}

#[test]
fn wrong_sensor_id_is_rejected() {
    let mut pipeline = Pipeline::new(FilterConfig::default(), HashMap::new());
    let mut bad = reading(1, (100, 90, 95), 1500);
    bad.sensor_id = 0x45;

    let outcomes = pipeline.feed_all(&sensor_event(LPCSB_1, &bad));
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(
        outcomes[0],
        Outcome::Rejected(PayloadError::SensorIdMismatch(0x45))
    ));
    assert_eq!(pipeline.classifier().stream_count(), 0);
}

#[test]
fn mac_filter_drops_before_extraction() {
    let filter = FilterConfig {
        mac_prefixes: vec![vec![0xC0, 0x98, 0xE5]],
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(filter, HashMap::new());

    // Malformed payload from a filtered sender is never inspected
    let mut bad = reading(1, (1, 2, 3), 10);
    bad.sensor_id = 0x00;
    let mut stream = sensor_event(BLUEGIGA, &bad);
    stream.extend(sensor_event(LPCSB_0, &reading(1, (100, 90, 95), 1500)));

    let outcomes = pipeline.feed_all(&stream);
    assert_eq!(outcomes.len(), 2);
    assert!(matches!(
        &outcomes[0],
        Outcome::Filtered(FilterRejection::Mac(sender)) if sender == "000780814494"
    ));
    assert!(matches!(outcomes[1], Outcome::Classified(_)));
}

#[test]
fn service_and_rssi_filters() {
    let filter = FilterConfig {
        service_ids: vec![vec![0x18, 0x0D]],
        min_rssi_floor: Some(70),
        ..Default::default()
    };
    let mut pipeline = Pipeline::new(filter, HashMap::new());

    // Heart rate service, strong signal, but no sensor payload
    let heart_rate = [0x02, 0x01, 0x06, 0x03, 0x03, 0x0D, 0x18];
    let mut weak = heart_rate.to_vec();
    weak.extend_from_slice(&[0x03, 0xFF, 0xE0, 0x02]);

    let mut stream = scan_event(-50, BLUEGIGA, &heart_rate);
    stream.extend(scan_event(-90, BLUEGIGA, &weak));
    stream.extend(sensor_event(LPCSB_1, &reading(1, (100, 90, 95), 1500)));

    let outcomes = pipeline.feed_all(&stream);
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(
        outcomes[0],
        Outcome::Ignored(IgnoreReason::NoManufacturerData)
    ));
    assert!(matches!(
        outcomes[1],
        Outcome::Filtered(FilterRejection::Rssi { rssi: -90, floor: 70 })
    ));
    assert!(matches!(
        outcomes[2],
        Outcome::Filtered(FilterRejection::Service)
    ));
}

#[test]
fn incremental_and_bulk_feeding_agree() {
    let mut stream = vec![0xAA];
    stream.extend(sensor_event(LPCSB_1, &reading(1, (100, 90, 95), 1500)));
    stream.extend(sensor_event(LPCSB_1, &reading(2, (500, 90, 95), 1500)));
    stream.extend(sensor_event(LPCSB_1, &reading(3, (100, 120, 110), 1500)));

    let mut bulk = Pipeline::new(FilterConfig::default(), HashMap::new());
    let bulk_outcomes = bulk.feed_all(&stream);

    let mut single = Pipeline::new(FilterConfig::default(), HashMap::new());
    let single_outcomes: Vec<Outcome> = stream.iter().filter_map(|&b| single.feed(b)).collect();

    assert_eq!(classified(&bulk_outcomes), classified(&single_outcomes));
    assert_eq!(classified(&bulk_outcomes).len(), 3);
}

#[test]
fn streams_keep_separate_statistics() {
    let mut pipeline = Pipeline::new(FilterConfig::default(), HashMap::new());

    let mut stream = Vec::new();
    stream.extend(sensor_event(LPCSB_1, &reading(1, (100, 90, 95), 1500)));
    stream.extend(sensor_event(LPCSB_0, &reading(1, (9000, 8000, 8500), 1500)));
    stream.extend(sensor_event(LPCSB_1, &reading(2, (110, 95, 100), 1500)));

    let outcomes = pipeline.feed_all(&stream);
    let labels = classified(&outcomes);

    // With a shared baseline the second LPCSB_1 reading would see a -8890 red change
    assert_eq!(labels[2], ("C098E540606C".to_string(), 2, LightType::Led));
    assert_eq!(pipeline.classifier().stream_count(), 2);
}

#[test]
fn sequence_restart_clears_running_changes() {
    let mut pipeline = Pipeline::new(FilterConfig::default(), HashMap::new());

    let mut stream = Vec::new();
    stream.extend(sensor_event(LPCSB_1, &reading(1, (100, 90, 95), 1500)));
    stream.extend(sensor_event(LPCSB_1, &reading(2, (400, 390, 395), 1500)));
    stream.extend(sensor_event(LPCSB_1, &reading(1, (400, 390, 395), 1500)));

    let labels: Vec<LightType> = classified(&pipeline.feed_all(&stream))
        .into_iter()
        .map(|(_, _, t)| t)
        .collect();

    assert_eq!(labels, vec![LightType::Led, LightType::Sunlight, LightType::Led]);
}
