use log::{debug, info};
use std::collections::HashMap;
use std::env;

use crate::bluetooth::filter::FilterConfig;
use crate::error::ConfigError;

const DEFAULT_SERIAL_PORT: &str = "/dev/ttyACM0";
const DEFAULT_BAUD_RATE: u32 = 115200;
const RSSI_FILTER_RANGE: std::ops::RangeInclusive<u32> = 20..=110;

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub serial_port: String,
    pub baud_rate: u32,
    pub filter: FilterConfig,
    /// Display-order address without separators (`C098E5405D4C`) -> device name
    pub tags: HashMap<String, String>,
    pub csv_path: Option<String>,
    pub database_url: Option<String>,
}

impl ScannerConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok()).map_err(Into::into)
    }

    /// Build the configuration from any key lookup, e.g. the process environment
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let serial_port = get("SERIAL_PORT").unwrap_or_else(|| DEFAULT_SERIAL_PORT.to_string());

        let baud_rate = match get("SERIAL_BAUD") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "SERIAL_BAUD",
                value,
            })?,
            None => DEFAULT_BAUD_RATE,
        };

        let mac_prefixes = list_values(get("FILTER_MAC"))
            .map(parse_mac_filter)
            .collect::<Result<Vec<_>, _>>()?;
        let service_ids = list_values(get("FILTER_UUID"))
            .map(parse_uuid_filter)
            .collect::<Result<Vec<_>, _>>()?;
        let min_rssi_floor = match get("FILTER_RSSI") {
            Some(value) if !value.trim().is_empty() => parse_rssi_filter(&value)?,
            _ => None,
        };

        let tags = match get("SENSOR_TAGS") {
            Some(value) => parse_tags(&value)?,
            None => HashMap::new(),
        };

        let csv_path = get("CSV_PATH").filter(|v| !v.trim().is_empty());
        let database_url = get("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if csv_path.is_none() && database_url.is_none() {
            return Err(ConfigError::NoSink);
        }

        let config = ScannerConfig {
            serial_port,
            baud_rate,
            filter: FilterConfig {
                mac_prefixes,
                service_ids,
                min_rssi_floor,
            },
            tags,
            csv_path,
            database_url,
        };
        config.log_summary();

        Ok(config)
    }

    fn log_summary(&self) {
        info!("Serial port:\t{} @ {} baud", self.serial_port, self.baud_rate);

        let uuids = if self.filter.service_ids.is_empty() {
            "None".to_string()
        } else {
            self.filter
                .service_ids
                .iter()
                .map(|id| format!("0x{}", hex_string(id, "")))
                .collect::<Vec<_>>()
                .join(", ")
        };
        info!("UUID filters:\t{}", uuids);

        let macs = if self.filter.mac_prefixes.is_empty() {
            "None".to_string()
        } else {
            self.filter
                .mac_prefixes
                .iter()
                .map(|mac| hex_string(mac, ":"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        info!("MAC filter(s):\t{}", macs);

        match self.filter.min_rssi_floor {
            Some(floor) if floor > 0 => info!("RSSI filter:\t-{} dBm minimum", floor),
            _ => info!("RSSI filter:\tNone"),
        }

        info!("Total tags loaded: {}", self.tags.len());
        for (mac, name) in &self.tags {
            debug!("Tag: {} -> {}", mac, name);
        }
    }
}

fn hex_string(bytes: &[u8], separator: &str) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(separator)
}

fn list_values(value: Option<String>) -> impl Iterator<Item = String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .into_iter()
}

/// Strip separators from a hex argument, rejecting anything but hex digits and colons
fn normalize_hex(arg: &str) -> Option<String> {
    if arg.chars().any(|c| !(c.is_ascii_hexdigit() || c == ':')) {
        return None;
    }
    Some(arg.replace(':', "").to_uppercase())
}

fn hex_bytes(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 == 1 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

/// Parse a MAC prefix such as `00:07:80` into display-order bytes
pub fn parse_mac_filter(arg: String) -> Result<Vec<u8>, ConfigError> {
    normalize_hex(&arg)
        .and_then(|hex| hex_bytes(&hex))
        .filter(|bytes| (1..=6).contains(&bytes.len()))
        .ok_or(ConfigError::InvalidMac(arg))
}

/// Parse a 16-, 32- or 128-bit service identifier such as `180D`
pub fn parse_uuid_filter(arg: String) -> Result<Vec<u8>, ConfigError> {
    normalize_hex(&arg)
        .and_then(|hex| hex_bytes(&hex))
        .filter(|bytes| matches!(bytes.len(), 2 | 4 | 16))
        .ok_or(ConfigError::InvalidUuid(arg))
}

/// Parse an RSSI floor; the sign is ignored and 0 disables the filter
pub fn parse_rssi_filter(arg: &str) -> Result<Option<u8>, ConfigError> {
    let value: i32 = arg
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidRssi(arg.to_string()))?;
    let floor = value.unsigned_abs();

    if floor == 0 {
        return Ok(None);
    }
    if !RSSI_FILTER_RANGE.contains(&floor) {
        return Err(ConfigError::InvalidRssi(arg.to_string()));
    }
    Ok(Some(floor as u8))
}

/// Parse `MAC=name` pairs separated by commas
pub fn parse_tags(value: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut tags = HashMap::new();

    for pair in value.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (mac, name) = pair.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
            key: "SENSOR_TAGS",
            value: pair.to_string(),
        })?;
        let (mac, name) = (mac.trim(), name.trim());

        let address = normalize_hex(mac)
            .filter(|hex| hex.len() == 12)
            .ok_or_else(|| ConfigError::InvalidMac(mac.to_string()))?;
        if !name.is_empty() {
            tags.insert(address, name.to_string());
        }
    }

    Ok(tags)
}
