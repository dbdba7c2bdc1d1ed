//! Reasons a frame or reading produced no classification record.
//!
//! None of these are fatal. The pipeline reports them and carries on with the
//! next byte.
use thiserror::Error;

/// Input that is valid but not something this service handles
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IgnoreReason {
    #[error("response frame (class 0x{class:02X}, command 0x{command:02X})")]
    Response { class: u8, command: u8 },
    #[error("unhandled event (class 0x{class:02X}, command 0x{command:02X})")]
    UnhandledEvent { class: u8, command: u8 },
    #[error("scan response event too short: {len} payload bytes")]
    TruncatedEvent { len: usize },
    #[error("advertisement has no manufacturer-specific data")]
    NoManufacturerData,
    #[error("sender {0} is not a configured sensor")]
    UnknownDevice(String),
}

/// The filter that dropped an advertisement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterRejection {
    #[error("sender {0} matches no MAC filter")]
    Mac(String),
    #[error("no advertised service matches the UUID filter")]
    Service,
    #[error("RSSI {rssi} dBm below -{floor} dBm")]
    Rssi { rssi: i8, floor: u8 },
}

/// A manufacturer payload that cannot be turned into a sensor reading
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("malformed packet: sensor id 0x{0:02X}, expected 0x44")]
    SensorIdMismatch(u8),
    #[error("payload too short: {len} bytes, need {needed}")]
    Truncated { len: usize, needed: usize },
}

/// Invalid externally supplied configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("invalid MAC filter '{0}': must be 1-6 full bytes in 0-padded hex form (00:01:02:03:04:05)")]
    InvalidMac(String),
    #[error("invalid UUID filter '{0}': must be 2 or 16 full bytes in 0-padded hex form (180B or 0123456789abcdef0123456789abcdef)")]
    InvalidUuid(String),
    #[error("invalid RSSI filter '{0}': must be between 20 and 110")]
    InvalidRssi(String),
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("no result sink configured: set CSV_PATH and/or DATABASE_URL")]
    NoSink,
}
