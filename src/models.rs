use std::fmt;
use time::OffsetDateTime;

/// Direction of a BGAPI frame, taken from bit 7 of the leading byte.
///
/// Commands and responses share the `0x00` marker, so everything the radio
/// sends back with bit 7 clear is a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Response,
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub leading_byte: u8,
    pub payload_length: u16,
    pub packet_class: u8,
    pub packet_command: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Wire representation: 4-byte header followed by the payload
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + self.payload.len());
        bytes.push(self.leading_byte);
        bytes.push(
            self.payload_length
                .wrapping_sub((self.leading_byte & 0x07) as u16) as u8,
        );
        bytes.push(self.packet_class);
        bytes.push(self.packet_command);
        bytes.extend_from_slice(&self.payload);
        bytes
    }
}

/// Bluetooth device address, stored in transmission (little-endian) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BdAddr(pub [u8; 6]);

impl BdAddr {
    /// Bytes in conventional display order, most significant first
    pub fn display_order(&self) -> [u8; 6] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.display_order() {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketSubtype {
    ConnectableAdvertisement,
    NonConnectableAdvertisement,
    ScanResponse,
    DiscoverableAdvertisement,
    Other(u8),
}

impl From<u8> for PacketSubtype {
    fn from(value: u8) -> Self {
        match value {
            0 => PacketSubtype::ConnectableAdvertisement,
            2 => PacketSubtype::NonConnectableAdvertisement,
            4 => PacketSubtype::ScanResponse,
            6 => PacketSubtype::DiscoverableAdvertisement,
            other => PacketSubtype::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Public,
    Random,
    Other(u8),
}

impl From<u8> for AddressType {
    fn from(value: u8) -> Self {
        match value {
            0 => AddressType::Public,
            1 => AddressType::Random,
            other => AddressType::Other(other),
        }
    }
}

pub const BOND_NONE: u8 = 0xFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisementReport {
    pub rssi: i8,
    pub packet_subtype: PacketSubtype,
    pub sender: BdAddr,
    pub address_type: AddressType,
    pub bond_handle: u8,
    pub raw_ad_data: Vec<u8>,
}

impl AdvertisementReport {
    pub fn is_bonded(&self) -> bool {
        self.bond_handle != BOND_NONE
    }
}

/// One decoded advertising data structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdField {
    Flags(u8),
    /// Service identifiers in display byte order (2, 4 or 16 bytes each)
    ServiceIds(Vec<Vec<u8>>),
    LocalName(Vec<u8>),
    TxPowerLevel(i8),
    ManufacturerData(Vec<u8>),
    Other { ad_type: u8, data: Vec<u8> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub sensor_id: u8,
    pub sequence_no: u16,
    pub clear: u16,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub color_temp: u16,
    pub lux: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    Incandescent,
    Fluorescent,
    Led,
    Sunlight,
    Unknown,
}

impl LightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightType::Incandescent => "Incandescent",
            LightType::Fluorescent => "Fluorescent",
            LightType::Led => "LED",
            LightType::Sunlight => "Sunlight",
            LightType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for LightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ClassificationRecord {
    pub device: String,
    pub stream_id: String,
    pub sensor_id: u8,
    pub timestamp: OffsetDateTime,
    pub sequence_no: u16,
    pub rssi: i8,
    pub light_type: LightType,
    pub color_temp: u16,
    pub lux: u16,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub clear: u16,
    pub ratio_compare: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bdaddr_display_is_reversed() {
        let addr = BdAddr([0x4C, 0x5D, 0x40, 0xE5, 0x98, 0xC0]);
        assert_eq!(addr.to_string(), "C098E5405D4C");
        assert_eq!(addr.display_order(), [0xC0, 0x98, 0xE5, 0x40, 0x5D, 0x4C]);
    }

    #[test]
    fn test_frame_to_bytes() {
        let frame = Frame {
            kind: FrameKind::Event,
            leading_byte: 0x80,
            payload_length: 2,
            packet_class: 0x06,
            packet_command: 0x00,
            payload: vec![0xAA, 0xBB],
        };
        assert_eq!(frame.to_bytes(), vec![0x80, 0x02, 0x06, 0x00, 0xAA, 0xBB]);
    }

    #[test]
    fn test_subtype_and_address_type_codes() {
        assert_eq!(PacketSubtype::from(4), PacketSubtype::ScanResponse);
        assert_eq!(PacketSubtype::from(9), PacketSubtype::Other(9));
        assert_eq!(AddressType::from(1), AddressType::Random);
        assert_eq!(LightType::Led.to_string(), "LED");
    }
}
