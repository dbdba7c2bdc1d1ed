/// LPCSB colour sensor payload decoding
use crate::error::PayloadError;
use crate::models::SensorReading;

// LPCSB firmware constants
pub const SENSOR_ID: u8 = 0x44; // TCS3472 colour sensor board
pub const COMPANY_ID: u16 = 0x02E0; // Manufacturer ID advertised by the firmware
pub const RAW_COLOR_SERVICE: u8 = 0x31; // Service byte for raw colour readings
const MIN_PAYLOAD_LEN: usize = 23;

// Byte offsets into the whole advertisement data
const SENSOR_ID_OFFSET: usize = 8;
const CLEAR_OFFSET: usize = 9;
const RED_OFFSET: usize = 11;
const GREEN_OFFSET: usize = 13;
const BLUE_OFFSET: usize = 15;
const COLOR_TEMP_OFFSET: usize = 17;
const LUX_OFFSET: usize = 19;
const SEQUENCE_OFFSET: usize = 21;

/// Decode an LPCSB colour reading from advertisement data
///
/// The firmware advertises flags followed by one manufacturer-specific field,
/// and the reading sits at fixed offsets of the whole advertisement. Hex
/// character offsets, as printed in a raw dump, are twice the byte offsets:
/// - Bytes 0-7 (chars 0-15): Flags field, manufacturer field header, company ID, service byte
/// - Byte 8 (chars 16-17): Sensor ID (must be 0x44)
/// - Bytes 9-10 (chars 18-21): Clear channel
/// - Bytes 11-12 (chars 22-25): Red channel
/// - Bytes 13-14 (chars 26-29): Green channel
/// - Bytes 15-16 (chars 30-33): Blue channel
/// - Bytes 17-18 (chars 34-37): Colour temperature (K)
/// - Bytes 19-20 (chars 38-41): Illuminance (lux)
/// - Bytes 21-22 (chars 42-45): Sequence number
///
/// All fields are big-endian unsigned integers.
///
/// # Arguments
/// * `ad_data` - Raw advertisement data bytes carrying the manufacturer field
///
/// # Returns
/// The reading, or why the payload was rejected
pub fn extract_reading(ad_data: &[u8]) -> Result<SensorReading, PayloadError> {
    if ad_data.len() < MIN_PAYLOAD_LEN {
        return Err(PayloadError::Truncated {
            len: ad_data.len(),
            needed: MIN_PAYLOAD_LEN,
        });
    }

    let sensor_id = ad_data[SENSOR_ID_OFFSET];
    if sensor_id != SENSOR_ID {
        return Err(PayloadError::SensorIdMismatch(sensor_id));
    }

    let be_u16 = |offset: usize| u16::from_be_bytes([ad_data[offset], ad_data[offset + 1]]);

    Ok(SensorReading {
        sensor_id,
        sequence_no: be_u16(SEQUENCE_OFFSET),
        clear: be_u16(CLEAR_OFFSET),
        red: be_u16(RED_OFFSET),
        green: be_u16(GREEN_OFFSET),
        blue: be_u16(BLUE_OFFSET),
        color_temp: be_u16(COLOR_TEMP_OFFSET),
        lux: be_u16(LUX_OFFSET),
    })
}

/// Build the advertisement data the firmware sends for a reading
///
/// Flags (LE General Discoverable, BR/EDR not supported) followed by a
/// manufacturer field holding the company ID, the raw colour service byte and
/// the reading in the layout [`extract_reading`] expects.
pub fn encode_ad_data(reading: &SensorReading) -> Vec<u8> {
    let mut data = vec![0x02, 0x01, 0x06, 0x13, 0xFF];
    data.extend_from_slice(&COMPANY_ID.to_le_bytes());
    data.push(RAW_COLOR_SERVICE);
    data.push(reading.sensor_id);
    for v in [
        reading.clear,
        reading.red,
        reading.green,
        reading.blue,
        reading.color_temp,
        reading.lux,
        reading.sequence_no,
    ] {
        data.extend_from_slice(&v.to_be_bytes());
    }
    data
}
