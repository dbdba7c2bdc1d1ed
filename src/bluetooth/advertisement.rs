/// Advertising data (AD structure) decoding
use crate::models::AdField;

// AD type codes from the Bluetooth Core Specification Supplement
const AD_FLAGS: u8 = 0x01;
const AD_UUID16_PARTIAL: u8 = 0x02;
const AD_UUID16_COMPLETE: u8 = 0x03;
const AD_UUID32_PARTIAL: u8 = 0x04;
const AD_UUID32_COMPLETE: u8 = 0x05;
const AD_UUID128_PARTIAL: u8 = 0x06;
const AD_UUID128_COMPLETE: u8 = 0x07;
const AD_NAME_SHORT: u8 = 0x08;
const AD_NAME_COMPLETE: u8 = 0x09;
const AD_TX_POWER: u8 = 0x0A;
const AD_MANUFACTURER: u8 = 0xFF;

/// Split raw advertising data into typed fields, in the order they appear
///
/// Each structure is `[len, type, value...]` where `len` counts the type byte
/// and the value. Zero-length structures are skipped and a structure cut off by
/// the end of the data is dropped.
pub fn parse_ad_fields(data: &[u8]) -> Vec<AdField> {
    let mut fields = Vec::new();
    let mut record: Vec<u8> = Vec::new();
    let mut bytes_left = 0usize;

    for &b in data {
        if bytes_left == 0 {
            bytes_left = b as usize;
            record.clear();
        } else {
            record.push(b);
            bytes_left -= 1;
            if bytes_left == 0 {
                fields.push(classify_record(record[0], &record[1..]));
            }
        }
    }

    fields
}

fn classify_record(ad_type: u8, value: &[u8]) -> AdField {
    match ad_type {
        AD_FLAGS if !value.is_empty() => AdField::Flags(value[0]),
        AD_UUID16_PARTIAL | AD_UUID16_COMPLETE => AdField::ServiceIds(decode_service_ids(value, 2)),
        AD_UUID32_PARTIAL | AD_UUID32_COMPLETE => AdField::ServiceIds(decode_service_ids(value, 4)),
        AD_UUID128_PARTIAL | AD_UUID128_COMPLETE => {
            AdField::ServiceIds(decode_service_ids(value, 16))
        }
        AD_NAME_SHORT | AD_NAME_COMPLETE => AdField::LocalName(value.to_vec()),
        AD_TX_POWER if !value.is_empty() => AdField::TxPowerLevel(value[0] as i8),
        AD_MANUFACTURER => AdField::ManufacturerData(value.to_vec()),
        _ => AdField::Other {
            ad_type,
            data: value.to_vec(),
        },
    }
}

/// Decode a list of little-endian service identifiers into display order
///
/// Groups are taken from the end of the value; leftover bytes at the front are ignored.
pub fn decode_service_ids(value: &[u8], width: usize) -> Vec<Vec<u8>> {
    value
        .rchunks_exact(width)
        .map(|chunk| chunk.iter().rev().copied().collect())
        .collect()
}

/// Encode display-order identifiers into a transmission-order list value
pub fn encode_service_ids(ids: &[Vec<u8>]) -> Vec<u8> {
    ids.iter()
        .rev()
        .flat_map(|id| id.iter().rev().copied())
        .collect()
}

/// All service identifiers advertised across every list field
pub fn service_ids(fields: &[AdField]) -> impl Iterator<Item = &Vec<u8>> {
    fields.iter().flat_map(|field| match field {
        AdField::ServiceIds(ids) => ids.as_slice(),
        _ => &[],
    })
}

/// The first manufacturer-specific data field, if any
pub fn manufacturer_data(fields: &[AdField]) -> Option<&[u8]> {
    fields.iter().find_map(|field| match field {
        AdField::ManufacturerData(data) => Some(data.as_slice()),
        _ => None,
    })
}
