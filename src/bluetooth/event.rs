/// Decoding of BGAPI events into advertisement reports
use crate::error::IgnoreReason;
use crate::models::{AdvertisementReport, BdAddr, Frame, FrameKind};

// BGAPI class/command identifiers
pub const CLASS_GAP: u8 = 0x06;
pub const EVT_GAP_SCAN_RESPONSE: u8 = 0x00;

/// Fixed part of gap_scan_response: rssi, packet_type, sender[6], address_type, bond, data_len
const SCAN_RESPONSE_HEADER_LEN: usize = 11;

/// Decode a gap_scan_response event into an advertisement report
///
/// Layout of the event payload:
/// - Byte 0: RSSI (signed, dBm)
/// - Byte 1: Packet type (0 = connectable adv, 2 = non-connectable, 4 = scan response, 6 = discoverable)
/// - Bytes 2-7: Sender address, least significant byte first
/// - Byte 8: Address type (0 = public, 1 = random)
/// - Byte 9: Bond handle (255 = no bond)
/// - Byte 10: Advertisement data length
/// - Bytes 11..: Advertisement data
///
/// The declared data length is clamped to the bytes actually present.
/// Every other frame is ignored rather than treated as an error.
pub fn decode_event(frame: &Frame) -> Result<AdvertisementReport, IgnoreReason> {
    if frame.kind == FrameKind::Response {
        return Err(IgnoreReason::Response {
            class: frame.packet_class,
            command: frame.packet_command,
        });
    }

    if frame.packet_class != CLASS_GAP || frame.packet_command != EVT_GAP_SCAN_RESPONSE {
        return Err(IgnoreReason::UnhandledEvent {
            class: frame.packet_class,
            command: frame.packet_command,
        });
    }

    let payload = &frame.payload;
    if payload.len() < SCAN_RESPONSE_HEADER_LEN {
        return Err(IgnoreReason::TruncatedEvent { len: payload.len() });
    }

    let mut sender = [0u8; 6];
    sender.copy_from_slice(&payload[2..8]);

    let declared = payload[10] as usize;
    let end = (SCAN_RESPONSE_HEADER_LEN + declared).min(payload.len());

    Ok(AdvertisementReport {
        rssi: payload[0] as i8,
        packet_subtype: payload[1].into(),
        sender: BdAddr(sender),
        address_type: payload[8].into(),
        bond_handle: payload[9],
        raw_ad_data: payload[SCAN_RESPONSE_HEADER_LEN..end].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AddressType, PacketSubtype};

    fn scan_frame(payload: Vec<u8>) -> Frame {
        Frame {
            kind: FrameKind::Event,
            leading_byte: 0x80,
            payload_length: payload.len() as u16,
            packet_class: CLASS_GAP,
            packet_command: EVT_GAP_SCAN_RESPONSE,
            payload,
        }
    }

    #[test]
    fn test_decode_scan_response() {
        let mut payload = vec![
            0xC7, // -57 dBm
            0x04, // scan response
            0x4C, 0x5D, 0x40, 0xE5, 0x98, 0xC0, // C0:98:E5:40:5D:4C
            0x01, // random
            0xFF, // not bonded
            0x03, // data length
        ];
        payload.extend_from_slice(&[0x02, 0x01, 0x06]);

        let report = decode_event(&scan_frame(payload)).unwrap();
        assert_eq!(report.rssi, -57);
        assert_eq!(report.packet_subtype, PacketSubtype::ScanResponse);
        assert_eq!(report.sender.to_string(), "C098E5405D4C");
        assert_eq!(report.address_type, AddressType::Random);
        assert!(!report.is_bonded());
        assert_eq!(report.raw_ad_data, vec![0x02, 0x01, 0x06]);
    }

    #[test]
    fn test_declared_length_is_clamped() {
        let mut payload = vec![0xB0, 0x00, 1, 2, 3, 4, 5, 6, 0x00, 0xFF, 0x10];
        payload.extend_from_slice(&[0xAA, 0xBB]);
        let report = decode_event(&scan_frame(payload)).unwrap();
        assert_eq!(report.raw_ad_data, vec![0xAA, 0xBB]);
    }

    #[test]
    fn test_trailing_bytes_beyond_declared_length_are_dropped() {
        let mut payload = vec![0xB0, 0x00, 1, 2, 3, 4, 5, 6, 0x00, 0xFF, 0x01];
        payload.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        let report = decode_event(&scan_frame(payload)).unwrap();
        assert_eq!(report.raw_ad_data, vec![0xAA]);
    }

    #[test]
    fn test_ignores_other_frames() {
        let mut frame = scan_frame(vec![0; 11]);
        frame.kind = FrameKind::Response;
        assert_eq!(
            decode_event(&frame),
            Err(IgnoreReason::Response { class: 0x06, command: 0x00 })
        );

        let mut frame = scan_frame(vec![0; 11]);
        frame.packet_class = 0x00;
        frame.packet_command = 0x02;
        assert_eq!(
            decode_event(&frame),
            Err(IgnoreReason::UnhandledEvent { class: 0x00, command: 0x02 })
        );

        assert_eq!(
            decode_event(&scan_frame(vec![0; 5])),
            Err(IgnoreReason::TruncatedEvent { len: 5 })
        );
    }
}
