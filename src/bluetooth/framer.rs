/// BGAPI frame reassembly from a raw serial byte stream
use crate::models::{Frame, FrameKind};

// BGAPI header constants
const HEADER_LEN: usize = 4;
const LEADING_RESPONSE: u8 = 0x00; // command/response, Bluetooth Smart, length high bits 0
const LEADING_EVENT: u8 = 0x80; // event, Bluetooth Smart, length high bits 0
const EVENT_BIT: u8 = 0x80;
const LENGTH_HIGH_MASK: u8 = 0x07;

/// Reassembles BGAPI frames one byte at a time
///
/// Framing is best-effort: a byte that cannot start a frame while the buffer
/// is empty is dropped, which lets the stream resynchronize after noise or a
/// partial read. Nothing here ever fails.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buffer: Vec<u8>,
    expected_len: usize,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the next byte; returns a frame when this byte completes one
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        match self.buffer.len() {
            0 => {
                if byte != LEADING_RESPONSE && byte != LEADING_EVENT {
                    return None;
                }
                self.buffer.push(byte);
            }
            1 => {
                self.buffer.push(byte);
                self.expected_len =
                    HEADER_LEN + (self.buffer[0] & LENGTH_HIGH_MASK) as usize + byte as usize;
            }
            _ => self.buffer.push(byte),
        }

        if self.expected_len > 0 && self.buffer.len() == self.expected_len {
            let frame = Self::split(&self.buffer);
            self.reset();
            return Some(frame);
        }

        None
    }

    /// Push a burst of bytes, collecting every frame it completes
    pub fn feed_all(&mut self, bytes: &[u8]) -> Vec<Frame> {
        bytes.iter().filter_map(|&b| self.feed(b)).collect()
    }

    /// Number of bytes held for a frame in progress
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.expected_len = 0;
    }

    fn split(buffer: &[u8]) -> Frame {
        let leading_byte = buffer[0];
        let kind = if leading_byte & EVENT_BIT == 0 {
            FrameKind::Response
        } else {
            FrameKind::Event
        };

        Frame {
            kind,
            leading_byte,
            payload_length: (leading_byte & LENGTH_HIGH_MASK) as u16 + buffer[1] as u16,
            packet_class: buffer[2],
            packet_command: buffer[3],
            payload: buffer[HEADER_LEN..].to_vec(),
        }
    }
}
