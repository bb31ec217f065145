use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Wire header size: preamble (4) + channel (2) + reserved (2) +
/// sequence (4) + payload length (4) = 16 bytes.
pub const HEADER_SIZE: usize = 16;

/// Synchronization marker, 0xBEAFBEAF little-endian.
pub const PREAMBLE: u32 = 0xBEAF_BEAF;

/// The preamble as it appears in the byte stream: `AF BE AF BE`.
pub const PREAMBLE_BYTES: [u8; 4] = PREAMBLE.to_le_bytes();

/// Reserved header word; the transmitter always writes this value.
pub const RESERVED: u16 = 0xFFFF;

/// Largest single write issued to the channel.
pub const FRAGMENT_SIZE: usize = 480;

/// Receive-loop scratch buffer size. A convention of the reference channel,
/// not a protocol constant; inbound chunks may arrive at any granularity.
pub const READ_BUFFER_SIZE: usize = 2048;

/// A reassembled message with its channel routing.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The logical sub-channel this message belongs to.
    pub channel: u16,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(channel: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            channel,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Parsed wire header.
///
/// `sequence` is carried for wire compatibility only: the transmitter
/// always writes zero and the receiver never consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireHeader {
    pub channel: u16,
    pub sequence: u32,
    pub payload_len: u32,
}

impl WireHeader {
    /// Decode the fixed header from the front of `buf`.
    ///
    /// Callers locate the preamble first; `buf` must start at the marker
    /// and hold at least [`HEADER_SIZE`] bytes.
    pub fn parse(buf: &[u8]) -> Self {
        debug_assert!(buf.len() >= HEADER_SIZE);
        Self {
            channel: u16::from_le_bytes(buf[4..6].try_into().unwrap()),
            sequence: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
            payload_len: u32::from_le_bytes(buf[12..16].try_into().unwrap()),
        }
    }
}

/// Encode a frame into the wire format.
///
/// Wire format (all fields little-endian):
/// ```text
/// ┌────────────┬─────────┬──────────┬──────────┬─────────┬──────────────┐
/// │ Preamble   │ Channel │ Reserved │ Sequence │ Length  │ Payload      │
/// │ AF BE AF BE│ (2B)    │ FF FF    │ (4B)     │ (4B)    │ Length bytes │
/// └────────────┴─────────┴──────────┴──────────┴─────────┴──────────────┘
/// ```
pub fn encode_frame(channel: u16, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u32_le(PREAMBLE);
    dst.put_u16_le(channel);
    dst.put_u16_le(RESERVED);
    dst.put_u32_le(0); // sequence: write-only, receivers ignore it
    dst.put_u32_le(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Which candidate wins when the scan window holds several preambles.
///
/// The link has always resolved ambiguity toward the most recent candidate,
/// so `LastMatch` is the wire-compatible default. `FirstMatch` is the
/// conventional stream-synchronization alternative, available for interop
/// experiments against receivers that disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanPolicy {
    /// Use the last occurrence found in the buffer.
    #[default]
    LastMatch,
    /// Use the first occurrence found in the buffer.
    FirstMatch,
}

/// Find the preamble in `buf` per the given policy.
pub fn locate_preamble(buf: &[u8], policy: ScanPolicy) -> Option<usize> {
    if buf.len() < PREAMBLE_BYTES.len() {
        return None;
    }
    let mut windows = buf.windows(PREAMBLE_BYTES.len());
    match policy {
        ScanPolicy::LastMatch => windows.rposition(|w| w == PREAMBLE_BYTES),
        ScanPolicy::FirstMatch => windows.position(|w| w == PREAMBLE_BYTES),
    }
}

/// Configuration for the framing layer.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Largest single write issued to the channel. Default: 480.
    pub fragment_size: usize,
    /// Receive-loop scratch buffer size. Default: 2048.
    pub read_buffer_size: usize,
    /// Preamble ambiguity resolution. Default: last match.
    pub scan_policy: ScanPolicy,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            fragment_size: FRAGMENT_SIZE,
            read_buffer_size: READ_BUFFER_SIZE,
            scan_policy: ScanPolicy::default(),
        }
    }
}
