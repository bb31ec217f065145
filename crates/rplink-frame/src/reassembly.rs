use bytes::{Buf, Bytes, BytesMut};

use crate::codec::{locate_preamble, ScanPolicy, WireHeader, HEADER_SIZE};

/// Reconstructs length-delimited messages from an arbitrarily chunked
/// byte stream.
///
/// Two states: seeking a header (no message in progress) and accumulating
/// payload for a parsed header. Bytes beyond the current message's needs
/// are retained as carryover and drained before more input is requested,
/// so one [`push`](Self::push) can emit any number of messages.
///
/// Bytes that precede the chosen preamble are discarded without any error
/// surfaced; resynchronization at the next marker is the protocol's only
/// recovery mechanism and consumers rely on it being silent.
#[derive(Debug, Default)]
pub struct Reassembler {
    policy: ScanPolicy,
    pending: Option<WireHeader>,
    accumulator: BytesMut,
    carryover: BytesMut,
}

impl Reassembler {
    /// Create a reassembler with the default scan policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reassembler with an explicit preamble scan policy.
    pub fn with_policy(policy: ScanPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Minimum number of bytes the next read should deliver: a whole
    /// header while seeking, a single byte while mid-payload.
    pub fn min_read(&self) -> usize {
        if self.pending.is_some() {
            1
        } else {
            HEADER_SIZE
        }
    }

    /// Whether a header has been parsed and payload is being collected.
    pub fn is_accumulating(&self) -> bool {
        self.pending.is_some()
    }

    /// Feed one chunk of raw channel bytes, invoking `emit` once per
    /// message completed by it, in completion order.
    pub fn push<F>(&mut self, chunk: &[u8], mut emit: F)
    where
        F: FnMut(u16, Bytes),
    {
        self.carryover.extend_from_slice(chunk);

        loop {
            match self.pending {
                None => {
                    let Some(at) = locate_preamble(&self.carryover, self.policy) else {
                        // No marker. Everything stays buffered: the tail
                        // may hold a marker split across chunk boundaries.
                        return;
                    };
                    if self.carryover.len() - at < HEADER_SIZE {
                        // Marker found but the header is still short.
                        // Drop the prefix, keep from the marker on.
                        self.carryover.advance(at);
                        return;
                    }
                    let header = WireHeader::parse(&self.carryover[at..at + HEADER_SIZE]);
                    self.carryover.advance(at + HEADER_SIZE);
                    self.accumulator.clear();
                    self.pending = Some(header);
                }
                Some(header) => {
                    let needed = header.payload_len as usize - self.accumulator.len();
                    let take = needed.min(self.carryover.len());
                    self.accumulator.extend_from_slice(&self.carryover[..take]);
                    self.carryover.advance(take);

                    if self.accumulator.len() >= header.payload_len as usize {
                        self.pending = None;
                        emit(header.channel, self.accumulator.split().freeze());
                    } else {
                        // Mid-payload and out of bytes.
                        return;
                    }
                }
            }
        }
    }
}
