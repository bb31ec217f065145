//! Preamble-synchronized message framing for rpmsg links.
//!
//! This is the core value-add layer of rplink. Every message travels as a
//! 16-byte little-endian header followed by its payload:
//! - A 4-byte preamble (`AF BE AF BE`) for stream synchronization
//! - A 2-byte channel ID for logical sub-channel routing
//! - A 2-byte reserved word (`0xFFFF` on send)
//! - A 4-byte sequence ID (zero on send, ignored on receive)
//! - A 4-byte payload length
//!
//! The receive side reassembles complete messages out of arbitrarily
//! chunked reads; the send side fragments frames down to the channel's
//! maximum write size. No partial reads, no buffer management in user code.

pub mod codec;
pub mod error;
pub mod reader;
pub mod reassembly;
pub mod writer;

pub use codec::{
    encode_frame, locate_preamble, Frame, FrameConfig, ScanPolicy, WireHeader, FRAGMENT_SIZE,
    HEADER_SIZE, PREAMBLE, PREAMBLE_BYTES, READ_BUFFER_SIZE, RESERVED,
};
pub use error::{FrameError, Result};
pub use reader::FrameReceiver;
pub use reassembly::Reassembler;
pub use writer::FrameWriter;
