//! Framed messaging over remote-processor (rpmsg) links.
//!
//! rplink reconstructs discrete, length-prefixed messages from the
//! arbitrarily chunked byte stream of an rpmsg character device and
//! transmits messages as bounded-size fragments compatible with the
//! channel's maximum write size.
//!
//! # Crate Structure
//!
//! - [`channel`] — Device lifecycle and shutdown signalling
//! - [`frame`] — Wire format, stream reassembly, fragmented transmission

/// Re-export channel types.
pub mod channel {
    pub use rplink_channel::*;
}

/// Re-export frame types.
pub mod frame {
    pub use rplink_frame::*;
}
