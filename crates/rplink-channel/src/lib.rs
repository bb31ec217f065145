//! Rpmsg channel lifecycle.
//!
//! Owns open/close of the character device that carries the link, plus the
//! cooperative shutdown flag the receive loop polls. This is the lowest
//! layer of rplink; framing builds on top of the [`RpmsgDevice`] handle
//! provided here.

pub mod device;
pub mod error;
pub mod shutdown;

pub use device::{close, RpmsgDevice};
pub use error::{ChannelError, Result};
pub use shutdown::ShutdownFlag;
