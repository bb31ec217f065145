use std::io::{ErrorKind, Read};

use bytes::Bytes;
use rplink_channel::ShutdownFlag;
use tracing::warn;

use crate::codec::FrameConfig;
use crate::reassembly::Reassembler;

/// Drives the blocking receive loop over any `Read` stream.
///
/// Completed messages are handed to the caller's handler synchronously, in
/// completion order, on the loop's own thread. There is no queue: a slow
/// handler stalls the loop.
pub struct FrameReceiver<T> {
    inner: T,
    reassembler: Reassembler,
    config: FrameConfig,
}

impl<T: Read> FrameReceiver<T> {
    /// Create a receiver with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a receiver with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            reassembler: Reassembler::with_policy(config.scan_policy),
            config,
        }
    }

    /// Run the receive loop until `shutdown` is triggered.
    ///
    /// Each iteration reads at least one header's worth of bytes while
    /// seeking and at least one byte while mid-payload. Read failures are
    /// logged and retried indefinitely with the reassembly state intact;
    /// the loop never terminates on its own. The flag is polled at the top
    /// of each iteration, so a read already blocked on the channel is only
    /// interrupted by closing the channel handle.
    pub fn run<F>(&mut self, shutdown: &ShutdownFlag, mut handler: F)
    where
        F: FnMut(u16, Bytes),
    {
        let mut scratch = vec![0u8; self.config.read_buffer_size];

        while !shutdown.is_triggered() {
            let min = self.reassembler.min_read().min(scratch.len());
            let read = match read_at_least(&mut self.inner, &mut scratch, min) {
                Ok(read) => read,
                Err(err) => {
                    warn!(%err, "link read failed");
                    continue;
                }
            };
            self.reassembler.push(&scratch[..read], &mut handler);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the receiver and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current receiver configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Block until at least `min` bytes have been read into `buf`.
///
/// End of stream before the minimum surfaces as `UnexpectedEof`; the
/// channel's read contract is that a healthy link never returns
/// zero-length reads.
fn read_at_least<T: Read>(inner: &mut T, buf: &mut [u8], min: usize) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < min {
        match inner.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "link returned end of stream",
                ));
            }
            Ok(read) => filled += read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
