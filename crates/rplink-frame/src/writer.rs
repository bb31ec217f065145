use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::info;

use crate::codec::{encode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes framed messages to any `Write` stream as bounded fragments.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Transmit a complete frame.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<usize> {
        self.send(frame.channel, frame.payload.as_ref())
    }

    /// Frame and transmit a payload on a channel.
    ///
    /// The frame goes out as successive writes of at most
    /// `config.fragment_size` bytes, each fragment fully written before the
    /// next is attempted. A failed fragment aborts the remainder of the
    /// frame: whatever already reached the wire stays there, and the
    /// receiving side resynchronizes at the next preamble.
    ///
    /// Returns the total number of bytes transmitted.
    pub fn send(&mut self, channel: u16, payload: &[u8]) -> Result<usize> {
        self.buf.clear();
        encode_frame(channel, payload, &mut self.buf)?;

        for fragment in self.buf.chunks(self.config.fragment_size) {
            write_fragment(&mut self.inner, fragment)?;
        }
        flush_all(&mut self.inner)?;

        info!(bytes = self.buf.len(), channel, "frame forwarded");
        Ok(self.buf.len())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Issue one fragment as a single write call.
///
/// A short write means the channel did not take the whole fragment; the
/// device contract is all-or-error, so that is surfaced, not retried.
fn write_fragment<T: Write>(inner: &mut T, fragment: &[u8]) -> Result<()> {
    loop {
        match inner.write(fragment) {
            Ok(written) if written == fragment.len() => return Ok(()),
            Ok(written) => {
                return Err(FrameError::ShortWrite {
                    written,
                    expected: fragment.len(),
                })
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

fn flush_all<T: Write>(inner: &mut T) -> Result<()> {
    loop {
        match inner.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{FRAGMENT_SIZE, HEADER_SIZE};

    /// Records every write call as a separate fragment.
    #[derive(Default)]
    struct RecordingWriter {
        writes: Vec<Vec<u8>>,
    }

    impl Write for RecordingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn expected_wire(channel: u16, payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(channel, payload, &mut buf).unwrap();
        buf.to_vec()
    }

    #[test]
    fn small_frame_is_one_write() {
        let mut writer = FrameWriter::new(RecordingWriter::default());
        let sent = writer.send(1, b"hello").unwrap();

        let recorder = writer.into_inner();
        assert_eq!(sent, HEADER_SIZE + 5);
        assert_eq!(recorder.writes.len(), 1);
        assert_eq!(recorder.writes[0], expected_wire(1, b"hello"));
    }

    #[test]
    fn empty_payload_is_a_header_only_write() {
        let mut writer = FrameWriter::new(RecordingWriter::default());
        let sent = writer.send(0, b"").unwrap();

        let recorder = writer.into_inner();
        assert_eq!(sent, HEADER_SIZE);
        assert_eq!(recorder.writes.len(), 1);
        assert_eq!(recorder.writes[0].len(), HEADER_SIZE);
    }

    #[test]
    fn large_frame_fragments_to_the_cap() {
        let payload = vec![0x42; 1000];
        let mut writer = FrameWriter::new(RecordingWriter::default());
        let sent = writer.send(3, &payload).unwrap();

        let frame = expected_wire(3, &payload);
        assert_eq!(sent, frame.len()); // 1016

        let recorder = writer.into_inner();
        assert_eq!(recorder.writes.len(), frame.len().div_ceil(FRAGMENT_SIZE));
        assert!(recorder.writes.iter().all(|w| w.len() <= FRAGMENT_SIZE));
        assert_eq!(recorder.writes.concat(), frame);
    }

    #[test]
    fn frame_filling_fragments_exactly_has_no_runt() {
        // 944-byte payload -> 960-byte frame -> two full fragments.
        let payload = vec![0x17; 2 * FRAGMENT_SIZE - HEADER_SIZE];
        let mut writer = FrameWriter::new(RecordingWriter::default());
        writer.send(4, &payload).unwrap();

        let recorder = writer.into_inner();
        assert_eq!(recorder.writes.len(), 2);
        assert!(recorder.writes.iter().all(|w| w.len() == FRAGMENT_SIZE));
    }

    #[test]
    fn custom_fragment_size_is_honored() {
        let config = FrameConfig {
            fragment_size: 8,
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config(RecordingWriter::default(), config);
        writer.send(5, b"0123456789").unwrap();

        let frame = expected_wire(5, b"0123456789"); // 26 bytes
        let recorder = writer.into_inner();
        assert_eq!(recorder.writes.len(), 4);
        assert_eq!(recorder.writes.concat(), frame);
        assert_eq!(recorder.writes.last().unwrap().len(), 2);
    }

    #[test]
    fn failed_fragment_aborts_the_rest() {
        struct FailSecondWrite {
            calls: usize,
            completed: Vec<Vec<u8>>,
        }
        impl Write for FailSecondWrite {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.calls += 1;
                if self.calls == 2 {
                    return Err(std::io::Error::other("device gone"));
                }
                self.completed.push(buf.to_vec());
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = FrameWriter::new(FailSecondWrite {
            calls: 0,
            completed: Vec::new(),
        });
        let err = writer.send(1, &vec![0u8; 1200]).unwrap_err();

        assert!(matches!(err, FrameError::Io(_)));
        let inner = writer.into_inner();
        assert_eq!(inner.calls, 2, "no fragment attempted after the failure");
        assert_eq!(inner.completed.len(), 1);
    }

    #[test]
    fn short_write_is_an_error() {
        struct HalfWriter;
        impl Write for HalfWriter {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                Ok(buf.len() / 2)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = FrameWriter::new(HalfWriter);
        let err = writer.send(1, b"data").unwrap_err();
        assert!(matches!(err, FrameError::ShortWrite { written: 10, .. }));
    }

    #[test]
    fn interrupted_write_retries_the_same_fragment() {
        struct InterruptedOnce {
            interrupted: bool,
            writes: Vec<Vec<u8>>,
        }
        impl Write for InterruptedOnce {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                self.writes.push(buf.to_vec());
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = FrameWriter::new(InterruptedOnce {
            interrupted: false,
            writes: Vec::new(),
        });
        writer.send(2, b"retry").unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.writes.len(), 1);
        assert_eq!(inner.writes[0], expected_wire(2, b"retry"));
    }

    #[test]
    fn written_bytes_reassemble() {
        let payload = vec![0x7E; 2500];
        let mut writer = FrameWriter::new(RecordingWriter::default());
        writer.send(9, &payload).unwrap();

        let recorder = writer.into_inner();
        let mut reassembler = crate::reassembly::Reassembler::new();
        let mut got = Vec::new();
        for fragment in &recorder.writes {
            reassembler.push(fragment, |channel, body| {
                got.push((channel, body.to_vec()));
            });
        }

        assert_eq!(got, vec![(9, payload)]);
    }
}
