//! Loopback demo — frames a message through a socket pair and prints it.
//!
//! Run with:
//!   cargo run --example loopback

use std::os::unix::net::UnixStream;
use std::thread;

use rplink::channel::ShutdownFlag;
use rplink::frame::{FrameError, FrameReceiver, FrameWriter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (tx_stream, rx_stream) = UnixStream::pair()?;

    let sender = thread::spawn(move || -> Result<usize, FrameError> {
        let mut writer = FrameWriter::new(tx_stream);
        writer.send(0, b"hello from the application processor")
    });

    let shutdown = ShutdownFlag::new();
    let flag = shutdown.clone();

    let mut receiver = FrameReceiver::new(rx_stream);
    receiver.run(&shutdown, |channel, payload| {
        println!("channel {channel}: {}", String::from_utf8_lossy(&payload));
        flag.trigger();
    });

    let sent = sender.join().expect("sender thread panicked")?;
    eprintln!("{sent} bytes over the wire");
    Ok(())
}
