use std::fs;

use rplink_channel::RpmsgDevice;
use rplink_frame::FrameWriter;

use crate::cmd::SendArgs;
use crate::exit::{channel_error, frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::OutputFormat;

pub fn run(args: SendArgs, _format: OutputFormat) -> CliResult<i32> {
    let device = RpmsgDevice::open(&args.device).map_err(|err| channel_error("open failed", err))?;
    let Some(device) = device else {
        return Err(CliError::new(USAGE, "device path must not be empty"));
    };

    let payload = resolve_payload(&args)?;
    let mut writer = FrameWriter::new(device);
    writer
        .send(args.channel, &payload)
        .map_err(|err| frame_error("send failed", err))?;

    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(hex) = &args.hex {
        return decode_hex(hex);
    }
    if let Some(path) = &args.file {
        return fs::read(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        });
    }
    Ok(Vec::new())
}

fn decode_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(CliError::new(
            USAGE,
            "--hex needs an even number of hex digits",
        ));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let hi = pair[0]
                .to_digit(16)
                .ok_or_else(|| CliError::new(USAGE, format!("invalid hex digit: {}", pair[0])))?;
            let lo = pair[1]
                .to_digit(16)
                .ok_or_else(|| CliError::new(USAGE, format!("invalid hex digit: {}", pair[1])))?;
            Ok((hi * 16 + lo) as u8)
        })
        .collect()
}
