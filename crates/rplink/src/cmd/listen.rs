use rplink_channel::{RpmsgDevice, ShutdownFlag};
use rplink_frame::{Frame, FrameReceiver};

use crate::cmd::ListenArgs;
use crate::exit::{channel_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_message, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let device = RpmsgDevice::open(&args.device).map_err(|err| channel_error("open failed", err))?;
    let Some(device) = device else {
        return Err(CliError::new(USAGE, "device path must not be empty"));
    };

    let shutdown = ShutdownFlag::new();
    install_ctrlc_handler(shutdown.clone())?;

    let mut receiver = FrameReceiver::new(device);
    let mut printed = 0usize;
    let flag = shutdown.clone();

    receiver.run(&shutdown, |channel, payload| {
        if let Some(channels) = &args.channels {
            if !channels.contains(&channel) {
                return;
            }
        }

        print_message(&Frame::new(channel, payload), format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                flag.trigger();
            }
        }
    });

    Ok(SUCCESS)
}

fn install_ctrlc_handler(shutdown: ShutdownFlag) -> CliResult<()> {
    ctrlc::set_handler(move || {
        shutdown.trigger();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
