//! command_listener - actuator-side stand-in
//!
//! Binds a UDP port and logs every command datagram it receives. Useful for checking what a
//! relay actually sends without real hardware attached.

use anyhow::Result;
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gesture_relay::CommandReceiver;

#[derive(Parser, Debug)]
#[command(author, version, about = "Log command datagrams received over UDP")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "GESTURE_LISTEN_ADDR", default_value = "0.0.0.0:1234")]
    bind: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let receiver = CommandReceiver::bind(&args.bind)?;
    receiver.set_timeout(Some(Duration::from_millis(250)))?;
    log::info!("command_listener listening on {}", receiver.local_addr()?);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    let mut accepted = 0u64;
    let mut rejected = 0u64;
    while running.load(Ordering::SeqCst) {
        let Some(datagram) = receiver.recv()? else {
            continue;
        };
        match datagram.command() {
            Ok(command) => {
                accepted += 1;
                log::info!("{} from {}", command, datagram.from);
            }
            Err(e) => {
                rejected += 1;
                log::warn!(
                    "unrecognised payload from {} ({} bytes): {}",
                    datagram.from,
                    datagram.payload.len(),
                    e
                );
            }
        }
    }

    log::info!(
        "command_listener stopped ({} commands, {} rejected)",
        accepted,
        rejected
    );
    Ok(())
}
