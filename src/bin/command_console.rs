//! command_console - type commands, send them to the actuator
//!
//! Reads one command per line from stdin, upper-cases it, and sends it verbatim as a single
//! datagram. Names outside the command set are sent anyway (with a warning) so the actuator's
//! handling of unknown payloads can be exercised.

use anyhow::Result;
use clap::Parser;
use std::io::{BufRead, Write};

use gesture_relay::config::validate_sink_addr;
use gesture_relay::{CommandName, CommandSink, UdpCommandSink};

#[derive(Parser, Debug)]
#[command(author, version, about = "Send commands to a UDP actuator by hand")]
struct Args {
    /// Actuator address (host:port).
    #[arg(long, env = "GESTURE_SINK_ADDR", default_value = "127.0.0.1:1234")]
    sink: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    validate_sink_addr(&args.sink)?;
    let mut sink = UdpCommandSink::new(&args.sink)?;

    println!(
        "Sending to {}. Commands: {}",
        sink.name(),
        CommandName::ALL.map(CommandName::as_str).join(" ")
    );

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Command: ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let command = line?.trim().to_uppercase();
        if command.is_empty() {
            continue;
        }
        if command.parse::<CommandName>().is_err() {
            log::warn!("'{}' is not a known command; sending anyway", command);
        }
        match sink.send(&command) {
            Ok(()) => println!("Sent: {}", command),
            Err(e) => log::warn!("send failed: {:#}", e),
        }
    }
    println!();
    Ok(())
}
