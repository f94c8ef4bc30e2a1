//! Command transport.
//!
//! Commands leave the process as single connectionless datagrams carrying the upper-case
//! command name. Delivery is best effort: no acknowledgment, no retry, no ordering.

mod udp;

use anyhow::{anyhow, Result};

use crate::command::CommandName;

pub use udp::{CommandReceiver, Received, UdpCommandSink};

/// Destination for outgoing command payloads.
///
/// A failed `send` is reported to the caller but never retried; the next frame supersedes it.
pub trait CommandSink {
    /// Sink identifier for logs.
    fn name(&self) -> &str;

    /// Sends one payload.
    fn send(&mut self, payload: &str) -> Result<()>;
}

impl<S: CommandSink + ?Sized> CommandSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(&mut self, payload: &str) -> Result<()> {
        (**self).send(payload)
    }
}

/// In-memory sink. Records every payload; used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.sent)
    }
}

impl CommandSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn send(&mut self, payload: &str) -> Result<()> {
        self.sent.push(payload.to_string());
        Ok(())
    }
}

/// Sink that only logs. Used for dry runs, where nothing may leave the process and nothing
/// may accumulate across a long-running loop.
#[derive(Debug, Default)]
pub struct LogSink {
    count: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads seen so far.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl CommandSink for LogSink {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn send(&mut self, payload: &str) -> Result<()> {
        self.count += 1;
        log::info!("dry run: would send {}", payload);
        Ok(())
    }
}

/// Decodes a received datagram into a command.
///
/// The payload must be exactly one command name: ASCII, upper-case, no padding.
pub fn decode_command(payload: &[u8]) -> Result<CommandName> {
    let text =
        std::str::from_utf8(payload).map_err(|_| anyhow!("command payload is not utf-8"))?;
    text.parse()
}
