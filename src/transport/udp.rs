use anyhow::{anyhow, Context, Result};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use super::{decode_command, CommandSink};
use crate::command::CommandName;

const MAX_COMMAND_BYTES: usize = 512;

/// Fire-and-forget UDP command sink.
///
/// The target is resolved once at construction. The socket is non-blocking, so a full send
/// buffer surfaces as a send error rather than stalling the frame loop.
pub struct UdpCommandSink {
    socket: UdpSocket,
    target: SocketAddr,
    label: String,
}

impl UdpCommandSink {
    pub fn new(target: &str) -> Result<Self> {
        let target_addr = target
            .to_socket_addrs()
            .with_context(|| format!("resolve command sink address {}", target))?
            .next()
            .ok_or_else(|| anyhow!("command sink address {} resolved to nothing", target))?;
        let bind_addr = if target_addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr)
            .with_context(|| format!("bind udp socket on {}", bind_addr))?;
        socket
            .set_nonblocking(true)
            .context("set udp socket non-blocking")?;
        log::info!("udp command sink targeting {}", target_addr);
        Ok(Self {
            socket,
            target: target_addr,
            label: format!("udp://{}", target_addr),
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl CommandSink for UdpCommandSink {
    fn name(&self) -> &str {
        &self.label
    }

    fn send(&mut self, payload: &str) -> Result<()> {
        let sent = self
            .socket
            .send_to(payload.as_bytes(), self.target)
            .with_context(|| format!("send to {}", self.target))?;
        if sent != payload.len() {
            return Err(anyhow!(
                "short datagram to {} ({} of {} bytes)",
                self.target,
                sent,
                payload.len()
            ));
        }
        Ok(())
    }
}

/// One datagram received by a [`CommandReceiver`].
#[derive(Clone, Debug)]
pub struct Received {
    pub from: SocketAddr,
    pub payload: Vec<u8>,
}

impl Received {
    pub fn command(&self) -> Result<CommandName> {
        decode_command(&self.payload)
    }
}

/// Actuator-side UDP endpoint.
pub struct CommandReceiver {
    socket: UdpSocket,
}

impl CommandReceiver {
    pub fn bind(addr: &str) -> Result<Self> {
        let socket =
            UdpSocket::bind(addr).with_context(|| format!("bind udp socket on {}", addr))?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().context("query udp local address")
    }

    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket
            .set_read_timeout(timeout)
            .context("set udp read timeout")
    }

    /// Waits for the next datagram. Returns `None` when the read timeout expires.
    pub fn recv(&self) -> Result<Option<Received>> {
        let mut buf = [0u8; MAX_COMMAND_BYTES];
        match self.socket.recv_from(&mut buf) {
            Ok((len, from)) => Ok(Some(Received {
                from,
                payload: buf[..len].to_vec(),
            })),
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e).context("recv udp command"),
        }
    }
}
