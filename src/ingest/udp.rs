//! UDP landmark source.
//!
//! Receives one JSON-encoded [`LandmarkFrame`] per datagram from an external landmark
//! detector. Malformed datagrams are logged and dropped; the stream continues. Sender
//! timestamps are discarded so live frames are timed by the local clock.

use anyhow::{anyhow, Context, Result};
use std::net::UdpSocket;
use std::time::{Duration, Instant};
use url::Url;

use super::{health_grace, SourceConfig, SourceEvent, SourceStats};
use crate::landmark::LandmarkFrame;

const MAX_FRAME_BYTES: usize = 64 * 1024;
const POLL_TIMEOUT: Duration = Duration::from_millis(250);

pub(super) struct UdpLandmarkSource {
    config: SourceConfig,
    socket: UdpSocket,
    packet: Box<[u8]>,
    connected_at: Option<Instant>,
    last_frame_at: Option<Instant>,
    frame_count: u64,
    rejected: u64,
}

impl UdpLandmarkSource {
    pub(super) fn new(config: SourceConfig, url: &Url) -> Result<Self> {
        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("udp url missing host"))?;
        let port = url.port().ok_or_else(|| anyhow!("udp url missing port"))?;
        let bind_addr = format!("{}:{}", host, port);
        let socket = UdpSocket::bind(&bind_addr)
            .with_context(|| format!("bind udp socket on {}", bind_addr))?;
        Ok(Self {
            config,
            socket,
            packet: vec![0u8; MAX_FRAME_BYTES].into_boxed_slice(),
            connected_at: None,
            last_frame_at: None,
            frame_count: 0,
            rejected: 0,
        })
    }

    pub(super) fn connect(&mut self) -> Result<()> {
        self.socket
            .set_read_timeout(Some(POLL_TIMEOUT))
            .context("set udp read timeout")?;
        self.connected_at = Some(Instant::now());
        log::info!(
            "LandmarkSource: listening on {}",
            self.socket
                .local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| self.config.url.clone())
        );
        Ok(())
    }

    pub(super) fn next_event(&mut self) -> Result<SourceEvent> {
        if self.connected_at.is_none() {
            return Err(anyhow!("udp landmark source not connected; call connect() first"));
        }

        let (len, from) = match self.socket.recv_from(&mut self.packet) {
            Ok(received) => received,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                return Ok(SourceEvent::Idle)
            }
            Err(e) => return Err(e).context("recv udp landmark frame"),
        };

        let frame = std::str::from_utf8(&self.packet[..len])
            .map_err(|_| anyhow!("landmark datagram is not utf-8"))
            .and_then(LandmarkFrame::from_json);
        match frame {
            Ok(mut frame) => {
                // Live frames are evaluated on the local clock; sender clocks can restart.
                frame.timestamp_ms = None;
                self.frame_count += 1;
                self.last_frame_at = Some(Instant::now());
                Ok(SourceEvent::Frame(frame))
            }
            Err(e) => {
                self.rejected += 1;
                log::warn!(
                    "dropping landmark datagram from {} ({} rejected so far): {}",
                    from,
                    self.rejected,
                    e
                );
                Ok(SourceEvent::Idle)
            }
        }
    }

    pub(super) fn is_healthy(&self) -> bool {
        let Some(connected_at) = self.connected_at else {
            return false;
        };
        let Some(last_frame_at) = self.last_frame_at else {
            return connected_at.elapsed() <= Duration::from_secs(5);
        };
        last_frame_at.elapsed() <= health_grace(self.config.target_fps)
    }

    pub(super) fn stats(&self) -> SourceStats {
        SourceStats {
            frames_received: self.frame_count,
            source: self.config.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::HandPose;

    fn bound_source() -> UdpLandmarkSource {
        let url = Url::parse("udp://127.0.0.1:0").unwrap();
        let mut source = UdpLandmarkSource::new(
            SourceConfig {
                url: url.to_string(),
                target_fps: 30,
            },
            &url,
        )
        .unwrap();
        source.connect().unwrap();
        source
    }

    #[test]
    fn receives_frames_and_drops_garbage() {
        let mut source = bound_source();
        let addr = source.socket.local_addr().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();

        sender.send_to(b"not a frame", addr).unwrap();
        let frame = LandmarkFrame::with_hand(HandPose::open().landmarks());
        let json = serde_json::to_vec(&frame).unwrap();
        sender.send_to(&json, addr).unwrap();

        assert_eq!(source.next_event().unwrap(), SourceEvent::Idle);
        match source.next_event().unwrap() {
            SourceEvent::Frame(received) => {
                let wrist = received.primary_hand().unwrap().wrist();
                assert!((wrist.x - frame.hands[0].wrist().x).abs() < 1e-6);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(source.rejected, 1);
        assert!(source.is_healthy());
    }

    #[test]
    fn live_frames_drop_sender_timestamps() {
        let mut source = bound_source();
        let addr = source.socket.local_addr().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();

        for ts in [5000u64, 0] {
            let mut frame = LandmarkFrame::with_hand(HandPose::open().landmarks());
            frame.timestamp_ms = Some(ts);
            sender.send_to(&serde_json::to_vec(&frame).unwrap(), addr).unwrap();
            match source.next_event().unwrap() {
                SourceEvent::Frame(received) => assert_eq!(received.timestamp_ms, None),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(source.stats().frames_received, 2);
    }

    #[test]
    fn times_out_to_idle() {
        let mut source = bound_source();
        assert_eq!(source.next_event().unwrap(), SourceEvent::Idle);
        assert_eq!(source.stats().frames_received, 0);
    }
}
