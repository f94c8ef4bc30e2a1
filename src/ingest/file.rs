//! JSON Lines landmark recordings.
//!
//! One [`LandmarkFrame`] per line. Frames with `timestamp_ms` are replayed as fast as they
//! can be read; the frame loop uses the recorded times, which must not decrease. Frames
//! without one are paced to `target_fps`.

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;

use super::{frame_interval, SourceConfig, SourceEvent, SourceStats};
use crate::landmark::LandmarkFrame;

pub(super) struct FileLandmarkSource {
    config: SourceConfig,
    path: PathBuf,
    reader: Option<Box<dyn BufRead + Send>>,
    line_number: u64,
    frame_count: u64,
    last_frame_at: Option<Instant>,
    last_timestamp_ms: Option<u64>,
    ended: bool,
}

impl FileLandmarkSource {
    pub(super) fn new(config: SourceConfig, path: PathBuf) -> Self {
        Self {
            config,
            path,
            reader: None,
            line_number: 0,
            frame_count: 0,
            last_frame_at: None,
            last_timestamp_ms: None,
            ended: false,
        }
    }

    #[cfg(test)]
    fn from_reader(config: SourceConfig, reader: Box<dyn BufRead + Send>) -> Self {
        let mut source = Self::new(config, PathBuf::from("<memory>"));
        source.reader = Some(reader);
        source
    }

    pub(super) fn connect(&mut self) -> Result<()> {
        let reader: Box<dyn BufRead + Send> = if self.path.as_os_str() == "-" {
            Box::new(BufReader::new(io::stdin()))
        } else {
            let file = File::open(&self.path)
                .with_context(|| format!("open landmark recording {}", self.path.display()))?;
            Box::new(BufReader::new(file))
        };
        self.reader = Some(reader);
        log::info!("LandmarkSource: reading {}", self.path.display());
        Ok(())
    }

    pub(super) fn next_event(&mut self) -> Result<SourceEvent> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| anyhow!("landmark file source not connected; call connect() first"))?;

        let mut line = String::new();
        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .with_context(|| format!("read {}", self.path.display()))?;
            if read == 0 {
                self.ended = true;
                return Ok(SourceEvent::Ended);
            }
            self.line_number += 1;
            if !line.trim().is_empty() {
                break;
            }
        }

        let frame = LandmarkFrame::from_json(line.trim())
            .with_context(|| format!("{}:{}", self.path.display(), self.line_number))?;

        if let (Some(ts), Some(last)) = (frame.timestamp_ms, self.last_timestamp_ms) {
            if ts < last {
                return Err(anyhow!(
                    "{}:{}: timestamp_ms {} goes back before {}",
                    self.path.display(),
                    self.line_number,
                    ts,
                    last
                ));
            }
        }
        if frame.timestamp_ms.is_some() {
            self.last_timestamp_ms = frame.timestamp_ms;
        }

        if frame.timestamp_ms.is_none() {
            let interval = frame_interval(self.config.target_fps);
            if let Some(last) = self.last_frame_at {
                let elapsed = last.elapsed();
                if elapsed < interval {
                    std::thread::sleep(interval - elapsed);
                }
            }
        }
        self.last_frame_at = Some(Instant::now());
        self.frame_count += 1;
        Ok(SourceEvent::Frame(frame))
    }

    pub(super) fn is_healthy(&self) -> bool {
        self.reader.is_some() && !self.ended
    }

    pub(super) fn stats(&self) -> SourceStats {
        SourceStats {
            frames_received: self.frame_count,
            source: self.path.display().to_string(),
        }
    }
}
