//! Per-frame gesture pipeline.
//!
//! Each frame: take the first detected hand, classify it against the retained state, update
//! the state, apply the debounce policy, and hand the command to the sink. The pipeline owns
//! all cross-frame state; nothing is shared.

use std::time::{Duration, Instant};

use crate::classify::{Classification, Classifier, ClassifierSettings, ClassifierState};
use crate::command::CommandName;
use crate::dispatch::DispatchPolicy;
use crate::landmark::LandmarkFrame;
use crate::transport::CommandSink;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PipelineSettings {
    pub classifier: ClassifierSettings,
    pub dispatch: DispatchPolicy,
    /// Clear the previous hand sample on frames without a hand.
    ///
    /// Off by default: a hand that leaves and re-enters the view is compared against where it
    /// was last seen.
    pub reset_on_hand_loss: bool,
}

/// What happened to one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// `None` when the frame had no hand.
    pub classification: Option<Classification>,
    /// Command handed to the sink this frame.
    pub dispatched: Option<CommandName>,
    pub send_failed: bool,
}

impl FrameReport {
    pub fn hand_present(&self) -> bool {
        self.classification.is_some()
    }

    pub fn command(&self) -> Option<CommandName> {
        self.classification.and_then(|c| c.command)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames: u64,
    pub frames_with_hand: u64,
    pub dispatched: u64,
    pub send_failures: u64,
}

pub struct GesturePipeline<S: CommandSink> {
    classifier: Classifier,
    policy: DispatchPolicy,
    reset_on_hand_loss: bool,
    state: ClassifierState,
    sink: S,
    display: Option<CommandName>,
    stats: PipelineStats,
}

impl<S: CommandSink> GesturePipeline<S> {
    pub fn new(settings: PipelineSettings, sink: S) -> Self {
        Self {
            classifier: Classifier::new(settings.classifier),
            policy: settings.dispatch,
            reset_on_hand_loss: settings.reset_on_hand_loss,
            state: ClassifierState::new(),
            sink,
            display: None,
            stats: PipelineStats::default(),
        }
    }

    pub fn process_frame(&mut self, frame: &LandmarkFrame, now: Instant) -> FrameReport {
        self.stats.frames += 1;

        let Some(hand) = frame.primary_hand() else {
            if self.reset_on_hand_loss && self.state.previous().is_some() {
                log::debug!("hand lost; clearing previous sample");
                self.state.forget_hand();
            }
            return FrameReport::default();
        };
        self.stats.frames_with_hand += 1;

        let classification = self.classifier.classify(hand, &self.state, now);
        self.state.observe(hand, &classification, now);

        let mut report = FrameReport {
            classification: Some(classification),
            ..FrameReport::default()
        };

        let Some(command) = classification.command else {
            self.display = None;
            return report;
        };
        if !self.policy.should_dispatch(command, now, &self.state.dispatch) {
            return report;
        }

        log::debug!("sending {}", command);
        if let Err(e) = self.sink.send(command.as_str()) {
            log::warn!("SendFailed: {} via {}: {:#}", command, self.sink.name(), e);
            report.send_failed = true;
            self.stats.send_failures += 1;
        }
        self.state.dispatch.record(command, now);
        self.display = Some(command);
        self.stats.dispatched += 1;
        report.dispatched = Some(command);
        report
    }

    /// Command shown on the overlay: the last one sent, or `None` after a frame that
    /// classified to nothing.
    pub fn display_command(&self) -> Option<CommandName> {
        self.display
    }

    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Time at which a frame is evaluated: its recorded offset from `origin` when it carries one,
/// otherwise the current instant.
///
/// Only recordings keep `timestamp_ms` past the source boundary, and their times never
/// decrease, so the evaluated time is monotonic for every source.
pub fn frame_time(origin: Instant, frame: &LandmarkFrame) -> Instant {
    match frame.timestamp_ms {
        Some(ms) => origin + Duration::from_millis(ms),
        None => Instant::now(),
    }
}
