//! Gesture Relay
//!
//! Turns a stream of hand landmarks into a stable, rate-limited sequence of control commands
//! and sends them as UDP datagrams to a remote actuator (robot arm, microcontroller).
//!
//! # Pipeline
//!
//! Once per video frame, single-threaded:
//!
//! 1. **Landmark source** (`ingest`): 21 normalized points per detected hand, produced by an
//!    external detector. Only the first hand is used.
//! 2. **Classifier** (`classify`): finger count, wrist motion and hand-size change resolve to
//!    at most one command, against state retained from earlier frames.
//! 3. **Debounce** (`dispatch`): repeats of the same command are held back for a cooldown;
//!    a changed command goes out immediately.
//! 4. **Sink** (`transport`): the command name as one fire-and-forget datagram.
//!
//! # Module Structure
//!
//! - `landmark`: points, hands, frames, landmark names
//! - `command`: the closed command set and its wire form
//! - `classify`, `dispatch`: the decision core
//! - `pipeline`: per-frame driver owning all retained state
//! - `ingest`: landmark sources (synthetic, UDP, recordings)
//! - `transport`: command sinks and the receiver side of the wire format
//! - `overlay`: command colours and status text
//! - `config`: file + environment configuration

pub mod classify;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod ingest;
pub mod landmark;
pub mod overlay;
pub mod pipeline;
pub mod transport;

pub use classify::{
    count_extended_fingers, hand_size, Classification, Classifier, ClassifierSettings,
    ClassifierState, HandSample, Stage, RESOLUTION_ORDER,
};
pub use command::CommandName;
pub use config::RelayConfig;
pub use dispatch::{DispatchPolicy, DispatchState};
pub use ingest::{HandPose, LandmarkSource, SourceConfig, SourceEvent};
pub use landmark::{HandLandmarks, LandmarkFrame, LandmarkIdx, Point};
pub use pipeline::{frame_time, FrameReport, GesturePipeline, PipelineSettings, PipelineStats};
pub use transport::{
    decode_command, CommandReceiver, CommandSink, LogSink, MemorySink, UdpCommandSink,
};
