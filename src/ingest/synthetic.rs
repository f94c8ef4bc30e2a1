//! Synthetic landmark source (`stub://`).
//!
//! Generates a deterministic scripted session so the relay can run end to end without a
//! camera or detector: an open hand at rest, a swipe right and back, a fist, two fingers, a
//! push toward the camera and back, then the hand leaves the view. The script loops.

use anyhow::Result;
use std::time::Instant;

use super::{frame_interval, SourceConfig, SourceEvent, SourceStats};
use crate::landmark::{HandLandmarks, LandmarkFrame, Point, HAND_LANDMARK_COUNT};

const SWIPE_STEP: f32 = 0.03;
const SWIPE_FRAMES: u64 = 12;
const PUSH_STEP: f32 = 0.15;
const PUSH_FRAMES: u64 = 6;

/// A parametric hand used to generate plausible landmark sets.
///
/// The hand stands upright around `center`; `scale` stretches it uniformly, so a larger scale
/// reads as a hand closer to the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPose {
    pub center: Point,
    pub scale: f32,
    /// Index, middle, ring, pinky.
    pub extended: [bool; 4],
}

impl HandPose {
    pub fn open() -> Self {
        Self::with_fingers(4)
    }

    /// The first `count` fingers (from the index finger) extended, the rest curled.
    pub fn with_fingers(count: u8) -> Self {
        let mut extended = [false; 4];
        for flag in extended.iter_mut().take(count as usize) {
            *flag = true;
        }
        Self {
            center: Point::new(0.5, 0.5),
            scale: 0.5,
            extended,
        }
    }

    pub fn shifted(mut self, dx: f32, dy: f32) -> Self {
        self.center.x += dx;
        self.center.y += dy;
        self
    }

    pub fn scaled(mut self, factor: f32) -> Self {
        self.scale *= factor;
        self
    }

    pub fn landmarks(&self) -> HandLandmarks {
        let (cx, cy, s) = (self.center.x, self.center.y, self.scale);
        let mut points = [Point::default(); HAND_LANDMARK_COUNT];

        points[0] = Point::new(cx, cy + 0.2 * s);
        points[1] = Point::new(cx + 0.08 * s, cy + 0.15 * s);
        points[2] = Point::new(cx + 0.12 * s, cy + 0.1 * s);
        points[3] = Point::new(cx + 0.15 * s, cy + 0.05 * s);
        points[4] = Point::new(cx + 0.17 * s, cy);

        for (finger, &up) in self.extended.iter().enumerate() {
            let x = cx + (finger as f32 - 1.5) * 0.05 * s;
            let base = 5 + finger * 4;
            points[base] = Point::new(x, cy + 0.08 * s);
            points[base + 1] = Point::new(x, cy);
            if up {
                points[base + 2] = Point::new(x, cy - 0.08 * s);
                points[base + 3] = Point::new(x, cy - 0.15 * s);
            } else {
                points[base + 2] = Point::new(x, cy + 0.03 * s);
                points[base + 3] = Point::new(x, cy + 0.05 * s);
            }
        }

        HandLandmarks::from_array(points)
    }
}

#[derive(Clone, Copy, Debug)]
enum Motion {
    Rest(u8),
    SwipeRight,
    SwipeLeft,
    PushIn,
    PullOut,
    Absent,
}

#[derive(Clone, Copy, Debug)]
enum Length {
    Seconds(f32),
    Frames(u64),
}

const SCRIPT: &[(Motion, Length)] = &[
    (Motion::Rest(4), Length::Seconds(1.5)),
    (Motion::SwipeRight, Length::Frames(SWIPE_FRAMES)),
    (Motion::SwipeLeft, Length::Frames(SWIPE_FRAMES)),
    (Motion::Rest(4), Length::Seconds(1.5)),
    (Motion::Rest(0), Length::Seconds(1.0)),
    (Motion::Rest(2), Length::Seconds(1.5)),
    (Motion::PushIn, Length::Frames(PUSH_FRAMES)),
    (Motion::PullOut, Length::Frames(PUSH_FRAMES)),
    (Motion::Absent, Length::Seconds(1.0)),
];

fn segment_frames(length: Length, fps: u32) -> u64 {
    match length {
        Length::Seconds(secs) => ((secs * fps as f32).round() as u64).max(1),
        Length::Frames(frames) => frames,
    }
}

/// Pose for frame `step` of the looping script, or `None` while the hand is out of view.
fn scripted_pose(step: u64, fps: u32) -> Option<HandPose> {
    let cycle: u64 = SCRIPT
        .iter()
        .map(|(_, length)| segment_frames(*length, fps))
        .sum();
    let mut k = step % cycle;
    for (motion, length) in SCRIPT {
        let frames = segment_frames(*length, fps);
        if k >= frames {
            k -= frames;
            continue;
        }
        let open = HandPose::open();
        let travel = (k + 1) as f32;
        return match motion {
            Motion::Rest(fingers) => Some(HandPose::with_fingers(*fingers)),
            Motion::SwipeRight => Some(open.shifted(SWIPE_STEP * travel, 0.0)),
            Motion::SwipeLeft => Some(open.shifted(
                SWIPE_STEP * (SWIPE_FRAMES as f32 - travel),
                0.0,
            )),
            Motion::PushIn => Some(open.scaled(1.0 + PUSH_STEP * travel)),
            Motion::PullOut => Some(open.scaled(
                1.0 + PUSH_STEP * (PUSH_FRAMES as f32 - travel),
            )),
            Motion::Absent => None,
        };
    }
    None
}

pub(super) struct SyntheticSource {
    config: SourceConfig,
    frame_count: u64,
    last_frame_at: Option<Instant>,
}

impl SyntheticSource {
    pub(super) fn new(config: SourceConfig) -> Self {
        Self {
            config,
            frame_count: 0,
            last_frame_at: None,
        }
    }

    pub(super) fn connect(&mut self) -> Result<()> {
        log::info!("LandmarkSource: connected to {} (synthetic)", self.config.url);
        Ok(())
    }

    pub(super) fn next_event(&mut self) -> Result<SourceEvent> {
        let interval = frame_interval(self.config.target_fps);
        if let Some(last) = self.last_frame_at {
            let elapsed = last.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
        self.last_frame_at = Some(Instant::now());

        let frame = match scripted_pose(self.frame_count, self.config.target_fps) {
            Some(pose) => LandmarkFrame::with_hand(pose.landmarks()),
            None => LandmarkFrame::empty(),
        };
        self.frame_count += 1;
        Ok(SourceEvent::Frame(frame))
    }

    pub(super) fn is_healthy(&self) -> bool {
        true
    }

    pub(super) fn stats(&self) -> SourceStats {
        SourceStats {
            frames_received: self.frame_count,
            source: self.config.url.clone(),
        }
    }
}
