//! Hand landmark data model.
//!
//! Landmarks arrive from an external detector as 21 normalized `(x, y)` points per hand.
//! Smaller `y` is higher on screen (image coordinates).
//!
//! `HandLandmarks` is the only validation point: once constructed, a hand always has exactly
//! 21 finite points, so the classifier can index it without checks.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Number of landmarks reported per detected hand.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// A normalized 2D image coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in normalized units.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Names for the hand pose landmarks, in detector output order.
///
/// - **CMC**: carpometacarpal joint, the lowest joint of the thumb.
/// - **MCP**: metacarpophalangeal joint, the knuckles near the palm.
/// - **PIP**: proximal interphalangeal joint, the middle knuckle of a finger.
/// - **DIP**: distal interphalangeal joint, the highest joint of a finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl LandmarkIdx {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Fingertips checked for extension. The thumb is not counted.
pub const FINGER_TIPS: [LandmarkIdx; 4] = [
    LandmarkIdx::IndexFingerTip,
    LandmarkIdx::MiddleFingerTip,
    LandmarkIdx::RingFingerTip,
    LandmarkIdx::PinkyTip,
];

/// Distance from a fingertip index back to its PIP joint.
pub const PIP_OFFSET: usize = 2;

/// Landmark tracked for movement.
pub const WRIST: LandmarkIdx = LandmarkIdx::Wrist;

/// Landmark whose distance from the wrist is the hand-size (depth) metric.
pub const SIZE_REFERENCE: LandmarkIdx = LandmarkIdx::MiddleFingerTip;

/// The 21 landmarks of one detected hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct HandLandmarks {
    points: [Point; HAND_LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: Vec<Point>) -> Result<Self> {
        let count = points.len();
        let points: [Point; HAND_LANDMARK_COUNT] = points.try_into().map_err(|_| {
            anyhow!(
                "hand must have exactly {} landmarks, got {}",
                HAND_LANDMARK_COUNT,
                count
            )
        })?;
        if let Some(pos) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(anyhow!("landmark {} has a non-finite coordinate", pos));
        }
        Ok(Self { points })
    }

    /// Builds a hand from generated points. Coordinates are trusted to be finite.
    pub(crate) fn from_array(points: [Point; HAND_LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    #[inline]
    pub fn get(&self, idx: LandmarkIdx) -> Point {
        self.points[idx.index()]
    }

    #[inline]
    pub fn at(&self, index: usize) -> Point {
        self.points[index]
    }

    pub fn wrist(&self) -> Point {
        self.get(WRIST)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

impl TryFrom<Vec<Point>> for HandLandmarks {
    type Error = anyhow::Error;

    fn try_from(points: Vec<Point>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<HandLandmarks> for Vec<Point> {
    fn from(hand: HandLandmarks) -> Self {
        hand.points.to_vec()
    }
}

/// One frame of landmark source output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture offset from the start of the stream, when the source records one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
}

impl LandmarkFrame {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_hand(hand: HandLandmarks) -> Self {
        Self {
            timestamp_ms: None,
            hands: vec![hand],
        }
    }

    /// Only the first detected hand is tracked.
    pub fn primary_hand(&self) -> Option<&HandLandmarks> {
        self.hands.first()
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| anyhow!("invalid landmark frame: {}", e))
    }
}
