//! Gesture classification.
//!
//! Turns one frame of hand landmarks plus the state retained from earlier frames into at most
//! one command. Resolution runs through [`RESOLUTION_ORDER`]; the first stage that decides the
//! frame wins:
//!
//! 1. **FingerPriority**: a closed fist (0 fingers) is GRAB, a single finger is RELEASE. These
//!    bypass movement and the grace period entirely.
//! 2. **Movement**: with a previous sample, wrist displacement or hand-size change above
//!    threshold is motion. The size change wins over X/Y, then the larger of |dx| and |dy|.
//! 3. **GracePeriod**: without motion, finger commands stay suppressed until the grace period
//!    since the last detected motion has elapsed.
//! 4. **FingerFallback**: 2 fingers is BACKWARD, 4 is STOP, 3 sends nothing.
//!
//! [`Classifier::classify`] never mutates state. The caller feeds the result back with
//! [`ClassifierState::observe`].

use std::time::{Duration, Instant};

use crate::command::CommandName;
use crate::dispatch::DispatchState;
use crate::landmark::{HandLandmarks, Point, FINGER_TIPS, PIP_OFFSET, SIZE_REFERENCE, WRIST};

/// Minimum wrist displacement per frame (normalized units) that counts as motion.
pub const DEFAULT_MOVEMENT_THRESHOLD: f32 = 0.015;
/// Minimum hand-size change per frame that counts as moving toward or away from the camera.
pub const DEFAULT_HAND_SIZE_THRESHOLD: f32 = 0.02;
/// How long finger commands stay suppressed after motion stops.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassifierSettings {
    pub movement_threshold: f32,
    pub hand_size_threshold: f32,
    pub grace_period: Duration,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
            hand_size_threshold: DEFAULT_HAND_SIZE_THRESHOLD,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

/// Wrist position and hand size from the last frame a hand was observed.
///
/// Kept as one value so the two are always set and cleared together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandSample {
    pub wrist: Point,
    pub hand_size: f32,
}

/// State retained across frames, owned by the frame loop.
#[derive(Clone, Debug, Default)]
pub struct ClassifierState {
    previous: Option<HandSample>,
    last_movement_at: Option<Instant>,
    pub dispatch: DispatchState,
}

impl ClassifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<HandSample> {
        self.previous
    }

    pub fn previous_wrist(&self) -> Option<Point> {
        self.previous.map(|s| s.wrist)
    }

    pub fn previous_hand_size(&self) -> Option<f32> {
        self.previous.map(|s| s.hand_size)
    }

    pub fn last_movement_at(&self) -> Option<Instant> {
        self.last_movement_at
    }

    /// Records a classified frame: the hand becomes the new previous sample, and the motion
    /// timestamp advances when motion was detected.
    pub fn observe(&mut self, hand: &HandLandmarks, result: &Classification, now: Instant) {
        self.previous = Some(HandSample {
            wrist: hand.wrist(),
            hand_size: result.hand_size,
        });
        if result.motion_detected {
            self.last_movement_at = Some(now);
        }
    }

    /// Drops the previous sample so the next hand is treated as a first sighting.
    pub fn forget_hand(&mut self) {
        self.previous = None;
    }
}

/// Output of classifying one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub command: Option<CommandName>,
    pub motion_detected: bool,
    /// Always the freshly computed size, whichever stage decided.
    pub hand_size: f32,
    pub finger_count: u8,
}

/// Stages of command resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    FingerPriority,
    Movement,
    GracePeriod,
    FingerFallback,
}

/// Evaluation order of the stages. Earlier stages shadow later ones.
pub const RESOLUTION_ORDER: [Stage; 4] = [
    Stage::FingerPriority,
    Stage::Movement,
    Stage::GracePeriod,
    Stage::FingerFallback,
];

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Decision {
    command: Option<CommandName>,
    motion_detected: bool,
}

struct Features {
    finger_count: u8,
    hand_size: f32,
    wrist: Point,
}

/// Counts the extended fingers (thumb excluded). A finger is extended when its tip is above
/// (smaller `y` than) its PIP joint.
pub fn count_extended_fingers(hand: &HandLandmarks) -> u8 {
    FINGER_TIPS
        .iter()
        .filter(|tip| {
            let tip = tip.index();
            hand.at(tip).y < hand.at(tip - PIP_OFFSET).y
        })
        .count() as u8
}

/// Wrist to middle-fingertip distance. Grows as the hand approaches the camera.
pub fn hand_size(hand: &HandLandmarks) -> f32 {
    hand.get(WRIST).distance(&hand.get(SIZE_REFERENCE))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Classifier {
    settings: ClassifierSettings,
}

impl Classifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    pub fn classify(
        &self,
        hand: &HandLandmarks,
        state: &ClassifierState,
        now: Instant,
    ) -> Classification {
        let features = Features {
            finger_count: count_extended_fingers(hand),
            hand_size: hand_size(hand),
            wrist: hand.wrist(),
        };

        let decision = RESOLUTION_ORDER
            .iter()
            .find_map(|stage| self.evaluate(*stage, &features, state, now))
            .unwrap_or_default();

        Classification {
            command: decision.command,
            motion_detected: decision.motion_detected,
            hand_size: features.hand_size,
            finger_count: features.finger_count,
        }
    }

    fn evaluate(
        &self,
        stage: Stage,
        features: &Features,
        state: &ClassifierState,
        now: Instant,
    ) -> Option<Decision> {
        match stage {
            Stage::FingerPriority => match features.finger_count {
                0 => Some(Decision {
                    command: Some(CommandName::Grab),
                    motion_detected: false,
                }),
                1 => Some(Decision {
                    command: Some(CommandName::Release),
                    motion_detected: false,
                }),
                _ => None,
            },
            Stage::Movement => self.movement(features, state.previous?),
            Stage::GracePeriod => {
                let last = state.last_movement_at?;
                (now.saturating_duration_since(last) < self.settings.grace_period)
                    .then(Decision::default)
            }
            Stage::FingerFallback => Some(Decision {
                command: finger_command(features.finger_count),
                motion_detected: false,
            }),
        }
    }

    fn movement(&self, features: &Features, previous: HandSample) -> Option<Decision> {
        let step = self.settings.movement_threshold;
        let size_step = self.settings.hand_size_threshold;

        let dx = features.wrist.x - previous.wrist.x;
        let dy = features.wrist.y - previous.wrist.y;
        let dsize = features.hand_size - previous.hand_size;

        if dx.abs() <= step && dy.abs() <= step && dsize.abs() <= size_step {
            return None;
        }

        // A delta can clear detection and still land on a tie in its branch: motion, no command.
        let command = if dsize.abs() > size_step {
            if dsize > size_step {
                Some(CommandName::Forward)
            } else if dsize < -size_step {
                Some(CommandName::Backward)
            } else {
                None
            }
        } else if dx.abs() > dy.abs() {
            if dx < -step {
                Some(CommandName::Left)
            } else if dx > step {
                Some(CommandName::Right)
            } else {
                None
            }
        } else if dy < -step {
            Some(CommandName::Up)
        } else if dy > step {
            Some(CommandName::Down)
        } else {
            None
        };

        Some(Decision {
            command,
            motion_detected: true,
        })
    }
}

fn finger_command(finger_count: u8) -> Option<CommandName> {
    match finger_count {
        0 => Some(CommandName::Grab),
        // Unreachable after FingerPriority, kept so the table is total.
        1 => Some(CommandName::Release),
        2 => Some(CommandName::Backward),
        3 => None,
        _ => Some(CommandName::Stop),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::HandPose;

    fn classify_pair(
        prev: &HandPose,
        current: &HandPose,
    ) -> (Classification, Classification) {
        let classifier = Classifier::default();
        let mut state = ClassifierState::new();
        let t0 = Instant::now();
        let prev_hand = prev.landmarks();
        let first = classifier.classify(&prev_hand, &state, t0);
        state.observe(&prev_hand, &first, t0);
        let second = classifier.classify(
            &current.landmarks(),
            &state,
            t0 + Duration::from_millis(33),
        );
        (first, second)
    }

    #[test]
    fn counts_fingers_above_pip_joint() {
        for count in 0..=4u8 {
            let pose = HandPose::with_fingers(count);
            assert_eq!(count_extended_fingers(&pose.landmarks()), count);
        }
    }

    #[test]
    fn fist_grabs_regardless_of_movement() {
        let prev = HandPose::open();
        let current = HandPose::with_fingers(0).shifted(0.2, -0.1).scaled(1.5);
        let (_, result) = classify_pair(&prev, &current);
        assert_eq!(result.command, Some(CommandName::Grab));
        assert!(!result.motion_detected);
    }

    #[test]
    fn single_finger_releases_regardless_of_movement() {
        let prev = HandPose::open();
        let current = HandPose::with_fingers(1).shifted(-0.2, 0.0);
        let (_, result) = classify_pair(&prev, &current);
        assert_eq!(result.command, Some(CommandName::Release));
        assert!(!result.motion_detected);
    }

    #[test]
    fn size_change_wins_over_lateral_motion() {
        let prev = HandPose::open();
        let current = HandPose::open().shifted(0.1, 0.0).scaled(1.3);
        let (first, result) = classify_pair(&prev, &current);
        assert!(result.hand_size - first.hand_size > DEFAULT_HAND_SIZE_THRESHOLD);
        assert_eq!(result.command, Some(CommandName::Forward));
        assert!(result.motion_detected);

        let (_, shrinking) = classify_pair(&current, &prev);
        assert_eq!(shrinking.command, Some(CommandName::Backward));
    }

    #[test]
    fn dominant_axis_picks_direction() {
        let prev = HandPose::open();
        let cases = [
            (0.02, 0.001, CommandName::Right),
            (-0.02, 0.001, CommandName::Left),
            (0.001, -0.02, CommandName::Up),
            (0.001, 0.02, CommandName::Down),
        ];
        for (dx, dy, expected) in cases {
            let (_, result) = classify_pair(&prev, &prev.shifted(dx, dy));
            assert_eq!(result.command, Some(expected), "dx={dx} dy={dy}");
            assert!(result.motion_detected);
        }
    }

    #[test]
    fn equal_axis_deltas_resolve_vertically() {
        let classifier = Classifier::default();
        let previous = HandSample {
            wrist: Point::new(0.5, 0.5),
            hand_size: 0.2,
        };
        let still = Features {
            finger_count: 4,
            hand_size: 0.2,
            wrist: Point::new(0.5, 0.5),
        };
        assert_eq!(classifier.movement(&still, previous), None);

        let diagonal = Features {
            wrist: Point::new(0.52, 0.52),
            ..still
        };
        let decision = classifier.movement(&diagonal, previous).unwrap();
        assert!(decision.motion_detected);
        assert_eq!(decision.command, Some(CommandName::Down));
    }

    #[test]
    fn growing_hand_without_displacement_moves_forward() {
        let classifier = Classifier::default();
        let previous = HandSample {
            wrist: Point::new(0.5, 0.5),
            hand_size: 0.25,
        };
        let features = Features {
            finger_count: 4,
            hand_size: 0.25,
            wrist: Point::new(0.5, 0.5),
        };
        assert_eq!(classifier.movement(&features, previous), None);
        let grown = Features {
            hand_size: 0.3,
            ..features
        };
        assert_eq!(
            classifier.movement(&grown, previous),
            Some(Decision {
                command: Some(CommandName::Forward),
                motion_detected: true
            })
        );
    }

    #[test]
    fn open_hand_on_first_sighting_stops() {
        let classifier = Classifier::default();
        let state = ClassifierState::new();
        let result = classifier.classify(&HandPose::open().landmarks(), &state, Instant::now());
        assert_eq!(result.command, Some(CommandName::Stop));
        assert!(!result.motion_detected);
    }

    #[test]
    fn finger_fallback_table() {
        let classifier = Classifier::default();
        let state = ClassifierState::new();
        let now = Instant::now();
        let expect = [
            (2, Some(CommandName::Backward)),
            (3, None),
            (4, Some(CommandName::Stop)),
        ];
        for (fingers, command) in expect {
            let hand = HandPose::with_fingers(fingers).landmarks();
            assert_eq!(classifier.classify(&hand, &state, now).command, command);
        }
        assert_eq!(finger_command(1), Some(CommandName::Release));
        assert_eq!(finger_command(0), Some(CommandName::Grab));
    }

    #[test]
    fn grace_period_suppresses_finger_commands_after_motion() {
        let classifier = Classifier::default();
        let mut state = ClassifierState::new();
        let t0 = Instant::now();
        let open = HandPose::open();

        let hand = open.landmarks();
        let first = classifier.classify(&hand, &state, t0);
        state.observe(&hand, &first, t0);

        let moved = open.shifted(0.05, 0.0).landmarks();
        let swipe = classifier.classify(&moved, &state, t0 + Duration::from_millis(100));
        assert_eq!(swipe.command, Some(CommandName::Right));
        state.observe(&moved, &swipe, t0 + Duration::from_millis(100));

        let still = classifier.classify(&moved, &state, t0 + Duration::from_millis(600));
        assert_eq!(still.command, None);
        assert!(!still.motion_detected);

        let later = classifier.classify(&moved, &state, t0 + Duration::from_millis(1200));
        assert_eq!(later.command, Some(CommandName::Stop));
    }

    #[test]
    fn grab_bypasses_active_grace_period() {
        let classifier = Classifier::default();
        let mut state = ClassifierState::new();
        let t0 = Instant::now();
        let open = HandPose::open();
        let hand = open.landmarks();
        let first = classifier.classify(&hand, &state, t0);
        state.observe(&hand, &first, t0);
        let moved = open.shifted(0.05, 0.0).landmarks();
        let swipe = classifier.classify(&moved, &state, t0);
        state.observe(&moved, &swipe, t0);
        assert!(state.last_movement_at().is_some());

        let fist = HandPose::with_fingers(0).shifted(0.05, 0.0).landmarks();
        let result = classifier.classify(&fist, &state, t0 + Duration::from_millis(500));
        assert_eq!(result.command, Some(CommandName::Grab));
    }

    #[test]
    fn observe_keeps_sample_fields_together() {
        let classifier = Classifier::default();
        let mut state = ClassifierState::new();
        assert!(state.previous_wrist().is_none() && state.previous_hand_size().is_none());

        let hand = HandPose::open().landmarks();
        let result = classifier.classify(&hand, &state, Instant::now());
        state.observe(&hand, &result, Instant::now());
        assert_eq!(state.previous_wrist(), Some(hand.wrist()));
        assert_eq!(state.previous_hand_size(), Some(result.hand_size));
        assert!(state.last_movement_at().is_none());

        state.forget_hand();
        assert!(state.previous().is_none());
    }

    #[test]
    fn resolution_order_is_fixed() {
        assert_eq!(
            RESOLUTION_ORDER,
            [
                Stage::FingerPriority,
                Stage::Movement,
                Stage::GracePeriod,
                Stage::FingerFallback
            ]
        );
    }
}
