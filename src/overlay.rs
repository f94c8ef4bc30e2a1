//! Status overlay: command colours and the text lines shown next to the video.

use crate::command::CommandName;
use crate::pipeline::FrameReport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Colour used for NONE.
pub const NEUTRAL: Rgb = Rgb::new(128, 128, 128);

pub fn command_color(command: Option<CommandName>) -> Rgb {
    let Some(command) = command else {
        return NEUTRAL;
    };
    match command {
        CommandName::Left => Rgb::new(0, 0, 255),
        CommandName::Right => Rgb::new(255, 0, 0),
        CommandName::Up => Rgb::new(0, 255, 0),
        CommandName::Down => Rgb::new(255, 255, 0),
        CommandName::Forward => Rgb::new(255, 165, 0),
        CommandName::Backward => Rgb::new(255, 0, 255),
        CommandName::Grab => Rgb::new(128, 0, 128),
        CommandName::Release => Rgb::new(255, 192, 203),
        CommandName::Stop => Rgb::new(0, 0, 0),
    }
}

pub fn display_name(command: Option<CommandName>) -> &'static str {
    command.map(CommandName::as_str).unwrap_or("NONE")
}

/// Overlay text for a frame. Finger count and hand size appear only when a hand was seen.
pub fn status_lines(display: Option<CommandName>, report: &FrameReport) -> Vec<String> {
    let mut lines = vec![format!("CMD: {}", display_name(display))];
    if let Some(classification) = &report.classification {
        lines.push(format!("Fingers: {}", classification.finger_count));
        lines.push(format!("Hand Size: {:.3}", classification.hand_size));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;

    #[test]
    fn none_is_neutral_grey() {
        assert_eq!(command_color(None), NEUTRAL);
        assert_eq!(display_name(None), "NONE");
    }

    #[test]
    fn every_command_has_a_distinct_colour() {
        let colors: Vec<_> = CommandName::ALL
            .into_iter()
            .map(|c| command_color(Some(c)))
            .collect();
        for (i, a) in colors.iter().enumerate() {
            assert_ne!(*a, NEUTRAL);
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn hand_details_follow_command_line() {
        let report = FrameReport {
            classification: Some(Classification {
                command: Some(CommandName::Stop),
                motion_detected: false,
                hand_size: 0.1756,
                finger_count: 4,
            }),
            ..FrameReport::default()
        };
        assert_eq!(
            status_lines(Some(CommandName::Stop), &report),
            vec!["CMD: STOP", "Fingers: 4", "Hand Size: 0.176"]
        );
        assert_eq!(status_lines(None, &FrameReport::default()), vec!["CMD: NONE"]);
    }
}
