use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Control commands understood by the actuator.
///
/// The wire form is the upper-case ASCII name with no surrounding whitespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandName {
    Left,
    Right,
    Up,
    Down,
    Forward,
    Backward,
    Grab,
    Release,
    Stop,
}

impl CommandName {
    pub const ALL: [CommandName; 9] = [
        CommandName::Left,
        CommandName::Right,
        CommandName::Up,
        CommandName::Down,
        CommandName::Forward,
        CommandName::Backward,
        CommandName::Grab,
        CommandName::Release,
        CommandName::Stop,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CommandName::Left => "LEFT",
            CommandName::Right => "RIGHT",
            CommandName::Up => "UP",
            CommandName::Down => "DOWN",
            CommandName::Forward => "FORWARD",
            CommandName::Backward => "BACKWARD",
            CommandName::Grab => "GRAB",
            CommandName::Release => "RELEASE",
            CommandName::Stop => "STOP",
        }
    }

    /// Movement commands use the shorter dispatch cooldown.
    pub const fn is_movement(self) -> bool {
        matches!(
            self,
            CommandName::Left
                | CommandName::Right
                | CommandName::Up
                | CommandName::Down
                | CommandName::Forward
                | CommandName::Backward
        )
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        CommandName::ALL
            .iter()
            .copied()
            .find(|cmd| cmd.as_str() == s)
            .ok_or_else(|| anyhow!("unknown command '{}'", s.escape_debug()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_wire_names_only() {
        for cmd in CommandName::ALL {
            assert_eq!(cmd.as_str().parse::<CommandName>().unwrap(), cmd);
        }
        assert!("left".parse::<CommandName>().is_err());
        assert!(" STOP".parse::<CommandName>().is_err());
        assert!("NONE".parse::<CommandName>().is_err());
    }

    #[test]
    fn movement_set_is_the_six_directions() {
        let movement: Vec<_> = CommandName::ALL
            .into_iter()
            .filter(|c| c.is_movement())
            .collect();
        assert_eq!(movement.len(), 6);
        assert!(!CommandName::Grab.is_movement());
        assert!(!CommandName::Release.is_movement());
        assert!(!CommandName::Stop.is_movement());
    }
}
