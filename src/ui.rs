use std::io::Write;

use gesture_relay::overlay::{command_color, status_lines};
use gesture_relay::{CommandName, FrameReport};

/// Carriage return plus erase-line.
const CLEAR_LINE: &str = "\r\x1b[2K";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

/// Terminal rendering of the status overlay.
///
/// Pretty mode redraws one coloured line on stderr every frame. Plain mode prints a line only
/// when the displayed command changes.
#[derive(Clone, Debug)]
pub struct Ui {
    mode: UiMode,
    is_tty: bool,
    last_plain: Option<String>,
}

impl Ui {
    pub fn new(mode: UiMode, is_tty: bool) -> Self {
        Self {
            mode,
            is_tty,
            last_plain: None,
        }
    }

    pub fn from_args(ui_flag: Option<&str>, is_tty: bool) -> Self {
        let mode = match ui_flag {
            Some("plain") => UiMode::Plain,
            Some("pretty") => UiMode::Pretty,
            _ => UiMode::Auto,
        };
        Self::new(mode, is_tty)
    }

    fn use_pretty(&self) -> bool {
        self.is_tty && matches!(self.mode, UiMode::Pretty | UiMode::Auto)
    }

    pub fn show(&mut self, display: Option<CommandName>, report: &FrameReport) {
        let lines = status_lines(display, report);
        if self.use_pretty() {
            let color = command_color(display);
            let mut stderr = std::io::stderr().lock();
            let _ = write!(
                stderr,
                "{}\x1b[1;38;2;{};{};{}m{}\x1b[0m  {}",
                CLEAR_LINE,
                color.r,
                color.g,
                color.b,
                lines[0],
                lines[1..].join("  ")
            );
            let _ = stderr.flush();
        } else if self.last_plain.as_deref() != Some(lines[0].as_str()) {
            eprintln!("{}", lines[0]);
            self.last_plain = Some(lines[0].clone());
        }
    }

    /// Prefix for log records. In pretty mode a record first erases the status line, so the
    /// record gets a line of its own and the next frame redraws the status below it.
    pub fn log_prefix(&self) -> &'static str {
        if self.use_pretty() {
            CLEAR_LINE
        } else {
            ""
        }
    }

    /// Ends the redraw line so later output starts clean.
    pub fn finish(&self) {
        if self.use_pretty() {
            eprintln!();
        }
    }
}
