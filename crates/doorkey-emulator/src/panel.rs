//! Text rendering of what the emulated devices show and do.

use std::fmt;

use doorkey_core::constants::DISPLAY_COLUMNS;
use doorkey_hardware::{MotorDirection, mock::DisplaySnapshot};

/// One observable output of the emulated devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    Screen(DisplaySnapshot),
    Motor(MotorDirection),
    Buzzer(bool),
}

impl fmt::Display for PanelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Screen(snapshot) => write!(f, "{}", render_screen(snapshot, DISPLAY_COLUMNS)),
            Self::Motor(direction) => write!(f, "motor: {direction}"),
            Self::Buzzer(true) => write!(f, "buzzer: on"),
            Self::Buzzer(false) => write!(f, "buzzer: off"),
        }
    }
}

/// Draw a display snapshot as a framed character box `columns` wide.
///
/// ```
/// use doorkey_emulator::panel::render_screen;
/// use doorkey_hardware::mock::DisplaySnapshot;
///
/// let screen = DisplaySnapshot { rows: vec!["Enter Pass:".into(), "**".into()] };
/// let text = render_screen(&screen, 12);
/// assert_eq!(text.lines().nth(1), Some("|Enter Pass: |"));
/// ```
pub fn render_screen(snapshot: &DisplaySnapshot, columns: usize) -> String {
    let border = format!("+{}+", "-".repeat(columns));
    let mut out = String::with_capacity((columns + 3) * (snapshot.rows.len() + 2));
    out.push_str(&border);
    for row in &snapshot.rows {
        out.push('\n');
        out.push('|');
        out.push_str(&fit(row, columns));
        out.push('|');
    }
    out.push('\n');
    out.push_str(&border);
    out
}

fn fit(text: &str, width: usize) -> String {
    let mut row: String = text.chars().take(width).collect();
    let len = row.chars().count();
    row.extend(std::iter::repeat_n(' ', width - len));
    row
}
