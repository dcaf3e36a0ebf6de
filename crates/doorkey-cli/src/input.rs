//! Parsing of stdin lines into emulator actions.

use doorkey_hardware::KeypadInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Key(KeypadInput),
    ToggleMotion,
    Quit,
}

/// Turn one line into actions, in order.
///
/// `m` toggles the occupancy sensor and `q` quits; whitespace is skipped and
/// every other character is a key press.
pub fn parse_line(line: &str) -> Vec<Action> {
    line.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c.to_ascii_lowercase() {
            'm' => Action::ToggleMotion,
            'q' => Action::Quit,
            _ => Action::Key(KeypadInput::from_char(c)),
        })
        .collect()
}
