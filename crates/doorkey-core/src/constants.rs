//! Device-level constants shared by the interface and control nodes.
//!
//! Both firmware images must be built against the same values: the link
//! protocol has no negotiation step, so a mismatch in password length or
//! attempt limit desynchronizes the nodes on the first transaction.
//!
//! Timing values here are only defaults. The deployed values live in
//! [`DeviceConfig`](crate::config::DeviceConfig) and can be tuned per device.

// ============================================================================
// Credentials
// ============================================================================

/// Number of symbols in a password record.
///
/// Every password exchange on the link transfers exactly this many symbols,
/// with no length prefix.
pub const PASSWORD_LENGTH: usize = 5;

/// Largest symbol value accepted in a password (keypad digits 0-9).
pub const MAX_SYMBOL: u8 = 9;

/// Consecutive failed comparisons allowed before lockout.
pub const DEFAULT_MAX_ATTEMPTS: u8 = 3;

// ============================================================================
// Timing
// ============================================================================

/// Duration of one motor phase (opening or closing) in milliseconds.
pub const DEFAULT_DOOR_PHASE_MS: u64 = 1_000;

/// Alarm timer period in milliseconds.
///
/// Five periods of twelve seconds keep the alarm sounding for one minute.
pub const DEFAULT_ALARM_TICK_MS: u64 = 12_000;

/// Number of alarm timer periods before the alarm silences itself.
pub const DEFAULT_ALARM_TICKS: u32 = 5;

/// Line-settling delay after each frame sent on the link, in milliseconds.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 10;

// ============================================================================
// Serial line
// ============================================================================

/// Symbol rate of the inter-node serial line.
pub const DEFAULT_BAUD_RATE: u32 = 9_600;

/// Data bits per character.
pub const DEFAULT_DATA_BITS: u8 = 8;

/// Stop bits per character.
pub const DEFAULT_STOP_BITS: u8 = 1;

// ============================================================================
// Persistent storage
// ============================================================================

/// Backing-store address of the 5-byte password record.
pub const PASSWORD_ADDRESS: u16 = 0x0311;

// ============================================================================
// Keypad
// ============================================================================

/// Confirms a password entry.
pub const KEY_ENTER: char = '=';

/// Selects "open door" at the top menu.
pub const KEY_OPEN_DOOR: char = '+';

/// Selects "change password" at the top menu.
pub const KEY_CHANGE_PASSWORD: char = '-';

// ============================================================================
// Character display
// ============================================================================

/// Rows on the interface node's character display.
pub const DISPLAY_ROWS: usize = 2;

/// Columns on the interface node's character display.
pub const DISPLAY_COLUMNS: usize = 16;
