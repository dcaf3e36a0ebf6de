//! Mock character display.
//!
//! Keeps a fixed-size character buffer, ASCII only, and records a snapshot
//! of the whole screen after every change.

use std::fmt;

use doorkey_core::constants::{DISPLAY_COLUMNS, DISPLAY_ROWS};

use super::recorder::{self, Recorder, Recording};
use crate::{HardwareError, Result, traits::DisplayDevice};

/// Contents of the display at one instant, trailing blanks removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySnapshot {
    pub rows: Vec<String>,
}

impl DisplaySnapshot {
    pub fn row(&self, index: usize) -> &str {
        self.rows.get(index).map(String::as_str).unwrap_or("")
    }

    /// `true` if any row shows exactly `text`.
    pub fn shows(&self, text: &str) -> bool {
        self.rows.iter().any(|row| row == text)
    }
}

impl fmt::Display for DisplaySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.rows.join("|"))
    }
}

#[derive(Debug)]
pub struct MockDisplay {
    rows: usize,
    columns: usize,
    buffer: Vec<Vec<u8>>,
    recorder: Recorder<DisplaySnapshot>,
}

impl MockDisplay {
    /// Create a display of the reference size (2 × 16).
    pub fn new() -> (Self, Recording<DisplaySnapshot>) {
        Self::with_size(DISPLAY_ROWS, DISPLAY_COLUMNS)
    }

    pub fn with_size(rows: usize, columns: usize) -> (Self, Recording<DisplaySnapshot>) {
        let (recorder, recording) = recorder::channel();
        let display = Self {
            rows,
            columns,
            buffer: vec![vec![b' '; columns]; rows],
            recorder,
        };
        (display, recording)
    }

    /// Current contents.
    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            rows: self
                .buffer
                .iter()
                .map(|row| String::from_utf8_lossy(row).trim_end().to_string())
                .collect(),
        }
    }

    fn publish(&self) {
        self.recorder.record(self.snapshot());
    }
}

impl DisplayDevice for MockDisplay {
    async fn clear(&mut self) -> Result<()> {
        for row in &mut self.buffer {
            row.fill(b' ');
        }
        self.publish();
        Ok(())
    }

    async fn write_at(&mut self, row: usize, column: usize, text: &str) -> Result<()> {
        if row >= self.rows || column >= self.columns {
            return Err(HardwareError::OutOfBounds { row, column });
        }
        if !text.is_ascii() {
            return Err(HardwareError::invalid_data(format!(
                "Display text must be ASCII: {text:?}"
            )));
        }

        let line = &mut self.buffer[row];
        for (cell, byte) in line[column..].iter_mut().zip(text.bytes()) {
            *cell = byte;
        }
        self.publish();
        Ok(())
    }
}
