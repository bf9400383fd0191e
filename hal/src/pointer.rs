//! Cursor position source for the pointer device

use std::process::Command;
use thiserror::Error;

/// Errors that can occur while reading the host cursor
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointerError {
    /// The host query tool could not be launched
    #[error("Pointer query failed: {0}")]
    QueryFailed(String),

    /// The host query tool produced unparseable output
    #[error("Unparseable pointer position: {0}")]
    BadOutput(String),
}

/// Pointer source trait
///
/// Implementers report the current cursor position. The pointer device node
/// synthesizes its content from this on every read; nothing is persisted.
pub trait PointerSource {
    /// Returns the current cursor position as (x, y)
    fn position(&self) -> Result<(i32, i32), PointerError>;
}

/// Fixed pointer position for tests
pub struct FixedPointer {
    x: i32,
    y: i32,
}

impl FixedPointer {
    /// Creates a pointer source pinned to the given coordinates
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl PointerSource for FixedPointer {
    fn position(&self) -> Result<(i32, i32), PointerError> {
        Ok((self.x, self.y))
    }
}

/// Host cursor position via `xdotool getmouselocation`
///
/// Output looks like `x:852 y:689 screen:0 window:37748742`.
pub struct HostPointer;

impl PointerSource for HostPointer {
    fn position(&self) -> Result<(i32, i32), PointerError> {
        let output = Command::new("xdotool")
            .arg("getmouselocation")
            .output()
            .map_err(|e| PointerError::QueryFailed(e.to_string()))?;

        let text = String::from_utf8_lossy(&output.stdout);
        parse_mouselocation(text.trim())
    }
}

/// Parses `x:<n> y:<n> ...` into coordinates
fn parse_mouselocation(text: &str) -> Result<(i32, i32), PointerError> {
    let mut x = None;
    let mut y = None;

    for field in text.split_whitespace() {
        if let Some(value) = field.strip_prefix("x:") {
            x = value.parse::<i32>().ok();
        } else if let Some(value) = field.strip_prefix("y:") {
            y = value.parse::<i32>().ok();
        }
    }

    match (x, y) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(PointerError::BadOutput(text.to_string())),
    }
}
