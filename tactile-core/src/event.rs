//! Normalized pointer events for widget interaction.
//!
//! The host environment (browser shim, native window, test harness) is
//! responsible for normalizing mouse and touch input into this uniform
//! stream; the toolkit never looks at raw platform events.

use serde::{Deserialize, Serialize};

/// Identifier for one pointer (finger, pen or mouse) across a
/// down/move/up sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerId(pub u32);

impl std::fmt::Display for PointerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Pointer pressed (finger down / button down).
    Down,
    /// Pointer moved while tracked.
    Move,
    /// Pointer released.
    Up,
}

/// A single normalized pointer event.
///
/// Coordinates are absolute ("client") pixels; widgets convert them to
/// their own rect-relative unit range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Pointer identifier (stable across one down/move/up sequence).
    pub id: PointerId,
    /// Phase of this event.
    pub phase: PointerPhase,
    /// Absolute X position in pixels.
    pub x: f64,
    /// Absolute Y position in pixels.
    pub y: f64,
    /// Timestamp in milliseconds since an arbitrary host epoch.
    pub timestamp_ms: u64,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub fn new(id: u32, phase: PointerPhase, x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self {
            id: PointerId(id),
            phase,
            x,
            y,
            timestamp_ms,
        }
    }

    /// The event position as a geometric point.
    #[must_use]
    pub fn position(&self) -> kurbo::Point {
        kurbo::Point::new(self.x, self.y)
    }
}
