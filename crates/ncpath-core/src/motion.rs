//! Motion event model shared by all downstream consumers.
//!
//! A `MotionEvent` is the semantic unit emitted by the dispatcher: one rapid
//! traversal, straight cut or circular cut, always carrying both endpoints so
//! consumers never need their own position tracking.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute machine position in millimeters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Active arc plane (G17/G18/G19).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane {
    /// XY plane, normal +Z (G17)
    Xy,
    /// XZ plane, normal +Y (G18)
    Xz,
    /// YZ plane, normal +X (G19)
    Yz,
}

impl Plane {
    /// Axis letter of the plane normal.
    pub fn normal(&self) -> char {
        match self {
            Self::Xy => 'Z',
            Self::Xz => 'Y',
            Self::Yz => 'X',
        }
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::Xy
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xy => write!(f, "XY"),
            Self::Xz => write!(f, "XZ"),
            Self::Yz => write!(f, "YZ"),
        }
    }
}

/// One semantic motion, with `from` supplied by the dispatcher.
///
/// For arcs, the sign of `rotation` selects the turn direction (negative is
/// clockwise) and its magnitude the number of turns; magnitudes above one
/// describe multi-turn helices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionEvent {
    /// Non-cutting traversal.
    Rapid { from: Position, to: Position },
    /// Straight cutting move.
    Linear { from: Position, to: Position },
    /// Circular cutting move in the active plane.
    Arc {
        from: Position,
        to: Position,
        center: Position,
        plane: Plane,
        rotation: i32,
    },
}

impl MotionEvent {
    /// Target position of the move.
    pub fn to(&self) -> Position {
        match *self {
            Self::Rapid { to, .. } | Self::Linear { to, .. } | Self::Arc { to, .. } => to,
        }
    }

    /// Origin position of the move.
    pub fn from(&self) -> Position {
        match *self {
            Self::Rapid { from, .. } | Self::Linear { from, .. } | Self::Arc { from, .. } => from,
        }
    }

    /// True for linear and arc moves, false for rapids.
    pub fn is_cut(&self) -> bool {
        !matches!(self, Self::Rapid { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_endpoints() {
        let from = Position::new(1.0, 2.0, 3.0);
        let to = Position::new(4.0, 5.0, 6.0);
        let event = MotionEvent::Linear { from, to };
        assert_eq!(event.from(), from);
        assert_eq!(event.to(), to);
        assert!(event.is_cut());
        assert!(!MotionEvent::Rapid { from, to }.is_cut());
    }
}
