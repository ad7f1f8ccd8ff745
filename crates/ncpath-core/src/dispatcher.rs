//! Motion dispatcher: turns target-only interpreter callbacks into
//! [`MotionEvent`]s with full endpoint information.
//!
//! The dispatcher is the only owner of the virtual tool position and the
//! active plane. Each callback receives just the target of the move; the
//! origin is the previously committed target, which keeps the emitted event
//! stream continuous (`from` of every event equals `to` of the one before).

use crate::error::GeometryError;
use crate::motion::{MotionEvent, Plane, Position};

/// Receives motion events in stream order.
///
/// A consumer that cannot represent an event (a 2D recorder fed a helix, an
/// arc outside its working plane) returns a [`GeometryError`]; the dispatcher
/// does not commit the position and the run is expected to abort.
pub trait MotionConsumer {
    fn motion(&mut self, event: &MotionEvent) -> Result<(), GeometryError>;
}

/// Stateful adapter between the interpreter callbacks and one consumer.
#[derive(Debug)]
pub struct Dispatcher<C> {
    position: Position,
    plane: Plane,
    consumer: C,
}

impl<C: MotionConsumer> Dispatcher<C> {
    /// Create a dispatcher at the machine origin with the XY plane active.
    pub fn new(consumer: C) -> Self {
        Self {
            position: Position::default(),
            plane: Plane::default(),
            consumer,
        }
    }

    /// Current virtual tool position (the last committed target).
    pub fn position(&self) -> Position {
        self.position
    }

    /// Plane consumed by the next arc.
    pub fn active_plane(&self) -> Plane {
        self.plane
    }

    /// Update the active plane.
    pub fn plane(&mut self, plane: Plane) {
        self.plane = plane;
    }

    /// Emit a rapid traversal to `to`.
    pub fn rapid(&mut self, to: Position) -> Result<(), GeometryError> {
        let event = MotionEvent::Rapid {
            from: self.position,
            to,
        };
        self.consumer.motion(&event)?;
        self.position = to;
        Ok(())
    }

    /// Emit a straight cutting move to `to`.
    pub fn linear(&mut self, to: Position) -> Result<(), GeometryError> {
        let event = MotionEvent::Linear {
            from: self.position,
            to,
        };
        self.consumer.motion(&event)?;
        self.position = to;
        Ok(())
    }

    /// Emit a circular cutting move in the active plane.
    pub fn arc(&mut self, end: Position, center: Position, rotation: i32) -> Result<(), GeometryError> {
        let event = MotionEvent::Arc {
            from: self.position,
            to: end,
            center,
            plane: self.plane,
            rotation,
        };
        self.consumer.motion(&event)?;
        self.position = end;
        Ok(())
    }

    /// Recover the consumer once the stream is exhausted.
    pub fn into_consumer(self) -> C {
        self.consumer
    }
}
