//! Error types for motion dispatch and stream reading.
//!
//! All errors here are fatal: geometric synthesis is not safe to resume
//! mid-stream, so the caller aborts the whole run on the first failure.

use crate::motion::Plane;
use thiserror::Error;

/// A motion event violated a geometric precondition of its consumer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// An arc was received in a plane the consumer does not support.
    #[error("arc must lie in the {expected} plane (active plane is {active})")]
    PlaneMismatch { expected: Plane, active: Plane },

    /// A move fed to a 2D-only consumer changed its out-of-plane coordinate.
    #[error("move is not planar: {axis} changes from {from} to {to}")]
    NonPlanarMove { axis: char, from: f64, to: f64 },

    /// Arc start point coincides with its center.
    #[error("degenerate arc: start point coincides with center")]
    DegenerateArc,
}

/// A source line could not be read by the interpreter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadError {
    /// The line contains a word that is not a letter/number pair.
    #[error("malformed word '{word}' in line: {line}")]
    MalformedWord { word: String, line: String },
}
