//! Path recording onto a fixed-point integer grid.
//!
//! Discretizes XY-plane cutting moves into ordered point sequences suitable
//! for the polygon offset engine. Rapids close the current subpath; the
//! recorder is strictly 2D and rejects any motion that leaves the XY plane.

use ncpath_core::arc::{expand_arc, expand_linear};
use ncpath_core::error::GeometryError;
use ncpath_core::motion::{MotionEvent, Plane, Position};
use ncpath_core::MotionConsumer;
use serde::{Deserialize, Serialize};

/// Grid units per millimeter.
pub const DEFAULT_SCALE: f64 = 10_000.0;

/// 2D point on the integer grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScaledPoint {
    pub x: i64,
    pub y: i64,
}

/// One subpath of grid points, in traversal order.
pub type ScaledPath = Vec<ScaledPoint>;

/// Motion consumer that records cutting moves as scaled 2D paths.
#[derive(Debug)]
pub struct PathRecorder {
    scale: f64,
    paths: Vec<ScaledPath>,
    current: ScaledPath,
}

impl PathRecorder {
    pub fn new() -> Self {
        Self::with_scale(DEFAULT_SCALE)
    }

    pub fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            paths: Vec::new(),
            current: Vec::new(),
        }
    }

    /// Fixed scale factor, exposed for downstream unscaling.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn scale_point(&self, p: &Position) -> ScaledPoint {
        ScaledPoint {
            x: (p.x * self.scale).round() as i64,
            y: (p.y * self.scale).round() as i64,
        }
    }

    /// Append a point, skipping consecutive duplicates.
    fn push(&mut self, p: ScaledPoint) {
        if self.current.last() != Some(&p) {
            self.current.push(p);
        }
    }

    fn require_planar(from: &Position, to: &Position) -> Result<(), GeometryError> {
        if (to.z - from.z).abs() > 0.0 {
            return Err(GeometryError::NonPlanarMove {
                axis: Plane::Xy.normal(),
                from: from.z,
                to: to.z,
            });
        }
        Ok(())
    }

    /// All recorded subpaths, including the still-open one if non-empty.
    pub fn into_paths(mut self) -> Vec<ScaledPath> {
        if !self.current.is_empty() {
            self.paths.push(std::mem::take(&mut self.current));
        }
        self.paths
    }
}

impl Default for PathRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionConsumer for PathRecorder {
    fn motion(&mut self, event: &MotionEvent) -> Result<(), GeometryError> {
        match *event {
            MotionEvent::Rapid { .. } => {
                // Close the current subpath; repeated rapids are a no-op.
                if !self.current.is_empty() {
                    self.paths.push(std::mem::take(&mut self.current));
                }
            }
            MotionEvent::Linear { from, to } => {
                Self::require_planar(&from, &to)?;
                for p in expand_linear(from, to) {
                    let sp = self.scale_point(&p);
                    self.push(sp);
                }
            }
            MotionEvent::Arc {
                from,
                to,
                center,
                plane,
                rotation,
            } => {
                if plane != Plane::Xy {
                    return Err(GeometryError::PlaneMismatch {
                        expected: Plane::Xy,
                        active: plane,
                    });
                }
                Self::require_planar(&from, &to)?;
                for p in expand_arc(from, to, center, plane, rotation)? {
                    let sp = self.scale_point(&p);
                    self.push(sp);
                }
            }
        }
        Ok(())
    }
}
