//! Bounding-box accumulation over a motion event stream.
//!
//! Folds observed endpoints into a minimal axis-aligned box. Arcs contribute
//! their full discretized curve, not just the chord endpoints, since an arc
//! can bulge outside the chord's box.

use ncpath_core::arc::expand_arc;
use ncpath_core::error::GeometryError;
use ncpath_core::motion::{MotionEvent, Position};
use ncpath_core::MotionConsumer;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box over 3D positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    pub min: Position,
    pub max: Position,
}

impl Bbox {
    /// Box containing exactly one point.
    pub fn from_point(p: Position) -> Self {
        Self { min: p, max: p }
    }

    /// Grow the box to contain `p`.
    pub fn insert(&mut self, p: Position) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }
}

/// Motion consumer that accumulates a bounding box.
///
/// The two inclusion modes are independent: cut mode folds linear and arc
/// moves, rapid mode folds rapid traversals.
#[derive(Debug)]
pub struct BoundsTracker {
    track_cut: bool,
    track_rapid: bool,
    bbox: Option<Bbox>,
}

impl BoundsTracker {
    pub fn new(track_cut: bool, track_rapid: bool) -> Self {
        Self {
            track_cut,
            track_rapid,
            bbox: None,
        }
    }

    fn insert(&mut self, p: Position) {
        match &mut self.bbox {
            Some(bbox) => bbox.insert(p),
            None => self.bbox = Some(Bbox::from_point(p)),
        }
    }

    /// Final box, or `None` if no tracked move was observed.
    pub fn bounding_box(&self) -> Option<Bbox> {
        self.bbox
    }
}

impl MotionConsumer for BoundsTracker {
    fn motion(&mut self, event: &MotionEvent) -> Result<(), GeometryError> {
        match *event {
            MotionEvent::Rapid { from, to } => {
                if self.track_rapid {
                    self.insert(from);
                    self.insert(to);
                }
            }
            MotionEvent::Linear { from, to } => {
                if self.track_cut {
                    self.insert(from);
                    self.insert(to);
                }
            }
            MotionEvent::Arc {
                from,
                to,
                center,
                plane,
                rotation,
            } => {
                if self.track_cut {
                    for p in expand_arc(from, to, center, plane, rotation)? {
                        self.insert(p);
                    }
                }
            }
        }
        Ok(())
    }
}
