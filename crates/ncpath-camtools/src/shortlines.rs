//! Short-line re-emission of a motion stream.
//!
//! Flattens every move into straight G0/G1 blocks: rapids and straight cuts
//! pass through as single blocks, arcs are discretized into chains of short
//! lines. The output is a G-code program equivalent to the input within the
//! arc sampling resolution, for controllers without circular interpolation.

use ncpath_core::arc::expand_arc;
use ncpath_core::error::GeometryError;
use ncpath_core::motion::{MotionEvent, Position};
use ncpath_core::units::r6;
use ncpath_core::MotionConsumer;

/// Motion consumer that re-emits every move as straight-line blocks.
#[derive(Debug, Default)]
pub struct ShortlineWriter {
    gcode: String,
}

impl ShortlineWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated G-code program.
    pub fn into_gcode(self) -> String {
        self.gcode
    }

    fn output_point(&mut self, p: &Position, rapid: bool) {
        let word = if rapid { "G0" } else { "G1" };
        self.gcode
            .push_str(&format!("{} X{} Y{} Z{}\n", word, r6(p.x), r6(p.y), r6(p.z)));
    }
}

impl MotionConsumer for ShortlineWriter {
    fn motion(&mut self, event: &MotionEvent) -> Result<(), GeometryError> {
        match *event {
            MotionEvent::Rapid { to, .. } => self.output_point(&to, true),
            MotionEvent::Linear { to, .. } => self.output_point(&to, false),
            MotionEvent::Arc {
                from,
                to,
                center,
                plane,
                rotation,
            } => {
                // The first sample is the current position; skip it.
                for p in expand_arc(from, to, center, plane, rotation)?.iter().skip(1) {
                    self.output_point(p, false);
                }
            }
        }
        Ok(())
    }
}
