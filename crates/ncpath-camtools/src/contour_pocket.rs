//! Contour-parallel pocket roughing.
//!
//! Clears each recorded closed path by offsetting it inward in tool-stepover
//! increments until the pocket closes, at every depth step. Rings are
//! stitched greedily: each ring is rotated to start at the point nearest the
//! current tool position before being emitted as one continuous cut.

use crate::error::{ParameterError, ParameterResult};
use crate::offset::PathOffsetter;
use crate::recorder::{ScaledPath, ScaledPoint};
use anyhow::Result;
use ncpath_core::units::r6;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Parameters for contour-parallel pocketing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContourPocketParameters {
    /// Tool radius (mm)
    pub tool_radius: f64,
    /// Stepover fraction of the tool diameter, in (0, 1]
    pub stepover: f64,
    /// Final cut depth (mm, negative = below surface)
    pub cut_z: f64,
    /// Cutting feed rate (mm/min); plunges run at half this rate
    pub feed_rate: f64,
    /// Depth increment per pass (mm, positive)
    pub stepdown: f64,
    /// Z height for rapid traversal between cuts (mm)
    pub retract_z: f64,
}

impl ContourPocketParameters {
    pub fn validate(&self) -> ParameterResult<()> {
        if self.tool_radius <= 0.0 {
            return Err(ParameterError::OutOfRange {
                name: "tool_radius",
                value: self.tool_radius,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if self.stepover <= 0.0 || self.stepover > 1.0 {
            return Err(ParameterError::OutOfRange {
                name: "stepover",
                value: self.stepover,
                min: 0.0,
                max: 1.0,
            });
        }
        if self.cut_z >= 0.0 {
            return Err(ParameterError::InvalidValue {
                name: "cut_z",
                reason: "must be below the surface (negative)",
            });
        }
        if self.feed_rate <= 0.0 {
            return Err(ParameterError::OutOfRange {
                name: "feed_rate",
                value: self.feed_rate,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if self.stepdown <= 0.0 {
            return Err(ParameterError::OutOfRange {
                name: "stepdown",
                value: self.stepdown,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        Ok(())
    }

    /// Depth steps from the surface to `cut_z`, equally divided.
    pub fn depth_steps(&self) -> (u32, f64) {
        let n = (self.cut_z.abs() / self.stepdown).ceil() as u32;
        (n, self.cut_z / n as f64)
    }

    /// Spacing between successive offset rings.
    pub fn ring_spacing(&self) -> f64 {
        2.0 * self.tool_radius * self.stepover
    }
}

/// Generator for contour-parallel pocket G-code.
pub struct ContourPocketGenerator {
    params: ContourPocketParameters,
}

impl ContourPocketGenerator {
    /// Create a generator, validating the parameters up front.
    pub fn new(params: ContourPocketParameters) -> ParameterResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Generate pocketing G-code from recorded closed paths.
    ///
    /// `scale` is the recorder's grid scale used to unscale emitted
    /// coordinates. Output order per depth step: rapid to the first ring's
    /// start, plunge at half feed, one closed cut per ring, retract.
    pub fn generate(&self, paths: &[ScaledPath], scale: f64) -> Result<String> {
        let p = &self.params;
        let (n_steps, step_z) = p.depth_steps();
        let ring_spacing = p.ring_spacing();
        tracing::debug!(n_steps, step_z, ring_spacing, "contour pocket plan");

        let mut gcode = String::new();
        let mut current = (0.0_f64, 0.0_f64);
        writeln!(gcode, "G0 Z{}", r6(p.retract_z))?;

        for path in paths {
            if path.len() < 3 {
                tracing::debug!(points = path.len(), "skipping degenerate subpath");
                continue;
            }
            let offsetter = PathOffsetter::new(path);

            let mut z = step_z;
            for _step in 0..n_steps {
                let mut rapid_to_first = true;
                let mut magnitude = 0.0_f64;
                loop {
                    let rings = offsetter.execute(magnitude * scale);
                    if rings.is_empty() {
                        break;
                    }
                    for ring in rings {
                        let ring = rotate_to_nearest(ring, current, scale);
                        let start = unscale(ring[0], scale);

                        if rapid_to_first {
                            writeln!(gcode, "G0 X{} Y{}", r6(start.0), r6(start.1))?;
                            writeln!(gcode, "G1 Z{} F{}", r6(z), r6(p.feed_rate / 2.0))?;
                            rapid_to_first = false;
                        }

                        // Close the ring by returning to its start point.
                        for point in ring.iter().chain(std::iter::once(&ring[0])) {
                            let (x, y) = unscale(*point, scale);
                            writeln!(gcode, "   X{} Y{}", r6(x), r6(y))?;
                        }
                        gcode.push('\n');

                        current = start;
                    }
                    magnitude += ring_spacing;
                }
                writeln!(gcode, "G0 Z{}", r6(p.retract_z))?;
                z += step_z;
            }
        }

        Ok(gcode)
    }
}

fn unscale(p: ScaledPoint, scale: f64) -> (f64, f64) {
    (p.x as f64 / scale, p.y as f64 / scale)
}

/// Rotate the ring so it starts at the point nearest `target`.
///
/// Ties keep the first such point in the original order, so the stitching is
/// deterministic.
fn rotate_to_nearest(mut ring: ScaledPath, target: (f64, f64), scale: f64) -> ScaledPath {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, p) in ring.iter().enumerate() {
        let (x, y) = unscale(*p, scale);
        let dist = (x - target.0).hypot(y - target.1);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    ring.rotate_left(best);
    ring
}
