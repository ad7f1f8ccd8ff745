//! Spiral pocket roughing.
//!
//! Alternative strategy to full contour offsetting: per depth step, peck
//! drill at the polygon centroid to open the pocket, then follow the
//! boundary as a single closing ring.

use crate::contour_pocket::ContourPocketParameters;
use crate::error::ParameterResult;
use crate::recorder::{ScaledPath, ScaledPoint};
use anyhow::Result;
use ncpath_core::units::r6;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Parameters for spiral pocketing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiralPocketParameters {
    /// Depth and feed parameters, shared with the contour planner.
    pub pocket: ContourPocketParameters,
    /// Climb milling, relative to clockwise cutter rotation. Recognized but
    /// does not currently alter point ordering.
    pub climb: bool,
}

/// Generator for spiral pocket G-code.
pub struct SpiralPocketGenerator {
    params: SpiralPocketParameters,
}

impl SpiralPocketGenerator {
    pub fn new(params: SpiralPocketParameters) -> ParameterResult<Self> {
        params.pocket.validate()?;
        Ok(Self { params })
    }

    /// Generate spiral pocketing G-code from recorded closed paths.
    pub fn generate(&self, paths: &[ScaledPath], scale: f64) -> Result<String> {
        let p = &self.params.pocket;
        let (n_steps, step_z) = p.depth_steps();
        tracing::debug!(n_steps, step_z, climb = self.params.climb, "spiral pocket plan");

        let mut gcode = String::new();
        writeln!(gcode, "G0 Z{}", r6(p.retract_z))?;

        for path in paths {
            if path.len() < 3 {
                tracing::debug!(points = path.len(), "skipping degenerate subpath");
                continue;
            }
            let ring: Vec<(f64, f64)> = path.iter().map(|sp| unscale(*sp, scale)).collect();
            let (cx, cy) = centroid(&ring);

            let mut z = step_z;
            for _step in 0..n_steps {
                // Open the pocket with a peck cycle at the centroid.
                writeln!(gcode, "G83 X{} Y{} Z-1 R1 Q0.5 F50", r6(cx), r6(cy))?;

                let (sx, sy) = ring[0];
                writeln!(gcode, "G0 X{} Y{}", r6(sx), r6(sy))?;
                writeln!(gcode, "G1 Z{} F{}", r6(z), r6(p.feed_rate / 2.0))?;

                for (x, y) in ring.iter().chain(std::iter::once(&ring[0])) {
                    writeln!(gcode, "   X{} Y{}", r6(*x), r6(*y))?;
                }
                gcode.push('\n');

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

/// Area-weighted polygon centroid (shoelace formula).
///
/// Falls back to the vertex mean for degenerate (near-zero-area) rings.
fn centroid(ring: &[(f64, f64)]) -> (f64, f64) {
    let n = ring.len();
    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % n];
        let cross = x0 * y1 - x1 * y0;
        area += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    area /= 2.0;
    if area.abs() < 1e-12 {
        let (sx, sy) = ring
            .iter()
            .fold((0.0, 0.0), |acc, p| (acc.0 + p.0, acc.1 + p.1));
        return (sx / n as f64, sy / n as f64);
    }
    (cx / (6.0 * area), cy / (6.0 * area))
}
