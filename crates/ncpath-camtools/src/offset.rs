//! Inward polygon offsetting over scaled integer paths.
//!
//! Thin wrapper around `cavalier_contours` implementing the offset contract
//! the pocket planner needs: one closed source polygon in, zero or more
//! closed rings out for a given inward offset magnitude. Offsets run in
//! scaled grid space; results are rounded back onto the grid.

use crate::recorder::{ScaledPath, ScaledPoint};
use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline};

/// Offsetter bound to one closed source path.
#[derive(Debug)]
pub struct PathOffsetter {
    pline: Polyline<f64>,
    source: ScaledPath,
}

impl PathOffsetter {
    /// Build an offsetter from a recorded closed path.
    ///
    /// Duplicate closing vertices are dropped and the winding is normalized
    /// to clockwise so a negative engine offset always moves inward.
    pub fn new(path: &[ScaledPoint]) -> Self {
        let mut vertices: Vec<ScaledPoint> = Vec::with_capacity(path.len());
        for p in path {
            if vertices.last() != Some(p) {
                vertices.push(*p);
            }
        }
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if signed_area(&vertices) > 0.0 {
            vertices.reverse();
        }

        let mut pline = Polyline::new();
        for v in &vertices {
            pline.add_vertex(PlineVertex::new(v.x as f64, v.y as f64, 0.0));
        }
        pline.set_is_closed(true);

        Self {
            pline,
            source: vertices,
        }
    }

    /// Offset inward by `magnitude` grid units (non-negative).
    ///
    /// A zero magnitude returns the source ring itself; once the pocket has
    /// fully closed the result is empty. Non-convex pockets may split into
    /// several rings.
    pub fn execute(&self, magnitude: f64) -> Vec<ScaledPath> {
        if self.source.len() < 3 {
            return Vec::new();
        }
        if magnitude == 0.0 {
            return vec![self.source.clone()];
        }
        self.pline
            .parallel_offset(-magnitude)
            .into_iter()
            .map(|ring| {
                ring.vertex_data
                    .iter()
                    .map(|v| ScaledPoint {
                        x: v.x.round() as i64,
                        y: v.y.round() as i64,
                    })
                    .collect::<ScaledPath>()
            })
            .filter(|ring| ring.len() >= 3)
            .collect()
    }
}

/// Shoelace signed area; positive for counter-clockwise winding.
fn signed_area(vertices: &[ScaledPoint]) -> f64 {
    let mut area = 0.0;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        area += (a.x as f64) * (b.y as f64) - (b.x as f64) * (a.y as f64);
    }
    area / 2.0
}
