//! Arc and linear expansion into ordered point sequences.
//!
//! Converts circular moves into discrete sample points for consumers that
//! operate on point sequences (path recording, bounds tracking). Sampling
//! density is fixed at [`ARC_SAMPLES_PER_TURN`] steps per full turn, scaled
//! by the arc's angular span.

use crate::error::GeometryError;
use crate::motion::{Plane, Position};
use std::f64::consts::TAU;

/// Discretization resolution: steps per full turn.
pub const ARC_SAMPLES_PER_TURN: usize = 128;

const EPSILON: f64 = 1e-9;

/// Number of discretization steps for an angular span (always at least 1).
pub fn arc_step_count(span: f64) -> usize {
    let steps = (ARC_SAMPLES_PER_TURN as f64 * span.abs() / TAU).ceil() as usize;
    steps.max(1)
}

/// Project a position onto the in-plane axes (u, v) plus the out-of-plane
/// axis w, with (u, v) chosen right-handed about the plane normal.
fn project(p: Position, plane: Plane) -> (f64, f64, f64) {
    match plane {
        Plane::Xy => (p.x, p.y, p.z),
        Plane::Xz => (p.z, p.x, p.y),
        Plane::Yz => (p.y, p.z, p.x),
    }
}

fn unproject(u: f64, v: f64, w: f64, plane: Plane) -> Position {
    match plane {
        Plane::Xy => Position::new(u, v, w),
        Plane::Xz => Position::new(v, w, u),
        Plane::Yz => Position::new(w, u, v),
    }
}

/// Signed angular span from `start_theta` to `end_theta`, walking in the
/// direction selected by the sign of `rotation` (negative is clockwise).
/// A coincident start/end is treated as a full turn. Additional turns beyond
/// the first extend the span by whole revolutions.
fn arc_span(start_theta: f64, end_theta: f64, rotation: i32) -> f64 {
    let mut delta = end_theta - start_theta;
    if rotation < 0 {
        if delta > 0.0 {
            delta -= TAU;
        } else if delta == 0.0 {
            delta = -TAU;
        }
    } else if delta < 0.0 {
        delta += TAU;
    } else if delta == 0.0 {
        delta = TAU;
    }
    let extra_turns = rotation.unsigned_abs().saturating_sub(1) as f64;
    delta + extra_turns * TAU * delta.signum()
}

/// Expand an arc into an ordered sequence of sample positions.
///
/// The result includes both endpoints: the first sample is exactly `from`
/// and the last is exactly `to`. The out-of-plane coordinate interpolates
/// linearly, so helical moves expand correctly.
pub fn expand_arc(
    from: Position,
    to: Position,
    center: Position,
    plane: Plane,
    rotation: i32,
) -> Result<Vec<Position>, GeometryError> {
    let (cu, cv, _) = project(center, plane);
    let (fu, fv, fw) = project(from, plane);
    let (tu, tv, tw) = project(to, plane);

    let radius = (fu - cu).hypot(fv - cv);
    if radius <= EPSILON {
        return Err(GeometryError::DegenerateArc);
    }

    let start_theta = (fv - cv).atan2(fu - cu);
    let end_theta = (tv - cv).atan2(tu - cu);
    let span = arc_span(start_theta, end_theta, rotation);
    let steps = arc_step_count(span);

    let mut points = Vec::with_capacity(steps + 1);
    points.push(from);
    for i in 1..steps {
        let t = i as f64 / steps as f64;
        let theta = start_theta + span * t;
        let u = cu + radius * theta.cos();
        let v = cv + radius * theta.sin();
        let w = fw + (tw - fw) * t;
        points.push(unproject(u, v, w, plane));
    }
    points.push(to);
    Ok(points)
}

/// Expand a straight move. Trivial, but lets consumers treat linear and
/// circular moves uniformly.
pub fn expand_linear(from: Position, to: Position) -> Vec<Position> {
    vec![from, to]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_half_turn_step_count() {
        assert_eq!(arc_step_count(PI), ARC_SAMPLES_PER_TURN / 2);
        assert_eq!(arc_step_count(TAU), ARC_SAMPLES_PER_TURN);
        assert_eq!(arc_step_count(0.001), 1);
    }

    #[test]
    fn test_ccw_half_circle_endpoints() {
        let from = Position::new(10.0, 0.0, 0.0);
        let to = Position::new(-10.0, 0.0, 0.0);
        let center = Position::default();
        let points = expand_arc(from, to, center, Plane::Xy, 1).unwrap();
        assert_eq!(points.len(), arc_step_count(PI) + 1);
        assert_eq!(points[0], from);
        assert_eq!(*points.last().unwrap(), to);
        // Top of the circle is on the CCW path.
        let top = points
            .iter()
            .map(|p| p.y)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!((top - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_cw_half_circle_goes_below() {
        let from = Position::new(10.0, 0.0, 0.0);
        let to = Position::new(-10.0, 0.0, 0.0);
        let center = Position::default();
        let points = expand_arc(from, to, center, Plane::Xy, -1).unwrap();
        let bottom = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        assert!((bottom + 10.0).abs() < 0.01);
    }

    #[test]
    fn test_full_circle() {
        let from = Position::new(5.0, 0.0, 0.0);
        let center = Position::default();
        let points = expand_arc(from, from, center, Plane::Xy, 1).unwrap();
        assert_eq!(points.len(), ARC_SAMPLES_PER_TURN + 1);
        for p in &points {
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!((r - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_multi_turn_helix() {
        let from = Position::new(5.0, 0.0, 0.0);
        let to = Position::new(5.0, 0.0, -4.0);
        let center = Position::default();
        let points = expand_arc(from, to, center, Plane::Xy, 2).unwrap();
        assert_eq!(points.len(), 2 * ARC_SAMPLES_PER_TURN + 1);
        // Z descends monotonically along the helix.
        for pair in points.windows(2) {
            assert!(pair[1].z <= pair[0].z);
        }
        assert_eq!(*points.last().unwrap(), to);
    }

    #[test]
    fn test_degenerate_arc() {
        let from = Position::new(1.0, 1.0, 0.0);
        let center = Position::new(1.0, 1.0, 0.0);
        let result = expand_arc(from, from, center, Plane::Xy, 1);
        assert_eq!(result, Err(GeometryError::DegenerateArc));
    }

    #[test]
    fn test_xz_plane_arc_stays_in_plane() {
        let from = Position::new(10.0, 2.0, 0.0);
        let to = Position::new(0.0, 2.0, 10.0);
        let center = Position::new(0.0, 2.0, 0.0);
        let points = expand_arc(from, to, center, Plane::Xz, -1).unwrap();
        for p in &points {
            assert!((p.y - 2.0).abs() < 1e-9);
        }
    }
}
