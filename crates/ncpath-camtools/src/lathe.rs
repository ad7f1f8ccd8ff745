//! Lathe roughing analysis over an X/Z profile.
//!
//! Records a turned-part profile as typed line/arc segments, then derives a
//! roughing plan: bounding box, X/Z monotonicity, pass count and per-pass
//! ray intersections at successive X stepdowns. Cut-path synthesis from the
//! intersection sets is deliberately left to callers; the plan itself is the
//! contractual boundary.

use crate::error::{ParameterError, ParameterResult};
use anyhow::{bail, Result};
use ncpath_core::error::GeometryError;
use ncpath_core::motion::{MotionEvent, Plane};
use ncpath_core::MotionConsumer;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Samples per full turn when discretizing profile arcs.
const ARC_SAMPLES_PER_TURN: f64 = 128.0;

const EPSILON: f64 = 1e-9;

/// 2D point in the lathe X/Z plane (X = radius, Z = along the spindle axis).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    pub x: f64,
    pub z: f64,
}

impl ProfilePoint {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    pub fn distance_to(&self, other: &ProfilePoint) -> f64 {
        (other.x - self.x).hypot(other.z - self.z)
    }
}

/// Turn direction of a profile arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcDirection {
    Cw,
    Ccw,
}

/// One typed segment of the recorded profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProfileSegment {
    Line {
        a: ProfilePoint,
        b: ProfilePoint,
    },
    Arc {
        center: ProfilePoint,
        a: ProfilePoint,
        b: ProfilePoint,
        dir: ArcDirection,
    },
}

/// Motion consumer recording an X/Z profile as typed segments.
///
/// Rapids are ignored; the profile is the cutting geometry only. All cutting
/// moves must stay in the XZ plane.
#[derive(Debug, Default)]
pub struct ProfileRecorder {
    segments: Vec<ProfileSegment>,
}

impl ProfileRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_profile(self) -> Vec<ProfileSegment> {
        self.segments
    }
}

impl MotionConsumer for ProfileRecorder {
    fn motion(&mut self, event: &MotionEvent) -> Result<(), GeometryError> {
        match *event {
            MotionEvent::Rapid { .. } => {}
            MotionEvent::Linear { from, to } => {
                if (to.y - from.y).abs() > 0.0 {
                    return Err(GeometryError::NonPlanarMove {
                        axis: Plane::Xz.normal(),
                        from: from.y,
                        to: to.y,
                    });
                }
                let a = ProfilePoint::new(from.x, from.z);
                let b = ProfilePoint::new(to.x, to.z);
                if a.distance_to(&b) > EPSILON {
                    self.segments.push(ProfileSegment::Line { a, b });
                }
            }
            MotionEvent::Arc {
                from,
                to,
                center,
                plane,
                rotation,
            } => {
                if plane != Plane::Xz {
                    return Err(GeometryError::PlaneMismatch {
                        expected: Plane::Xz,
                        active: plane,
                    });
                }
                if (to.y - from.y).abs() > 0.0 {
                    return Err(GeometryError::NonPlanarMove {
                        axis: Plane::Xz.normal(),
                        from: from.y,
                        to: to.y,
                    });
                }
                self.segments.push(ProfileSegment::Arc {
                    center: ProfilePoint::new(center.x, center.z),
                    a: ProfilePoint::new(from.x, from.z),
                    b: ProfilePoint::new(to.x, to.z),
                    dir: if rotation < 0 {
                        ArcDirection::Cw
                    } else {
                        ArcDirection::Ccw
                    },
                });
            }
        }
        Ok(())
    }
}

/// Ray in the X/Z plane: origin plus direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: ProfilePoint,
    pub direction: ProfilePoint,
}

impl Ray {
    /// Ray along +Z at the given X, starting at `z`.
    pub fn vertical(x: f64, z: f64) -> Self {
        Self {
            origin: ProfilePoint::new(x, z),
            direction: ProfilePoint::new(0.0, 1.0),
        }
    }
}

/// Angle of `p` about `center`, measured from +X toward +Z.
fn theta(center: ProfilePoint, p: ProfilePoint) -> f64 {
    (p.z - center.z).atan2(p.x - center.x)
}

/// Signed angular span of an arc, walking in its declared direction.
///
/// Clockwise spans decrease from the start angle (wrapping through -2π);
/// counter-clockwise spans increase (wrapping through +2π). A coincident
/// start/end is a full turn.
fn arc_span(start_theta: f64, end_theta: f64, dir: ArcDirection) -> f64 {
    let mut delta = end_theta - start_theta;
    match dir {
        ArcDirection::Cw => {
            if delta > 0.0 {
                delta -= TAU;
            } else if delta == 0.0 {
                delta = -TAU;
            }
        }
        ArcDirection::Ccw => {
            if delta < 0.0 {
                delta += TAU;
            } else if delta == 0.0 {
                delta = TAU;
            }
        }
    }
    delta
}

/// Whether `angle` lies within the arc walk from `start_theta` over `span`.
fn angle_in_span(angle: f64, start_theta: f64, span: f64) -> bool {
    let rel = if span >= 0.0 {
        (angle - start_theta).rem_euclid(TAU)
    } else {
        (start_theta - angle).rem_euclid(TAU)
    };
    rel <= span.abs() + EPSILON
}

/// Ray/segment intersection, parametric. Collinear overlap is ignored.
pub fn ray_intersects_line(ray: &Ray, a: ProfilePoint, b: ProfilePoint) -> bool {
    let e = ProfilePoint::new(b.x - a.x, b.z - a.z);
    let d = ray.direction;
    let det = e.x * d.z - e.z * d.x;
    if det.abs() < EPSILON {
        return false;
    }
    let ox = a.x - ray.origin.x;
    let oz = a.z - ray.origin.z;
    let t = (e.x * oz - e.z * ox) / det;
    let s = (d.x * oz - d.z * ox) / det;
    t >= -EPSILON && (-EPSILON..=1.0 + EPSILON).contains(&s)
}

/// Ray/arc intersection for a vertical ray.
///
/// The ray's X gives up to two candidate points on the arc's circle; each is
/// a hit when its angle lies in the arc's span and it sits ahead of the ray
/// origin. Returns the two candidates (upper, lower) independently.
pub fn vertical_ray_intersects_arc(
    ray: &Ray,
    center: ProfilePoint,
    a: ProfilePoint,
    b: ProfilePoint,
    dir: ArcDirection,
) -> (bool, bool) {
    let radius = center.distance_to(&a);
    let dx = ray.origin.x - center.x;
    if dx.abs() > radius {
        return (false, false);
    }
    let dz = (radius * radius - dx * dx).sqrt();
    let start_theta = theta(center, a);
    let span = arc_span(start_theta, theta(center, b), dir);

    let candidate = |z: f64| -> bool {
        let angle = (z - center.z).atan2(dx);
        angle_in_span(angle, start_theta, span) && z >= ray.origin.z - EPSILON
    };
    (candidate(center.z + dz), candidate(center.z - dz))
}

/// True when the ray hits the segment at all.
pub fn ray_intersects(ray: &Ray, segment: &ProfileSegment) -> bool {
    match *segment {
        ProfileSegment::Line { a, b } => ray_intersects_line(ray, a, b),
        ProfileSegment::Arc { center, a, b, dir } => {
            let (upper, lower) = vertical_ray_intersects_arc(ray, center, a, b, dir);
            upper || lower
        }
    }
}

/// Sample an arc at [`ARC_SAMPLES_PER_TURN`] scaled by its span, endpoints
/// included.
fn sample_arc(
    center: ProfilePoint,
    a: ProfilePoint,
    b: ProfilePoint,
    dir: ArcDirection,
    mut visit: impl FnMut(ProfilePoint),
) {
    let radius = center.distance_to(&a);
    let start_theta = theta(center, a);
    let span = arc_span(start_theta, theta(center, b), dir);
    let steps = ((ARC_SAMPLES_PER_TURN / TAU) * span.abs()).floor().max(1.0) as usize;
    let dt = span / steps as f64;
    for s in 0..=steps {
        let t = start_theta + dt * s as f64;
        visit(ProfilePoint::new(
            center.x + radius * t.cos(),
            center.z + radius * t.sin(),
        ));
    }
}

fn sign(v: f64) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Sticky monotonicity state over sampled profile deltas.
#[derive(Debug)]
struct Monotonicity {
    monotonic_x: bool,
    monotonic_z: bool,
    dir_x: i32,
    dir_z: i32,
}

impl Monotonicity {
    fn new() -> Self {
        Self {
            monotonic_x: true,
            monotonic_z: true,
            dir_x: 0,
            dir_z: 0,
        }
    }

    fn step(&mut self, from: ProfilePoint, to: ProfilePoint) {
        let dx = sign(to.x - from.x);
        let dz = sign(to.z - from.z);
        if dx != 0 {
            if self.dir_x == 0 {
                self.dir_x = dx;
            }
            if dx != self.dir_x {
                self.monotonic_x = false;
            }
        }
        if dz != 0 {
            if self.dir_z == 0 {
                self.dir_z = dz;
            }
            if dz != self.dir_z {
                self.monotonic_z = false;
            }
        }
    }

    fn segment(&mut self, segment: &ProfileSegment) {
        match *segment {
            ProfileSegment::Line { a, b } => self.step(a, b),
            ProfileSegment::Arc { center, a, b, dir } => {
                let mut last: Option<ProfilePoint> = None;
                sample_arc(center, a, b, dir, |p| {
                    if let Some(lp) = last {
                        self.step(lp, p);
                    }
                    last = Some(p);
                });
            }
        }
    }
}

/// Profile monotonicity along X and Z. Once a direction reversal is seen the
/// corresponding flag stays false.
pub fn monotonicity(profile: &[ProfileSegment]) -> (bool, bool) {
    let mut state = Monotonicity::new();
    for segment in profile {
        state.segment(segment);
    }
    (state.monotonic_x, state.monotonic_z)
}

/// Bounding box of the profile (arc bulges included via sampling).
pub fn profile_bounds(profile: &[ProfileSegment]) -> Option<(ProfilePoint, ProfilePoint)> {
    let mut bounds: Option<(ProfilePoint, ProfilePoint)> = None;
    let mut insert = |p: ProfilePoint| match &mut bounds {
        Some((min, max)) => {
            min.x = min.x.min(p.x);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.z = max.z.max(p.z);
        }
        None => bounds = Some((p, p)),
    };
    for segment in profile {
        match *segment {
            ProfileSegment::Line { a, b } => {
                insert(a);
                insert(b);
            }
            ProfileSegment::Arc { center, a, b, dir } => {
                sample_arc(center, a, b, dir, &mut insert);
            }
        }
    }
    bounds
}

/// Parameters for lathe roughing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatheRoughingParameters {
    /// Roughing stepdown in X (mm, positive)
    pub stepdown: f64,
    /// Retraction per cut (mm)
    pub retract: f64,
    /// Tool position before roughing; selects the traversal direction from
    /// the nearest bounding-box corner.
    pub tool_start: ProfilePoint,
}

impl LatheRoughingParameters {
    pub fn validate(&self) -> ParameterResult<()> {
        if self.stepdown <= 0.0 {
            return Err(ParameterError::OutOfRange {
                name: "stepdown",
                value: self.stepdown,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if self.retract < 0.0 {
            return Err(ParameterError::OutOfRange {
                name: "retract",
                value: self.retract,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        Ok(())
    }
}

/// One roughing pass: the X depth and the profile segments the vertical ray
/// at that depth intersects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoughingPass {
    pub x: f64,
    pub intersections: Vec<ProfileSegment>,
}

/// Result of roughing analysis. Path synthesis from `cuts` is an extension
/// point for callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoughingPlan {
    pub passes: u32,
    pub step_x: f64,
    pub monotonic_x: bool,
    pub monotonic_z: bool,
    pub min: ProfilePoint,
    pub max: ProfilePoint,
    pub cuts: Vec<RoughingPass>,
}

/// Roughing planner over a recorded profile.
pub struct LatheRoughingPlanner {
    params: LatheRoughingParameters,
}

impl LatheRoughingPlanner {
    pub fn new(params: LatheRoughingParameters) -> ParameterResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Analyze the profile: bounds, monotonicity, pass layout and per-pass
    /// intersection sets.
    pub fn plan(&self, profile: &[ProfileSegment]) -> Result<RoughingPlan> {
        let Some((min, max)) = profile_bounds(profile) else {
            bail!("profile is empty");
        };
        let (monotonic_x, monotonic_z) = monotonicity(profile);

        let width = max.x - min.x;
        let passes = (width.abs() / self.params.stepdown).floor() as u32;
        // Exact re-division so all passes are equal.
        let mut step_x = if passes > 0 { width / passes as f64 } else { 0.0 };

        // Start at the bounding-box corner nearest the tool and walk away
        // from it.
        let start = &self.params.tool_start;
        let mut x = if (start.x - min.x).abs() <= (start.x - max.x).abs() {
            min.x
        } else {
            step_x = -step_x;
            max.x
        };

        tracing::debug!(passes, step_x, monotonic_x, monotonic_z, "roughing plan");

        let ray_z = min.z - 1.0;
        let mut cuts = Vec::with_capacity(passes as usize);
        for _pass in 0..passes {
            x += step_x;
            let ray = Ray::vertical(x, ray_z);
            let intersections: Vec<ProfileSegment> = profile
                .iter()
                .filter(|segment| ray_intersects(&ray, segment))
                .copied()
                .collect();
            cuts.push(RoughingPass { x, intersections });
        }

        Ok(RoughingPlan {
            passes,
            step_x,
            monotonic_x,
            monotonic_z,
            min,
            max,
            cuts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ax: f64, az: f64, bx: f64, bz: f64) -> ProfileSegment {
        ProfileSegment::Line {
            a: ProfilePoint::new(ax, az),
            b: ProfilePoint::new(bx, bz),
        }
    }

    fn params() -> LatheRoughingParameters {
        LatheRoughingParameters {
            stepdown: 3.0,
            retract: 0.5,
            tool_start: ProfilePoint::default(),
        }
    }

    #[test]
    fn test_monotonic_profile_reports_both_flags() {
        let profile = vec![
            line(0.0, 0.0, 5.0, 1.0),
            line(5.0, 1.0, 8.0, 3.0),
            line(8.0, 3.0, 10.0, 3.0),
        ];
        assert_eq!(monotonicity(&profile), (true, true));
    }

    #[test]
    fn test_x_reversal_is_sticky_and_independent() {
        let profile = vec![
            line(0.0, 0.0, 5.0, 1.0),
            // X reverses, Z keeps increasing.
            line(5.0, 1.0, 3.0, 2.0),
            line(3.0, 2.0, 6.0, 3.0),
        ];
        let (mx, mz) = monotonicity(&profile);
        assert!(!mx);
        assert!(mz);
    }

    #[test]
    fn test_arc_samples_feed_monotonicity() {
        // Quarter circle from (10,0) to (0,10) about the origin walks X down
        // and Z up; a following line continuing that way keeps both verdicts.
        let profile = vec![
            ProfileSegment::Arc {
                center: ProfilePoint::default(),
                a: ProfilePoint::new(10.0, 0.0),
                b: ProfilePoint::new(0.0, 10.0),
                dir: ArcDirection::Ccw,
            },
            line(0.0, 10.0, -2.0, 12.0),
        ];
        assert_eq!(monotonicity(&profile), (true, true));
    }

    #[test]
    fn test_ray_hits_line_segment() {
        let ray = Ray::vertical(5.0, -10.0);
        assert!(ray_intersects_line(
            &ray,
            ProfilePoint::new(0.0, 0.0),
            ProfilePoint::new(10.0, 0.0)
        ));
        // Segment entirely left of the ray.
        assert!(!ray_intersects_line(
            &ray,
            ProfilePoint::new(0.0, 0.0),
            ProfilePoint::new(4.0, 0.0)
        ));
        // Segment behind the ray origin.
        assert!(!ray_intersects_line(
            &ray,
            ProfilePoint::new(0.0, -20.0),
            ProfilePoint::new(10.0, -20.0)
        ));
    }

    #[test]
    fn test_vertical_ray_parallel_segment_misses() {
        let ray = Ray::vertical(5.0, 0.0);
        assert!(!ray_intersects_line(
            &ray,
            ProfilePoint::new(5.0, 1.0),
            ProfilePoint::new(5.0, 3.0)
        ));
    }

    #[test]
    fn test_ray_arc_angular_span() {
        // Quarter arc in the first quadrant, CCW from angle 0 to π/2.
        let center = ProfilePoint::default();
        let a = ProfilePoint::new(10.0, 0.0);
        let b = ProfilePoint::new(0.0, 10.0);
        let dir = ArcDirection::Ccw;

        let ray = Ray::vertical(7.0, -20.0);
        let (upper, lower) = vertical_ray_intersects_arc(&ray, center, a, b, dir);
        assert!(upper);
        assert!(!lower);

        // X inside the circle but outside the angular span.
        let ray = Ray::vertical(-5.0, -20.0);
        let (upper, lower) = vertical_ray_intersects_arc(&ray, center, a, b, dir);
        assert!(!upper);
        assert!(!lower);

        // X outside the circle entirely.
        let ray = Ray::vertical(15.0, -20.0);
        assert_eq!(
            vertical_ray_intersects_arc(&ray, center, a, b, dir),
            (false, false)
        );
    }

    #[test]
    fn test_cw_span_walks_the_other_way() {
        // Same endpoints, clockwise: the walk covers the other three
        // quadrants, so x=-5 now hits and x=7 only via the lower candidate.
        let center = ProfilePoint::default();
        let a = ProfilePoint::new(10.0, 0.0);
        let b = ProfilePoint::new(0.0, 10.0);
        let dir = ArcDirection::Cw;

        let ray = Ray::vertical(-5.0, -20.0);
        let (upper, lower) = vertical_ray_intersects_arc(&ray, center, a, b, dir);
        assert!(upper || lower);

        let ray = Ray::vertical(7.0, -20.0);
        let (upper, lower) = vertical_ray_intersects_arc(&ray, center, a, b, dir);
        assert!(!upper);
        assert!(lower);
    }

    #[test]
    fn test_pass_layout_redivides_exactly() {
        let profile = vec![line(0.0, 0.0, 10.0, 5.0)];
        let plan = LatheRoughingPlanner::new(params())
            .unwrap()
            .plan(&profile)
            .unwrap();
        assert_eq!(plan.passes, 3);
        assert!((plan.step_x - 10.0 / 3.0).abs() < 1e-12);
        assert_eq!(plan.cuts.len(), 3);
        // Final pass lands exactly on the far edge.
        assert!((plan.cuts.last().unwrap().x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_direction_from_tool_start() {
        let profile = vec![line(0.0, 0.0, 10.0, 5.0)];
        let mut p = params();
        p.tool_start = ProfilePoint::new(20.0, 0.0);
        let plan = LatheRoughingPlanner::new(p).unwrap().plan(&profile).unwrap();
        assert!(plan.step_x < 0.0);
        assert!(plan.cuts[0].x < 10.0);
    }

    #[test]
    fn test_narrow_profile_has_no_passes() {
        let profile = vec![line(0.0, 0.0, 1.0, 5.0)];
        let plan = LatheRoughingPlanner::new(params())
            .unwrap()
            .plan(&profile)
            .unwrap();
        assert_eq!(plan.passes, 0);
        assert!(plan.cuts.is_empty());
    }

    #[test]
    fn test_empty_profile_is_an_error() {
        let planner = LatheRoughingPlanner::new(params()).unwrap();
        assert!(planner.plan(&[]).is_err());
    }

    #[test]
    fn test_recorder_captures_typed_segments() {
        use ncpath_core::motion::Position;

        let mut recorder = ProfileRecorder::new();
        recorder
            .motion(&MotionEvent::Rapid {
                from: Position::default(),
                to: Position::new(0.0, 0.0, 5.0),
            })
            .unwrap();
        recorder
            .motion(&MotionEvent::Linear {
                from: Position::new(0.0, 0.0, 5.0),
                to: Position::new(10.0, 0.0, 5.0),
            })
            .unwrap();
        recorder
            .motion(&MotionEvent::Arc {
                from: Position::new(10.0, 0.0, 5.0),
                to: Position::new(0.0, 0.0, 15.0),
                center: Position::new(0.0, 0.0, 5.0),
                plane: Plane::Xz,
                rotation: -1,
            })
            .unwrap();

        let profile = recorder.into_profile();
        assert_eq!(profile.len(), 2);
        assert!(matches!(profile[0], ProfileSegment::Line { .. }));
        assert!(matches!(
            profile[1],
            ProfileSegment::Arc {
                dir: ArcDirection::Cw,
                ..
            }
        ));
    }

    #[test]
    fn test_recorder_rejects_xy_arcs() {
        use ncpath_core::motion::Position;

        let mut recorder = ProfileRecorder::new();
        let result = recorder.motion(&MotionEvent::Arc {
            from: Position::new(10.0, 0.0, 0.0),
            to: Position::new(-10.0, 0.0, 0.0),
            center: Position::default(),
            plane: Plane::Xy,
            rotation: 1,
        });
        assert!(matches!(
            result,
            Err(GeometryError::PlaneMismatch {
                expected: Plane::Xz,
                ..
            })
        ));
    }
}
