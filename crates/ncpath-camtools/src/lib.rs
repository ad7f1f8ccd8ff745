//! # ncpath CAM tools
//!
//! Planners that consume the motion-event stream produced by
//! `ncpath-core` and synthesize derived geometric artifacts:
//!
//! - **Bounds Tracker**: minimal axis-aligned box over cut and/or rapid moves
//! - **Path Recorder**: closed 2D toolpaths on a fixed-point integer grid
//! - **Contour Pocket**: depth-stepped clearing by iterative inward offsetting
//! - **Spiral Pocket**: centroid peck entry plus boundary ring per depth step
//! - **Lathe Roughing**: pass layout and ray-intersection analysis of an X/Z
//!   profile
//! - **Shortlines**: arc-free re-emission of the stream as straight blocks
//!
//! All planners validate their configuration up front and emit plain-text
//! motion commands in generation order.

pub mod bounds;
pub mod contour_pocket;
pub mod error;
pub mod lathe;
mod offset;
pub mod recorder;
pub mod shortlines;
pub mod spiral_pocket;

pub use bounds::{Bbox, BoundsTracker};
pub use contour_pocket::{ContourPocketGenerator, ContourPocketParameters};
pub use error::{ParameterError, ParameterResult};
pub use lathe::{
    LatheRoughingParameters, LatheRoughingPlanner, ProfilePoint, ProfileRecorder, ProfileSegment,
    RoughingPass, RoughingPlan,
};
pub use recorder::{PathRecorder, ScaledPath, ScaledPoint, DEFAULT_SCALE};
pub use shortlines::ShortlineWriter;
pub use spiral_pocket::{SpiralPocketGenerator, SpiralPocketParameters};
