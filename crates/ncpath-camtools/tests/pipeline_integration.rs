//! Integration tests driving full G-code programs through the interpreter,
//! dispatcher and planners.

use ncpath_camtools::{
    BoundsTracker, ContourPocketGenerator, ContourPocketParameters, LatheRoughingParameters,
    LatheRoughingPlanner, PathRecorder, ProfilePoint, ProfileRecorder, ShortlineWriter,
    SpiralPocketGenerator, SpiralPocketParameters,
};
use ncpath_core::{Dispatcher, Interpreter, MotionConsumer, ReadState};

/// Run a program through the interpreter into a consumer.
fn run_program<C: MotionConsumer>(program: &str, consumer: C) -> C {
    let mut interp = Interpreter::new();
    let mut dispatcher = Dispatcher::new(consumer);
    for line in program.lines() {
        match interp.read(line).expect("readable line") {
            ReadState::Parsed => interp.execute(&mut dispatcher).expect("executable line"),
            ReadState::ProgramEnd => break,
        }
    }
    dispatcher.into_consumer()
}

fn pocket_params() -> ContourPocketParameters {
    ContourPocketParameters {
        tool_radius: 5.0,
        stepover: 0.9,
        cut_z: -10.0,
        feed_rate: 100.0,
        stepdown: 5.0,
        retract_z: 1.0,
    }
}

#[test]
fn test_cut_bounds_exclude_rapids() {
    // Rapids roam a larger rectangle; only two cut segments contribute.
    let program = "\
G0 X-20 Y-20
G0 X30 Y30
G0 X0 Y0
G1 X10 Y0 F100
G1 X10 Y10
M2
";
    let tracker = run_program(program, BoundsTracker::new(true, false));
    let bbox = tracker.bounding_box().expect("cut moves present");
    assert_eq!((bbox.min.x, bbox.min.y, bbox.min.z), (0.0, 0.0, 0.0));
    assert_eq!((bbox.max.x, bbox.max.y, bbox.max.z), (10.0, 10.0, 0.0));
}

#[test]
fn test_combined_bounds_include_rapids() {
    let program = "\
G0 X-20 Y-20
G1 X10 Y10 F100
M2
";
    let tracker = run_program(program, BoundsTracker::new(true, true));
    let bbox = tracker.bounding_box().expect("moves present");
    assert_eq!((bbox.min.x, bbox.min.y), (-20.0, -20.0));
    assert_eq!((bbox.max.x, bbox.max.y), (10.0, 10.0));
}

#[test]
fn test_arc_bulge_extends_bounds_past_endpoints() {
    // CW half circle from (0,0) to (10,0) about (5,0) bulges to y = 5.
    let program = "\
G1 X0 Y0 F100
G2 X10 Y0 I5 J0
M2
";
    let tracker = run_program(program, BoundsTracker::new(true, false));
    let bbox = tracker.bounding_box().expect("cut moves present");
    assert!((bbox.max.y - 5.0).abs() < 1e-3, "max.y = {}", bbox.max.y);
}

#[test]
fn test_recorder_splits_paths_on_rapids() {
    let program = "\
G0 X0 Y0
G1 X10 Y0 F100
G1 X10 Y10
G1 X0 Y10
G1 X0 Y0
G0 X50 Y50
G1 X60 Y50
G1 X60 Y60
M2
";
    let recorder = run_program(program, PathRecorder::new());
    let paths = recorder.into_paths();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].len(), 5);
    assert_eq!(paths[1].len(), 3);
}

#[test]
fn test_contour_pocket_emits_one_plunge_per_depth_step() {
    // 40mm square, 10mm deep in 5mm steps: two depth steps, each opened by
    // one rapid/plunge pair at half feed.
    let program = "\
G0 X0 Y0
G1 X40 Y0 F100
G1 X40 Y40
G1 X0 Y40
G1 X0 Y0
M2
";
    let recorder = run_program(program, PathRecorder::new());
    let scale = recorder.scale();
    let paths = recorder.into_paths();

    let gcode = ContourPocketGenerator::new(pocket_params())
        .unwrap()
        .generate(&paths, scale)
        .unwrap();

    assert!(gcode.starts_with("G0 Z1\n"));
    assert_eq!(gcode.matches("G1 Z-5 F50").count(), 1);
    assert_eq!(gcode.matches("G1 Z-10 F50").count(), 1);
    // Each depth step ends with a retract; plus the leading one.
    assert_eq!(gcode.matches("G0 Z1\n").count(), 3);
}

#[test]
fn test_contour_pocket_offsets_terminate() {
    // A pocket narrower than one ring spacing still clears: boundary ring
    // only, then the offset collapses.
    let program = "\
G0 X0 Y0
G1 X4 Y0 F100
G1 X4 Y4
G1 X0 Y4
G1 X0 Y0
M2
";
    let recorder = run_program(program, PathRecorder::new());
    let scale = recorder.scale();
    let paths = recorder.into_paths();

    let gcode = ContourPocketGenerator::new(pocket_params())
        .unwrap()
        .generate(&paths, scale)
        .unwrap();
    // Boundary ring present at both depths, no infinite loop.
    assert!(gcode.contains("   X4 Y4"));
}

#[test]
fn test_spiral_pocket_pecks_then_follows_boundary() {
    let program = "\
G0 X0 Y0
G1 X40 Y0 F100
G1 X40 Y40
G1 X0 Y40
G1 X0 Y0
M2
";
    let recorder = run_program(program, PathRecorder::new());
    let scale = recorder.scale();
    let paths = recorder.into_paths();

    let gcode = SpiralPocketGenerator::new(SpiralPocketParameters {
        pocket: pocket_params(),
        climb: false,
    })
    .unwrap()
    .generate(&paths, scale)
    .unwrap();

    assert_eq!(gcode.matches("G83 X20 Y20 Z-1 R1 Q0.5 F50").count(), 2);
    assert_eq!(gcode.matches("G1 Z-5 F50").count(), 1);
    assert_eq!(gcode.matches("G1 Z-10 F50").count(), 1);
}

#[test]
fn test_lathe_plan_from_xz_program() {
    // Stepped shaft profile in the XZ plane, 10mm across in X.
    let program = "\
G18
G0 X0 Z0
G1 X10 Z0 F100
G1 X10 Z20
G1 X0 Z20
M2
";
    let recorder = run_program(program, ProfileRecorder::new());
    let profile = recorder.into_profile();
    assert_eq!(profile.len(), 3);

    let planner = LatheRoughingPlanner::new(LatheRoughingParameters {
        stepdown: 3.0,
        retract: 0.5,
        tool_start: ProfilePoint::new(0.0, 0.0),
    })
    .unwrap();
    let plan = planner.plan(&profile).unwrap();

    assert_eq!(plan.passes, 3);
    assert!((plan.step_x - 10.0 / 3.0).abs() < 1e-12);
    assert!(plan.monotonic_z);
    // Every pass ray crosses the two horizontal faces of the profile.
    for pass in &plan.cuts {
        assert_eq!(pass.intersections.len(), 2, "pass at X{}", pass.x);
    }
}

#[test]
fn test_shortlines_flatten_arcs() {
    // Quarter circle from (10,0) to (0,10) about the origin.
    let program = "\
G0 X10 Y0
G3 X0 Y10 I-10 J0
G1 X0 Y0 F100
M2
";
    let writer = run_program(program, ShortlineWriter::new());
    let gcode = writer.into_gcode();
    let lines: Vec<&str> = gcode.lines().collect();

    assert_eq!(lines[0], "G0 X10 Y0 Z0");
    assert_eq!(*lines.last().unwrap(), "G1 X0 Y0 Z0");
    // The arc contributes one short line per sample step and no G2/G3.
    assert!(lines.len() > 10);
    assert!(lines[1..].iter().all(|l| l.starts_with("G1 ")));
    assert!(gcode.contains("G1 X0 Y10 Z0\n"));
}

#[test]
fn test_program_end_stops_execution() {
    let program = "\
G1 X10 Y0 F100
M30
G1 X100 Y100
";
    let tracker = run_program(program, BoundsTracker::new(true, true));
    let bbox = tracker.bounding_box().expect("moves present");
    assert_eq!(bbox.max.x, 10.0);
}

#[test]
fn test_incremental_distance_mode_accumulates() {
    let program = "\
G91
G1 X5 F100
G1 X5
G1 Y5
M2
";
    let tracker = run_program(program, BoundsTracker::new(true, false));
    let bbox = tracker.bounding_box().expect("moves present");
    assert_eq!((bbox.max.x, bbox.max.y), (10.0, 5.0));
}
