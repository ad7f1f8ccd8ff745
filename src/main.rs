//! ncpath command-line interface.
//!
//! Reads a G-code motion stream from stdin, feeds it through the
//! interpreter/dispatcher pipeline into one consumer, then runs the selected
//! planner and writes its output to stdout. Malformed input, unsupported
//! geometry and invalid configuration each abort the run with their own exit
//! code.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ncpath_camtools::{
    BoundsTracker, ContourPocketGenerator, ContourPocketParameters, LatheRoughingParameters,
    LatheRoughingPlanner, ParameterError, PathRecorder, ProfilePoint, ProfileRecorder,
    ShortlineWriter, SpiralPocketGenerator, SpiralPocketParameters,
};
use ncpath_core::error::{GeometryError, ReadError};
use ncpath_core::{r6, Dispatcher, Interpreter, MotionConsumer, MotionEvent, ReadState};
use std::io::{self, BufRead};
use std::process::ExitCode;

const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_READ_ERROR: u8 = 3;
const EXIT_GEOMETRY_ERROR: u8 = 4;

#[derive(Parser)]
#[command(
    name = "ncpath",
    about = "Derive bounding volumes, pocketing and lathe roughing from G-code motion streams",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the bounding box of the motion stream
    Bounds {
        /// Track cutting moves (linear and arc)
        #[arg(long)]
        cut: bool,
        /// Track rapid moves
        #[arg(long)]
        rapid: bool,
    },
    /// Generate contour-parallel pocketing from closed XY paths
    ContourPocket(PocketArgs),
    /// Generate spiral pocketing with a centroid peck entry
    SpiralPocket {
        #[command(flatten)]
        pocket: PocketArgs,
        /// Climb mill, relative to clockwise cutter rotation
        #[arg(short, long)]
        climb: bool,
    },
    /// Lay out roughing passes over an X/Z lathe profile
    LatheRoughing {
        /// Depth of cut per pass
        #[arg(short = 'D', long)]
        stepdown: f64,
        /// Retraction between passes
        #[arg(short = 'R', long, default_value_t = 0.5)]
        retract: f64,
    },
    /// Re-emit the stream as straight G0/G1 blocks, arcs discretized
    Shortlines,
    /// Read, execute and echo the stream (validation pass-through)
    Check,
}

#[derive(Args)]
struct PocketArgs {
    /// Tool radius
    #[arg(short = 'r', long)]
    tool_r: f64,
    /// Stepover fraction of the tool diameter, in (0, 1]
    #[arg(short, long, default_value_t = 0.9)]
    stepover: f64,
    /// Final cut depth (negative, below the surface)
    #[arg(short = 'z', long)]
    cut_z: f64,
    /// Cutting feed rate
    #[arg(short, long)]
    feedrate: f64,
    /// Depth increment per pass
    #[arg(short = 'd', long)]
    stepdown: f64,
    /// Z height for rapids between cuts
    #[arg(short = 't', long, default_value_t = 1.0)]
    retract_z: f64,
}

impl PocketArgs {
    fn into_parameters(self) -> ContourPocketParameters {
        ContourPocketParameters {
            tool_radius: self.tool_r,
            stepover: self.stepover,
            cut_z: self.cut_z,
            feed_rate: self.feedrate,
            stepdown: self.stepdown,
            retract_z: self.retract_z,
        }
    }
}

/// Consumer that drops every event; used by the pass-through check.
struct Discard;

impl MotionConsumer for Discard {
    fn motion(&mut self, _event: &MotionEvent) -> Result<(), GeometryError> {
        Ok(())
    }
}

fn main() -> ExitCode {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ncpath: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

/// Map an error chain to the exit code for its kind.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if cause.downcast_ref::<ReadError>().is_some() {
            return EXIT_READ_ERROR;
        }
        if cause.downcast_ref::<GeometryError>().is_some() {
            return EXIT_GEOMETRY_ERROR;
        }
        if cause.downcast_ref::<ParameterError>().is_some() {
            return EXIT_CONFIG_ERROR;
        }
    }
    1
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Bounds { cut, rapid } => {
            // With no selection, track everything.
            let (cut, rapid) = if !cut && !rapid {
                (true, true)
            } else {
                (cut, rapid)
            };
            let tracker = consume(BoundsTracker::new(cut, rapid), None)?;
            match tracker.bounding_box() {
                Some(bbox) => {
                    println!(
                        "min: X{} Y{} Z{}",
                        r6(bbox.min.x),
                        r6(bbox.min.y),
                        r6(bbox.min.z)
                    );
                    println!(
                        "max: X{} Y{} Z{}",
                        r6(bbox.max.x),
                        r6(bbox.max.y),
                        r6(bbox.max.z)
                    );
                }
                None => println!("empty"),
            }
        }
        Commands::ContourPocket(args) => {
            let generator = ContourPocketGenerator::new(args.into_parameters())?;
            let recorder = consume(PathRecorder::new(), None)?;
            let scale = recorder.scale();
            let paths = recorder.into_paths();
            print!("{}", generator.generate(&paths, scale)?);
        }
        Commands::SpiralPocket { pocket, climb } => {
            let generator = SpiralPocketGenerator::new(SpiralPocketParameters {
                pocket: pocket.into_parameters(),
                climb,
            })?;
            let recorder = consume(PathRecorder::new(), None)?;
            let scale = recorder.scale();
            let paths = recorder.into_paths();
            print!("{}", generator.generate(&paths, scale)?);
        }
        Commands::LatheRoughing { stepdown, retract } => {
            let planner = LatheRoughingPlanner::new(LatheRoughingParameters {
                stepdown,
                retract,
                tool_start: ProfilePoint::default(),
            })?;
            // Lathe profiles live in the XZ plane.
            let recorder = consume(ProfileRecorder::new(), Some("G18"))?;
            let plan = planner.plan(&recorder.into_profile())?;
            println!("{}", r6(plan.step_x));
            for (index, pass) in plan.cuts.iter().enumerate() {
                println!(
                    "pass {}: X{} ({} intersections)",
                    index + 1,
                    r6(pass.x),
                    pass.intersections.len()
                );
            }
        }
        Commands::Shortlines => {
            let writer = consume(ShortlineWriter::new(), None)?;
            print!("{}", writer.into_gcode());
        }
        Commands::Check => {
            let mut interp = Interpreter::new();
            let mut dispatcher = Dispatcher::new(Discard);
            let stdin = io::stdin();
            for (number, line) in stdin.lock().lines().enumerate() {
                let line = line.context("reading input")?;
                let state = interp
                    .read(&line)
                    .with_context(|| format!("line {}", number + 1))?;
                if state == ReadState::Parsed {
                    interp
                        .execute(&mut dispatcher)
                        .with_context(|| format!("line {}: {}", number + 1, line))?;
                }
                println!("{line}");
                if state == ReadState::ProgramEnd {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Drive the interpreter over stdin into one consumer.
///
/// `seed` is an optional initialization line executed ahead of the stream;
/// the lathe planner seeds `G18` to select the XZ plane.
fn consume<C: MotionConsumer>(consumer: C, seed: Option<&str>) -> Result<C> {
    let mut interp = Interpreter::new();
    let mut dispatcher = Dispatcher::new(consumer);

    if let Some(line) = seed {
        if interp.read(line)? == ReadState::Parsed {
            interp.execute(&mut dispatcher)?;
        }
    }

    let stdin = io::stdin();
    for (number, line) in stdin.lock().lines().enumerate() {
        let line = line.context("reading input")?;
        match interp
            .read(&line)
            .with_context(|| format!("line {}", number + 1))?
        {
            ReadState::Parsed => interp
                .execute(&mut dispatcher)
                .with_context(|| format!("line {}: {}", number + 1, line))?,
            ReadState::ProgramEnd => {
                tracing::debug!(line = number + 1, "program end");
                break;
            }
        }
    }
    Ok(dispatcher.into_consumer())
}
