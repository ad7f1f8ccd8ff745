//! Line-oriented G-code interpreter with modal state tracking.
//!
//! Implements the read/execute contract consumed by the planners: `read`
//! parses one source line into a pending block (or reports end-of-program),
//! and `execute` fires the dispatcher callbacks for that block. Modal groups
//! follow RS274: motion (G0-G3), plane selection (G17-G19) and distance mode
//! (G90/G91) persist until changed.

use crate::dispatcher::{Dispatcher, MotionConsumer};
use crate::error::{GeometryError, ReadError};
use crate::motion::{Plane, Position};
use regex::Regex;

/// Outcome of reading one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    /// The line parsed into a block; call `execute` to act on it.
    Parsed,
    /// End-of-program sentinel (M2, M30 or `%`). Not an error.
    ProgramEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MotionMode {
    Rapid,
    Linear,
    ArcCw,
    ArcCcw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DistanceMode {
    Absolute,
    Incremental,
}

/// Words extracted from a single block.
#[derive(Debug, Default, Clone)]
struct Block {
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    i: Option<f64>,
    j: Option<f64>,
    k: Option<f64>,
    p: Option<f64>,
    g: Vec<f64>,
    m: Vec<i32>,
}

impl Block {
    fn has_axis_word(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some()
    }

    fn has_center_word(&self) -> bool {
        self.i.is_some() || self.j.is_some() || self.k.is_some()
    }
}

/// Modal G-code interpreter feeding a [`Dispatcher`].
pub struct Interpreter {
    word_re: Regex,
    motion: MotionMode,
    plane: Plane,
    distance: DistanceMode,
    position: Position,
    pending: Option<Block>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            word_re: Regex::new(r"(?i)([a-z])\s*([+-]?(?:\d+\.?\d*|\.\d+))").expect("static regex"),
            motion: MotionMode::Rapid,
            plane: Plane::default(),
            distance: DistanceMode::Absolute,
            position: Position::default(),
            pending: None,
        }
    }

    /// Read one source line into the pending block.
    ///
    /// Comments (`(...)` and `;` to end of line) are stripped first. A lone
    /// `%` or an M2/M30 word ends the program.
    pub fn read(&mut self, line: &str) -> Result<ReadState, ReadError> {
        let cleaned = strip_comments(line);
        if cleaned.trim() == "%" {
            self.pending = None;
            return Ok(ReadState::ProgramEnd);
        }

        let mut block = Block::default();
        for cap in self.word_re.captures_iter(&cleaned) {
            let letter = cap[1].chars().next().expect("captured letter").to_ascii_uppercase();
            let value: f64 = cap[2].parse().map_err(|_| ReadError::MalformedWord {
                word: cap[0].to_string(),
                line: line.to_string(),
            })?;
            match letter {
                'X' => block.x = Some(value),
                'Y' => block.y = Some(value),
                'Z' => block.z = Some(value),
                'I' => block.i = Some(value),
                'J' => block.j = Some(value),
                'K' => block.k = Some(value),
                'P' => block.p = Some(value),
                'G' => block.g.push(value),
                'M' => block.m.push(value as i32),
                // Feed is not modeled; accept and drop the word.
                'F' => {}
                other => {
                    tracing::debug!(word = %other, value, "ignoring unsupported word");
                }
            }
        }

        // Anything the word scanner did not consume is a malformed word.
        let leftover: String = {
            let mut rest = cleaned.clone();
            for cap in self.word_re.captures_iter(&cleaned) {
                rest = rest.replacen(&cap[0], "", 1);
            }
            rest.split_whitespace().collect::<Vec<_>>().join(" ")
        };
        if !leftover.is_empty() {
            return Err(ReadError::MalformedWord {
                word: leftover,
                line: line.to_string(),
            });
        }

        if block.m.iter().any(|&m| m == 2 || m == 30) {
            self.pending = None;
            return Ok(ReadState::ProgramEnd);
        }

        self.pending = Some(block);
        Ok(ReadState::Parsed)
    }

    /// Execute the last read block, firing dispatcher callbacks.
    ///
    /// Calling this with no pending block is a no-op.
    pub fn execute<C: MotionConsumer>(
        &mut self,
        dispatcher: &mut Dispatcher<C>,
    ) -> Result<(), GeometryError> {
        let Some(block) = self.pending.take() else {
            return Ok(());
        };

        for &g in &block.g {
            match g as i32 {
                0 if g == 0.0 => self.motion = MotionMode::Rapid,
                1 if g == 1.0 => self.motion = MotionMode::Linear,
                2 if g == 2.0 => self.motion = MotionMode::ArcCw,
                3 if g == 3.0 => self.motion = MotionMode::ArcCcw,
                17 => {
                    self.plane = Plane::Xy;
                    dispatcher.plane(Plane::Xy);
                }
                18 => {
                    self.plane = Plane::Xz;
                    dispatcher.plane(Plane::Xz);
                }
                19 => {
                    self.plane = Plane::Yz;
                    dispatcher.plane(Plane::Yz);
                }
                90 => self.distance = DistanceMode::Absolute,
                91 => self.distance = DistanceMode::Incremental,
                _ => {
                    tracing::debug!(code = g, "ignoring unsupported G code");
                }
            }
        }

        let is_arc = matches!(self.motion, MotionMode::ArcCw | MotionMode::ArcCcw);
        if !block.has_axis_word() && !(is_arc && block.has_center_word()) {
            return Ok(());
        }

        let target = self.target(&block);
        match self.motion {
            MotionMode::Rapid => dispatcher.rapid(target)?,
            MotionMode::Linear => dispatcher.linear(target)?,
            MotionMode::ArcCw | MotionMode::ArcCcw => {
                // I/J/K are offsets from the current position.
                let center = Position::new(
                    self.position.x + block.i.unwrap_or(0.0),
                    self.position.y + block.j.unwrap_or(0.0),
                    self.position.z + block.k.unwrap_or(0.0),
                );
                let turns = block.p.map_or(1, |p| (p.max(1.0)) as i32);
                let rotation = if self.motion == MotionMode::ArcCw {
                    -turns
                } else {
                    turns
                };
                dispatcher.arc(target, center, rotation)?;
            }
        }
        self.position = target;
        Ok(())
    }

    /// Resolve the absolute target of a block, filling omitted axes from the
    /// current position.
    fn target(&self, block: &Block) -> Position {
        match self.distance {
            DistanceMode::Absolute => Position::new(
                block.x.unwrap_or(self.position.x),
                block.y.unwrap_or(self.position.y),
                block.z.unwrap_or(self.position.z),
            ),
            DistanceMode::Incremental => Position::new(
                self.position.x + block.x.unwrap_or(0.0),
                self.position.y + block.y.unwrap_or(0.0),
                self.position.z + block.z.unwrap_or(0.0),
            ),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip `(...)` comments and everything after `;`.
fn strip_comments(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_comment = false;
    for c in line.chars() {
        match c {
            '(' => in_comment = true,
            ')' if in_comment => in_comment = false,
            ';' if !in_comment => break,
            _ if !in_comment => out.push(c),
            _ => {}
        }
    }
    out
}
