//! # ncpath core
//!
//! Motion-event abstraction layer for NC toolpath derivation:
//!
//! 1. **Motion model** — [`motion::Position`], [`motion::Plane`] and the
//!    [`motion::MotionEvent`] variants shared by every consumer.
//! 2. **Dispatcher** — [`dispatcher::Dispatcher`] turns target-only
//!    interpreter callbacks into continuous motion events.
//! 3. **Interpreter** — [`interp::Interpreter`] reads G-code lines and fires
//!    the dispatcher callbacks (read/execute contract).
//! 4. **Arc expansion** — [`arc::expand_arc`] discretizes circular moves for
//!    point-sequence consumers.
//! 5. **Formatting** — [`units::r6`] fixed-notation numeric output.

pub mod arc;
pub mod dispatcher;
pub mod error;
pub mod interp;
pub mod motion;
pub mod units;

pub use dispatcher::{Dispatcher, MotionConsumer};
pub use error::{GeometryError, ReadError};
pub use interp::{Interpreter, ReadState};
pub use motion::{MotionEvent, Plane, Position};
pub use units::r6;
