//! GCode program generation for tool batches.

pub mod emitter;
pub mod profile;

pub use emitter::{emit, program, Instruction, Line};
pub use profile::MachiningProfile;
