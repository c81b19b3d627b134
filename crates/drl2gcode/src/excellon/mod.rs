//! Excellon (DRL) drill file parsing.

pub mod parser;
pub mod types;

pub use parser::{parse, parse_bytes};
pub use types::*;
