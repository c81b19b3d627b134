//! GCode emission for a single tool batch.
//!
//! Every program has the same frame: a provenance comment, plane/positioning
//! and units setup, feed and spindle start, a jog to the safe height, three
//! moves per hole, then withdraw, spindle stop, return to origin and end.

use std::fmt;

use crate::excellon::{ExcellonUnits, ToolBatch};

use super::profile::MachiningProfile;

/// Comment written at the top of every program.
pub const PROVENANCE: &str = concat!(
    "Generated using ",
    env!("CARGO_PKG_NAME"),
    " by ",
    env!("CARGO_PKG_AUTHORS")
);

/// Number of lines in a program that do not depend on the hole count.
pub const FIXED_LINE_COUNT: usize = 11;

/// Number of lines emitted for every hole.
pub const LINES_PER_ITEM: usize = 3;

/// Decimal places kept for XY coordinates.
const COORDINATE_SCALE: f64 = 1000.0;

/// One GCode instruction from the fixed drilling instruction set.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Comment-only line.
    Comment(String),
    /// `G17`: select the XY plane.
    SelectPlaneXy,
    /// `G90`: absolute positioning.
    AbsolutePositioning,
    /// `G21` for metric, `G20` for imperial.
    Units(ExcellonUnits),
    /// `G1 F<rate>`: set the feed rate.
    FeedRate(f64),
    /// `M03S<rpm>`: start the spindle clockwise.
    SpindleClockwise(f64),
    /// `G0Z<z>`: rapid move on Z.
    RapidZ(f64),
    /// `G0X<x>Y<y>`: rapid move in the XY plane.
    RapidXy {
        /// Target X.
        x: f64,
        /// Target Y.
        y: f64,
    },
    /// `G1Z<z>`: feed move on Z.
    LinearZ(f64),
    /// `M05`: stop the spindle.
    SpindleStop,
    /// `M02`: end of program.
    ProgramEnd,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comment(text) => write!(f, "; {text}"),
            Self::SelectPlaneXy => write!(f, "G17"),
            Self::AbsolutePositioning => write!(f, "G90"),
            Self::Units(ExcellonUnits::Imperial) => write!(f, "G20"),
            Self::Units(ExcellonUnits::Metric) => write!(f, "G21"),
            Self::FeedRate(rate) => write!(f, "G1 F{}", Number(*rate)),
            Self::SpindleClockwise(rpm) => write!(f, "M03S{}", Number(*rpm)),
            Self::RapidZ(z) => write!(f, "G0Z{}", Number(*z)),
            Self::RapidXy { x, y } => {
                write!(f, "G0X{}Y{}", Coordinate(*x), Coordinate(*y))
            }
            Self::LinearZ(z) => write!(f, "G1Z{}", Number(*z)),
            Self::SpindleStop => write!(f, "M05"),
            Self::ProgramEnd => write!(f, "M02"),
        }
    }
}

/// An instruction with an optional trailing comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// The instruction itself.
    pub instruction: Instruction,
    /// Human-readable note appended after `;`.
    pub comment: Option<String>,
}

impl Line {
    const fn bare(instruction: Instruction) -> Self {
        Self {
            instruction,
            comment: None,
        }
    }

    fn commented(instruction: Instruction, comment: impl Into<String>) -> Self {
        Self {
            instruction,
            comment: Some(comment.into()),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.comment {
            Some(comment) => {
                let code = self.instruction.to_string();
                write!(f, "{code:<7} ; {comment}")
            }
            None => write!(f, "{}", self.instruction),
        }
    }
}

/// Renders a profile value in its shortest decimal form.
struct Number(f64);

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Adding positive zero turns -0 into 0.
        write!(f, "{}", self.0 + 0.0)
    }
}

/// Renders an XY coordinate rounded half-up to three decimals.
struct Coordinate(f64);

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.mul_add(COORDINATE_SCALE, 0.5).floor() / COORDINATE_SCALE;
        write!(f, "{}", Number(rounded))
    }
}

/// Build the instruction list for one tool batch.
pub fn program(batch: &ToolBatch, units: ExcellonUnits, profile: &MachiningProfile) -> Vec<Line> {
    let mut lines = Vec::with_capacity(FIXED_LINE_COUNT + LINES_PER_ITEM * batch.items.len());

    lines.push(Line::bare(Instruction::Comment(PROVENANCE.to_string())));
    lines.push(Line::commented(Instruction::SelectPlaneXy, "choose XY plane"));
    lines.push(Line::commented(
        Instruction::AbsolutePositioning,
        "absolute positioning",
    ));
    lines.push(Line::commented(
        Instruction::Units(units),
        format!("{units} units"),
    ));
    lines.push(Line::commented(
        Instruction::FeedRate(profile.feedrate),
        "set feed rate",
    ));
    lines.push(Line::commented(
        Instruction::SpindleClockwise(profile.spindle_speed),
        format!(
            "start spindle clockwise at {} RPM",
            Number(profile.spindle_speed)
        ),
    ));
    lines.push(Line::bare(Instruction::RapidZ(profile.jog_height)));

    for item in &batch.items {
        lines.push(Line::bare(Instruction::RapidXy {
            x: item.x + profile.offset_x,
            y: item.y + profile.offset_y,
        }));
        lines.push(Line::bare(Instruction::LinearZ(-profile.drill_depth)));
        lines.push(Line::bare(Instruction::RapidZ(profile.move_height)));
    }

    lines.push(Line::commented(
        Instruction::RapidZ(profile.jog_height),
        "raise Z axis",
    ));
    lines.push(Line::commented(Instruction::SpindleStop, "stop spindle"));
    lines.push(Line::commented(
        Instruction::RapidXy { x: 0.0, y: 0.0 },
        "move to start position",
    ));
    lines.push(Line::commented(Instruction::ProgramEnd, "end program"));

    lines
}

/// Emit the GCode program for one tool batch.
///
/// Output is newline-terminated and depends only on the arguments.
pub fn emit(batch: &ToolBatch, units: ExcellonUnits, profile: &MachiningProfile) -> String {
    let lines = program(batch, units, profile);
    tracing::debug!(
        tool = %batch.id,
        holes = batch.items.len(),
        lines = lines.len(),
        "emitted program"
    );

    let mut gcode = String::new();
    for line in &lines {
        gcode.push_str(&line.to_string());
        gcode.push('\n');
    }
    gcode
}
