//! Whole-file conversion: one GCode program per tool batch.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::excellon::{Drawing, ExcellonUnits};
use crate::gcode::{emit, MachiningProfile};

/// Extension of generated program files.
pub const OUTPUT_EXTENSION: &str = "nc";

/// The generated program for one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolProgram {
    /// Tool identifier (`T01`).
    pub tool: String,
    /// Drill diameter of the tool.
    pub diameter: f64,
    /// Number of holes drilled by the program.
    pub hole_count: usize,
    /// GCode text.
    pub gcode: String,
}

/// Per-tool summary returned to JavaScript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSummary {
    /// Tool identifier.
    pub tool: String,
    /// Drill diameter of the tool.
    pub diameter: f64,
    /// Number of holes drilled with the tool.
    pub hole_count: u32,
}

impl From<&ToolProgram> for ToolSummary {
    fn from(program: &ToolProgram) -> Self {
        Self {
            tool: program.tool.clone(),
            diameter: program.diameter,
            hole_count: u32::try_from(program.hole_count).unwrap_or(u32::MAX),
        }
    }
}

/// Metadata for a converted drill file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionMeta {
    /// Unit system of the drawing.
    pub units: ExcellonUnits,
    /// One entry per generated program, in batch order.
    pub tools: Vec<ToolSummary>,
    /// Number of parser warnings.
    pub warning_count: u32,
    /// Parser warnings.
    pub warnings: Vec<String>,
}

impl ConversionMeta {
    /// Summarizes a drawing and the programs generated from it.
    pub fn new(drawing: &Drawing, programs: &[ToolProgram]) -> Self {
        Self {
            units: drawing.units,
            tools: programs.iter().map(ToolSummary::from).collect(),
            warning_count: u32::try_from(drawing.warnings.len()).unwrap_or(u32::MAX),
            warnings: drawing.warnings.clone(),
        }
    }
}

/// Emit one program per batch, keeping batch order.
pub fn convert(drawing: &Drawing, profile: &MachiningProfile) -> Vec<ToolProgram> {
    drawing
        .batches
        .iter()
        .map(|batch| ToolProgram {
            tool: batch.id.clone(),
            diameter: batch.diameter,
            hole_count: batch.items.len(),
            gcode: emit(batch, drawing.units, profile),
        })
        .collect()
}

/// Path of the program for `tool_id`, next to the input file.
///
/// `boards/main.drl` and `T01` give `boards/main-T01.nc`.
pub fn output_path(input: &Path, tool_id: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{stem}-{tool_id}.{OUTPUT_EXTENSION}"))
}
