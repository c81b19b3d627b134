//! Excellon drill file types.

use std::fmt;

use serde::Serialize;

/// Unit system for Excellon files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcellonUnits {
    /// Metric (millimeters).
    #[default]
    Metric,
    /// Imperial (inches).
    Imperial,
}

impl fmt::Display for ExcellonUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "metric"),
            Self::Imperial => write!(f, "imperial"),
        }
    }
}

/// A single drill hit in drawing coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate of the hole center.
    pub x: f64,
    /// Y coordinate of the hole center.
    pub y: f64,
}

/// All drill hits made with one tool, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolBatch {
    /// Tool identifier exactly as written in the file (`T01`, `T2`, ...).
    pub id: String,
    /// Drill diameter from the tool definition.
    pub diameter: f64,
    /// Diameter exactly as written in the file (`0.80`), for reporting.
    pub diameter_text: String,
    /// Drill hits attributed to this tool.
    pub items: Vec<Point>,
}

impl ToolBatch {
    /// Creates a batch with no drill hits yet.
    pub fn new(id: impl Into<String>, diameter: f64) -> Self {
        Self {
            id: id.into(),
            diameter,
            diameter_text: diameter.to_string(),
            items: Vec::new(),
        }
    }

    /// Creates an empty batch from the diameter text of a tool definition.
    pub fn with_diameter_text(id: impl Into<String>, diameter_text: &str) -> Self {
        Self {
            id: id.into(),
            diameter: super::parser::parse_number(diameter_text),
            diameter_text: diameter_text.to_string(),
            items: Vec::new(),
        }
    }
}

/// Result of parsing one drill file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    /// Unit system declared in the file.
    pub units: ExcellonUnits,
    /// Tool batches in order of first definition.
    pub batches: Vec<ToolBatch>,
    /// Notes about input lines that were dropped or ignored.
    pub warnings: Vec<String>,
}

impl Drawing {
    /// Looks up a batch by its tool identifier.
    pub fn batch(&self, id: &str) -> Option<&ToolBatch> {
        self.batches.iter().find(|batch| batch.id == id)
    }

    /// Total number of drill hits across all batches.
    pub fn hole_count(&self) -> usize {
        self.batches.iter().map(|batch| batch.items.len()).sum()
    }
}
