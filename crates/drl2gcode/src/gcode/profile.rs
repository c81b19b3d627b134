//! Machining parameters applied to every emitted program.

use serde::Deserialize;

use crate::error::ConvertError;

/// Default drilling feed rate.
pub const DEFAULT_FEEDRATE: f64 = 50.0;
/// Default spindle speed in RPM.
pub const DEFAULT_SPINDLE_SPEED: f64 = 400.0;
/// Default Z height for the initial and final jog.
pub const DEFAULT_JOG_HEIGHT: f64 = 15.0;
/// Default Z height between holes.
pub const DEFAULT_MOVE_HEIGHT: f64 = 1.0;
/// Default drilling depth below Z zero.
pub const DEFAULT_DRILL_DEPTH: f64 = 2.5;

/// Feed, speed, heights and offsets for one conversion run.
///
/// Values are in the drawing's unit system; nothing is converted.
/// Deserializes from a partial camelCase object, missing fields keep
/// their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MachiningProfile {
    /// Feed rate for the drilling plunge.
    pub feedrate: f64,
    /// Spindle speed, spinning clockwise.
    pub spindle_speed: f64,
    /// Safe Z clearance before and after a run.
    pub jog_height: f64,
    /// Z clearance between consecutive holes.
    pub move_height: f64,
    /// Depth of each hole below Z zero.
    pub drill_depth: f64,
    /// Added to every X coordinate.
    pub offset_x: f64,
    /// Added to every Y coordinate.
    pub offset_y: f64,
}

impl Default for MachiningProfile {
    fn default() -> Self {
        Self {
            feedrate: DEFAULT_FEEDRATE,
            spindle_speed: DEFAULT_SPINDLE_SPEED,
            jog_height: DEFAULT_JOG_HEIGHT,
            move_height: DEFAULT_MOVE_HEIGHT,
            drill_depth: DEFAULT_DRILL_DEPTH,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl MachiningProfile {
    /// Checks that every field is finite and every magnitude positive.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidProfile`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConvertError> {
        let magnitudes = [
            ("feedrate", self.feedrate),
            ("spindle speed", self.spindle_speed),
            ("jog height", self.jog_height),
            ("move height", self.move_height),
            ("drill depth", self.drill_depth),
        ];
        for (name, value) in magnitudes {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConvertError::InvalidProfile(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        for (name, value) in [("offset x", self.offset_x), ("offset y", self.offset_y)] {
            if !value.is_finite() {
                return Err(ConvertError::InvalidProfile(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_valid() {
        let profile = MachiningProfile::default();
        assert!(profile.validate().is_ok());
        assert!((profile.drill_depth - 2.5).abs() < f64::EPSILON);
        assert!(profile.offset_x.abs() < f64::EPSILON);
    }

    #[test]
    fn negative_offsets_are_valid() {
        let profile = MachiningProfile {
            offset_x: -12.5,
            offset_y: -0.1,
            ..MachiningProfile::default()
        };
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn zero_depth_is_rejected() {
        let profile = MachiningProfile {
            drill_depth: 0.0,
            ..MachiningProfile::default()
        };
        let result = profile.validate();
        assert!(
            matches!(&result, Err(ConvertError::InvalidProfile(msg)) if msg.contains("drill depth")),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn non_finite_offset_is_rejected() {
        let profile = MachiningProfile {
            offset_y: f64::NAN,
            ..MachiningProfile::default()
        };
        assert!(profile.validate().is_err());
    }
}
