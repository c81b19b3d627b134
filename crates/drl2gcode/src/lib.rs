#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::indexing_slicing)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `drl2gcode` — converts Excellon drill files into one GCode program per tool.

pub mod convert;
pub mod error;
pub mod excellon;
pub mod gcode;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::convert::{ConversionMeta, ToolProgram};
use crate::gcode::MachiningProfile;

thread_local! {
    static LAST_PROGRAMS: RefCell<Vec<ToolProgram>> = const { RefCell::new(Vec::new()) };
}

fn store_programs(programs: Vec<ToolProgram>) {
    LAST_PROGRAMS.with(|p| {
        *p.borrow_mut() = programs;
    });
}

/// Initialize the WASM module. Sets up the panic hook for debugging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Convert an Excellon drill file from raw bytes into GCode programs.
///
/// `profile` is a partial `MachiningProfile` object (`feedrate`,
/// `spindleSpeed`, `jogHeight`, `moveHeight`, `drillDepth`, `offsetX`,
/// `offsetY`); `undefined` or `null` selects the defaults.
///
/// Returns `ConversionMeta` as a `JsValue` via `serde-wasm-bindgen`.
/// Programs are stored internally; retrieve them with [`get_program`].
///
/// # Errors
///
/// Returns a descriptive error string if the profile is invalid.
#[wasm_bindgen]
pub fn convert_drl(data: &[u8], profile: JsValue) -> Result<JsValue, JsValue> {
    let profile: MachiningProfile = if profile.is_undefined() || profile.is_null() {
        MachiningProfile::default()
    } else {
        serde_wasm_bindgen::from_value(profile).map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    let meta = convert_drl_internal(data, &profile).map_err(|e| JsValue::from_str(&e))?;
    serde_wasm_bindgen::to_value(&meta).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Internal conversion logic shared between the wasm export and native tests.
#[doc(hidden)]
pub fn convert_drl_internal(
    data: &[u8],
    profile: &MachiningProfile,
) -> Result<ConversionMeta, String> {
    profile.validate().map_err(|e| e.to_string())?;
    let drawing = excellon::parse_bytes(data);

    let programs = convert::convert(&drawing, profile);
    let meta = ConversionMeta::new(&drawing, &programs);

    store_programs(programs);

    Ok(meta)
}

/// Retrieve the GCode of the `index`-th tool from the last conversion.
///
/// Returns `undefined` if the index is out of range or nothing has been
/// converted yet.
#[wasm_bindgen]
pub fn get_program(index: u32) -> Option<String> {
    let index = usize::try_from(index).ok()?;
    LAST_PROGRAMS.with(|p| p.borrow().get(index).map(|program| program.gcode.clone()))
}
