//! Command-line front end: writes one `.nc` program per tool next to the
//! input drill file.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use drl2gcode::convert::output_path;
use drl2gcode::error::ConvertError;
use drl2gcode::excellon::parse_bytes;
use drl2gcode::gcode::emit;
use drl2gcode::gcode::profile::{
    MachiningProfile, DEFAULT_DRILL_DEPTH, DEFAULT_FEEDRATE, DEFAULT_JOG_HEIGHT,
    DEFAULT_MOVE_HEIGHT, DEFAULT_SPINDLE_SPEED,
};

/// Exit status for command-line usage errors such as a malformed flag value.
const USAGE_EXIT_CODE: u8 = 1;

#[derive(Parser, Debug)]
#[command(author, version, about = "Converts DRL file to GCode", long_about = None)]
struct Args {
    /// Input DRL file
    input: Option<PathBuf>,

    /// Be quiet
    #[arg(short, long)]
    quiet: bool,

    /// Feed rate for drilling
    #[arg(short, long, value_name = "RATE", default_value_t = DEFAULT_FEEDRATE)]
    feedrate: f64,

    /// Spindle speed
    #[arg(short, long, value_name = "SPEED", default_value_t = DEFAULT_SPINDLE_SPEED)]
    spindle: f64,

    /// Z height for initial and final jogging
    #[arg(short, long, value_name = "Z", default_value_t = DEFAULT_JOG_HEIGHT)]
    jog_z: f64,

    /// Z height for jogging between points
    #[arg(short, long, value_name = "Z", default_value_t = DEFAULT_MOVE_HEIGHT)]
    move_z: f64,

    /// Drilling depth
    #[arg(short, long, value_name = "DEPTH", default_value_t = DEFAULT_DRILL_DEPTH)]
    depth: f64,

    /// Offset added to every X coordinate
    #[arg(short = 'x', long, value_name = "X", default_value_t = 0.0, allow_negative_numbers = true)]
    offset_x: f64,

    /// Offset added to every Y coordinate
    #[arg(short = 'y', long, value_name = "Y", default_value_t = 0.0, allow_negative_numbers = true)]
    offset_y: f64,
}

impl Args {
    const fn profile(&self) -> MachiningProfile {
        MachiningProfile {
            feedrate: self.feedrate,
            spindle_speed: self.spindle,
            jog_height: self.jog_z,
            move_height: self.move_z,
            drill_depth: self.depth,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
        }
    }
}

/// Human-readable status text on stdout, silenced by `--quiet`.
struct Progress {
    quiet: bool,
}

impl Progress {
    fn say(&self, message: fmt::Arguments<'_>) {
        if self.quiet {
            return;
        }
        let mut stdout = io::stdout().lock();
        // Status text is best effort; a closed stdout must not abort the run.
        let _ = stdout.write_fmt(message);
        let _ = stdout.flush();
    }
}

fn init_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn run(args: &Args) -> Result<(), ConvertError> {
    let input = args.input.as_deref().ok_or(ConvertError::MissingInput)?;
    if !input.exists() {
        return Err(ConvertError::InputNotFound(input.to_path_buf()));
    }

    let profile = args.profile();
    profile.validate()?;

    let progress = Progress { quiet: args.quiet };

    progress.say(format_args!("Reading {}... ", input.display()));
    let data = fs::read(input).map_err(|source| ConvertError::Io {
        path: input.to_path_buf(),
        source,
    })?;

    progress.say(format_args!("Parsing... "));
    let drawing = parse_bytes(&data);
    progress.say(format_args!("done\n"));

    for warning in &drawing.warnings {
        tracing::warn!("{warning}");
    }

    for batch in &drawing.batches {
        let path = output_path(input, &batch.id);
        progress.say(format_args!(
            "Generating GCode for {} with diameter {}... ",
            batch.id, batch.diameter_text
        ));
        let gcode = emit(batch, drawing.units, &profile);

        progress.say(format_args!("Writing {}... ", path.display()));
        fs::write(&path, gcode).map_err(|source| ConvertError::Io {
            path: path.clone(),
            source,
        })?;
        progress.say(format_args!("done\n"));
    }

    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    let args = match Args::try_parse() {
        Ok(args) => args,
        // Help and version requests print to stdout and exit successfully.
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(USAGE_EXIT_CODE);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
