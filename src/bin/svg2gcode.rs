use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use svg_poly::cli::{Verbosity, init_logging, read_input, write_output};
use svg_poly::gcode::{DEFAULT_Z_SAFETY, GcodeOptions, write_gcode};
use svg_poly::svg_to_model;
use tracing::info;

/// Convert paths in an SVG file to G-code format for plotting.
///
/// SVG coordinates are used as millimeters.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    verbosity: Verbosity,

    /// X offset
    #[arg(short = 'x', long, default_value_t = 0.0, allow_negative_numbers = true)]
    x_offset: f64,

    /// Y offset
    #[arg(short = 'y', long, default_value_t = 0.0, allow_negative_numbers = true)]
    y_offset: f64,

    /// Z height of the pen while drawing
    #[arg(short = 'z', long, default_value_t = 0.0, allow_negative_numbers = true)]
    z_offset: f64,

    /// Extra Z height for pen-up moves
    #[arg(short = 'Z', long, default_value_t = DEFAULT_Z_SAFETY)]
    z_safety: f64,

    /// Feed rate in mm/min
    #[arg(short = 'f', long, default_value_t = 4000.0)]
    feed_rate: f64,

    /// Skip the G28 homing move at the start
    #[arg(long)]
    no_home: bool,

    /// Path to SVG file
    #[arg(value_name = "SVG")]
    svg: PathBuf,

    /// Path to G-code file, stdout when omitted
    #[arg(value_name = "GCODE")]
    gcode: Option<PathBuf>,
}

impl Cli {
    fn options(&self) -> GcodeOptions {
        GcodeOptions {
            x_offset: self.x_offset,
            y_offset: self.y_offset,
            z_offset: self.z_offset,
            z_safety: self.z_safety,
            feed_rate: self.feed_rate,
            home: !self.no_home,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.verbosity)?;

    info!("Converting {}", cli.svg.display());
    let svg = read_input(&cli.svg)?;
    let model = svg_to_model(&svg)
        .with_context(|| format!("Error converting '{}'", cli.svg.display()))?;

    let options = cli.options();
    write_output(&cli.svg, cli.gcode.as_deref(), |out| {
        write_gcode(out, &model, &options)
    })
}
