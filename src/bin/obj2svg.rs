use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use svg_poly::cli::{Verbosity, init_logging, read_input, write_output};
use svg_poly::svg::{SvgOptions, model_to_svg};
use svg_poly::parse_obj;
use tracing::info;

/// Convert polygons in an OBJ file to paths in SVG format.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    verbosity: Verbosity,

    /// Units, eg. "mm", "px"
    #[arg(short, long, default_value = "")]
    unit: String,

    /// Path to OBJ file
    #[arg(value_name = "OBJ")]
    obj: PathBuf,

    /// Path to SVG file, stdout when omitted
    #[arg(value_name = "SVG")]
    svg: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.verbosity)?;

    info!("{}", cli.obj.display());
    let obj = read_input(&cli.obj)?;
    let model =
        parse_obj(&obj).with_context(|| format!("Error parsing '{}'", cli.obj.display()))?;

    let options = SvgOptions { unit: cli.unit };
    let svg = model_to_svg(&model, &options);

    write_output(&cli.obj, cli.svg.as_deref(), |out| out.write_all(svg.as_bytes()))
}
