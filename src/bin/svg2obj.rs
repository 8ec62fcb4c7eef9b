use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use svg_poly::cli::{Verbosity, init_logging, read_input, write_output};
use svg_poly::{mesh::write_obj, svg_to_model};
use tracing::info;

/// Convert paths in an SVG file to polygons in OBJ format.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    verbosity: Verbosity,

    /// Path to SVG file
    #[arg(value_name = "SVG")]
    svg: PathBuf,

    /// Path to OBJ file, stdout when omitted
    #[arg(value_name = "OBJ")]
    obj: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.verbosity)?;

    info!("Converting {}", cli.svg.display());
    let svg = read_input(&cli.svg)?;
    let model = svg_to_model(&svg)
        .with_context(|| format!("Error converting '{}'", cli.svg.display()))?;

    write_output(&cli.svg, cli.obj.as_deref(), |out| write_obj(out, &model))
}
