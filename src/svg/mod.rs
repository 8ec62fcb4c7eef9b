//! SVG path conversion module
//!
//! Parses the path elements of an SVG document into polygonal loops, and
//! writes polygon models back out as SVG paths.

pub mod curve;
pub mod document;
pub mod interpreter;
pub mod tokenizer;
pub mod transform;
pub mod writer;

pub use curve::CurveSampler;
pub use document::{PathElement, extract_paths};
pub use interpreter::{PathInterpreter, path_to_loops};
pub use tokenizer::{Instruction, Segment, Tokenizer, tokenize};
pub use transform::{ParsedTransform, parse_transform};
pub use writer::{SvgOptions, model_to_svg};

use crate::error::{ConvertError, Result};
use crate::mesh::PolygonModel;
use crate::types::Loop;
use tracing::{debug, info};

/// Convert every visible path of an SVG document into loops, in document
/// order. The first bad path aborts the whole conversion.
pub fn svg_to_loops(svg: &str) -> Result<Vec<Loop>> {
    let paths = extract_paths(svg)?;
    let mut loops = Vec::new();

    for path in &paths {
        let path_loops =
            path_to_loops(&path.data, &path.xform).map_err(|source| ConvertError::Path {
                path: path.label(),
                source,
            })?;
        debug!("Path {}: {} loops", path.label(), path_loops.len());
        loops.extend(path_loops);
    }

    info!("Converted {} paths into {} loops", paths.len(), loops.len());
    Ok(loops)
}

/// Convert an SVG document into a polygon model
pub fn svg_to_model(svg: &str) -> Result<PolygonModel> {
    let loops = svg_to_loops(svg)?;
    Ok(PolygonModel::from_loops(&loops))
}
