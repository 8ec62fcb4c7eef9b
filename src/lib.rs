//! # svg-poly
//!
//! A Rust library for turning SVG path drawings into polygons for meshes
//! and pen plotters.
//!
//! ## Features
//!
//! - **SVG to OBJ**: Flatten `path` elements (lines and cubic Béziers, with
//!   `matrix`/`translate` transforms) into an indexed vertex/face mesh
//! - **SVG to G-code**: Plot every polygon as one continuous pen stroke
//! - **OBJ to SVG**: Write mesh faces back out as closed SVG paths
//!
//! ## Example - SVG to OBJ
//!
//! ```rust,ignore
//! use svg_poly::{model_to_obj, svg_to_model};
//!
//! let svg = std::fs::read_to_string("drawing.svg").unwrap();
//! let model = svg_to_model(&svg).unwrap();
//! std::fs::write("drawing.obj", model_to_obj(&model)).unwrap();
//! ```
//!
//! ## Example - SVG to G-code
//!
//! ```rust,ignore
//! use svg_poly::gcode::{GcodeOptions, model_to_gcode};
//!
//! let model = svg_poly::svg_to_model(&svg).unwrap();
//! let gcode = model_to_gcode(&model, &GcodeOptions::default());
//! ```

pub mod bounds;
pub mod cli;
pub mod error;
mod format;
pub mod gcode;
pub mod mesh;
pub mod svg;
pub mod types;

// Re-export commonly used items
pub use error::{ConvertError, PathError, Result};
pub use mesh::{PolygonModel, model_to_obj, parse_obj};
pub use svg::{model_to_svg, svg_to_loops, svg_to_model};
pub use types::{Loop, Point, XForm};
