//! Polygon model and OBJ mesh format

pub mod model;
pub mod obj;

pub use model::PolygonModel;
pub use obj::{model_to_obj, parse_obj, write_obj};
