use crate::bounds::Bounds;
use crate::format::fixed;
use crate::mesh::PolygonModel;
use quick_xml::escape::escape;
use tracing::info;

/// Format a number with 6 decimal places
fn f(n: f64) -> String {
    fixed(n, 6)
}

/// Options for OBJ to SVG output
#[derive(Debug, Clone, Default)]
pub struct SvgOptions {
    /// Unit suffix for the root width and height, e.g. "mm" or "px"
    pub unit: String,
}

/// Generate path data for one face: a moveto, linetos, then closepath.
///
/// A trailing vertex equal to the first is folded into the closepath.
pub fn face_path_data(model: &PolygonModel, face: usize) -> String {
    let indices = &model.faces()[face];
    let verts = model.vertices();

    let mut end = indices.len();
    if end > 2 && indices[end - 1] == indices[0] {
        end -= 1;
    }

    let first = &verts[indices[0]];
    let mut d = format!("M{},{}", f(first.x), f(first.y));
    for &i in &indices[1..end] {
        let v = &verts[i];
        d.push_str(&format!(" L{},{}", f(v.x), f(v.y)));
    }
    d.push_str(" Z");
    d
}

/// Convert a polygon model to an SVG document with one path per face
pub fn model_to_svg(model: &PolygonModel, options: &SvgOptions) -> String {
    let bounds =
        Bounds::of_points(model.vertices()).unwrap_or_else(|| Bounds::new(0.0, 0.0, 0.0, 0.0));

    let paths: Vec<String> = (0..model.faces().len())
        .map(|i| format!("<path d=\"{}\"/>", face_path_data(model, i)))
        .collect();

    info!("{} faces.", paths.len());

    let unit = escape(options.unit.as_str());
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}{unit}" height="{}{unit}" viewBox="{} {} {} {}">
  {}
</svg>
"#,
        f(bounds.width()),
        f(bounds.height()),
        f(bounds.min_x),
        f(bounds.min_y),
        f(bounds.width()),
        f(bounds.height()),
        paths.join("\n  ")
    )
}
