use super::transform::parse_transform;
use crate::error::Result;
use crate::types::XForm;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, info, warn};

/// A `path` element together with the transform that applies to it
#[derive(Debug, Clone, PartialEq)]
pub struct PathElement {
    /// Position among the document's path elements
    pub index: usize,
    pub id: Option<String>,
    /// Raw `d` attribute
    pub data: String,
    /// Effective transform, ancestors and the path's own attribute composed
    pub xform: XForm,
}

impl PathElement {
    /// Human readable identity used in diagnostics
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => format!("#{} (index {})", id, self.index),
            None => format!("index {}", self.index),
        }
    }
}

/// Convert a length like "210mm", "21cm" or "8.5in" to millimeters
pub fn text_to_mm(text: &str) -> Option<f64> {
    let text = text.trim().to_ascii_lowercase();

    let (number, factor) = if let Some(n) = text.strip_suffix("mm") {
        (n, 1.0)
    } else if let Some(n) = text.strip_suffix("cm") {
        (n, 10.0)
    } else if let Some(n) = text.strip_suffix("in") {
        (n, 25.4)
    } else {
        return None;
    };

    number.trim().parse::<f64>().ok().map(|v| v * factor)
}

fn parse_view_box(text: &str) -> Option<[f64; 4]> {
    let parts: Vec<f64> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect::<Option<_>>()?;

    match parts.as_slice() {
        &[x, y, w, h] if w > 0.0 && h > 0.0 => Some([x, y, w, h]),
        _ => None,
    }
}

/// Map the root's user units to millimeters with the origin at the
/// bottom-left corner of the page
fn page_xform(attrs: &ElementAttrs) -> Option<XForm> {
    let (Some(width), Some(height), Some(view_box)) =
        (&attrs.width, &attrs.height, &attrs.view_box)
    else {
        return None;
    };

    let (Some(width_mm), Some(height_mm)) = (text_to_mm(width), text_to_mm(height)) else {
        info!(
            "No conversion to millimeters for page size '{}' x '{}', using user units",
            width, height
        );
        return None;
    };

    let Some([vb_x, vb_y, vb_w, vb_h]) = parse_view_box(view_box) else {
        warn!("Invalid viewBox '{}', using user units", view_box);
        return None;
    };

    let scale_x = width_mm / vb_w;
    let scale_y = height_mm / vb_h;

    info!("Page size (mm): {:.3} x {:.3}", width_mm, height_mm);
    info!(
        "View box: {:.3} {:.3} {:.3} {:.3}",
        vb_x, vb_y, vb_w, vb_h
    );
    info!("Unit scale: {:.3}, {:.3}", scale_x, scale_y);

    Some(XForm::matrix(
        scale_x,
        0.0,
        0.0,
        -scale_y,
        -scale_x * vb_x,
        height_mm + scale_y * vb_y,
    ))
}

/// Attributes the walker cares about
#[derive(Debug, Default)]
struct ElementAttrs {
    id: Option<String>,
    d: Option<String>,
    transform: Option<String>,
    style: Option<String>,
    display: Option<String>,
    label: Option<String>,
    width: Option<String>,
    height: Option<String>,
    view_box: Option<String>,
}

impl ElementAttrs {
    fn read(e: &BytesStart) -> Result<Self> {
        let mut attrs = ElementAttrs::default();
        for attr in e.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref()).unwrap_or("");
            let value = attr.unescape_value()?.into_owned();
            match key {
                "id" => attrs.id = Some(value),
                "d" => attrs.d = Some(value),
                "transform" => attrs.transform = Some(value),
                "style" => attrs.style = Some(value),
                "display" => attrs.display = Some(value),
                "inkscape:label" => attrs.label = Some(value),
                "width" => attrs.width = Some(value),
                "height" => attrs.height = Some(value),
                "viewBox" | "viewbox" => attrs.view_box = Some(value),
                _ => {}
            }
        }
        Ok(attrs)
    }

    fn is_hidden(&self) -> bool {
        let style_hidden = self.style.as_deref().is_some_and(|s| {
            s.split(';').any(|decl| {
                let compact: String = decl.chars().filter(|c| !c.is_whitespace()).collect();
                compact == "display:none"
            })
        });
        style_hidden || self.display.as_deref().map(str::trim) == Some("none")
    }

    /// Own transform composed onto the parent's
    fn xform_within(&self, parent: &XForm) -> XForm {
        match &self.transform {
            Some(text) => {
                debug!("transform raw: {}", text);
                parent.compose(&parse_transform(text).xform)
            }
            None => *parent,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    xform: XForm,
    descend: bool,
}

/// Walks the element tree collecting path elements
struct Walker {
    stack: Vec<Frame>,
    paths: Vec<PathElement>,
}

impl Walker {
    fn new() -> Self {
        Self {
            stack: vec![Frame {
                xform: XForm::identity(),
                descend: true,
            }],
            paths: Vec::new(),
        }
    }

    fn parent(&self) -> Frame {
        self.stack.last().copied().unwrap_or(Frame {
            xform: XForm::identity(),
            descend: true,
        })
    }

    /// Handle an opening (or empty) tag and return the frame its children see
    fn open(&mut self, e: &BytesStart) -> Result<Frame> {
        let parent = self.parent();
        let skipped = Frame {
            xform: parent.xform,
            descend: false,
        };
        if !parent.descend {
            return Ok(skipped);
        }

        let qname = e.name();
        let name = std::str::from_utf8(qname.as_ref()).unwrap_or("");
        let (prefix, local) = match name.split_once(':') {
            Some((p, l)) => (Some(p), l),
            None => (None, name),
        };

        if matches!(prefix, Some("sodipodi" | "inkscape")) {
            return Ok(skipped);
        }

        match local {
            "svg" | "g" => {
                let attrs = ElementAttrs::read(e)?;
                if attrs.is_hidden() {
                    if let Some(label) = &attrs.label {
                        debug!("Skipping hidden group: {}", label);
                    }
                    return Ok(skipped);
                }
                if let Some(label) = &attrs.label {
                    info!("{}", label);
                }

                let mut base = parent.xform;
                // Page units only come from the outermost svg element
                if local == "svg"
                    && self.stack.len() == 1
                    && let Some(page) = page_xform(&attrs)
                {
                    base = base.compose(&page);
                }

                Ok(Frame {
                    xform: attrs.xform_within(&base),
                    descend: true,
                })
            }
            "path" => {
                let attrs = ElementAttrs::read(e)?;
                let index = self.paths.len();
                match attrs.d.clone() {
                    Some(data) => {
                        let xform = attrs.xform_within(&parent.xform);
                        self.paths.push(PathElement {
                            index,
                            id: attrs.id,
                            data,
                            xform,
                        });
                    }
                    None => warn!("Path element without 'd' attribute ignored"),
                }
                Ok(skipped)
            }
            "metadata" | "defs" | "title" | "desc" => Ok(skipped),
            _ => {
                warn!("Ignoring node: {}", name);
                Ok(skipped)
            }
        }
    }
}

/// Parse an SVG document and collect its visible path elements in document
/// order, each with its resolved transform
pub fn extract_paths(svg: &str) -> Result<Vec<PathElement>> {
    let mut reader = Reader::from_str(svg);
    reader.config_mut().trim_text(true);

    let mut walker = Walker::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let frame = walker.open(e)?;
                walker.stack.push(frame);
            }
            Event::Empty(ref e) => {
                walker.open(e)?;
            }
            Event::End(_) => {
                if walker.stack.len() > 1 {
                    walker.stack.pop();
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!("Found {} path elements", walker.paths.len());
    Ok(walker.paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn test_text_to_mm() {
        assert_eq!(text_to_mm("210mm"), Some(210.0));
        assert_eq!(text_to_mm(" 2.5 cm "), Some(25.0));
        assert_eq!(text_to_mm("1in"), Some(25.4));
        assert_eq!(text_to_mm("100"), None);
        assert_eq!(text_to_mm("100px"), None);
    }

    #[test]
    fn test_nested_transforms_inner_first() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
            <g transform="translate(10,0)">
                <g transform="matrix(2,0,0,2,0,0)">
                    <path d="M1,1" transform="translate(1,0)"/>
                </g>
            </g>
        </svg>"#;
        let paths = extract_paths(svg).unwrap();
        assert_eq!(paths.len(), 1);
        // (1,1) -> (2,1) -> (4,2) -> (14,2)
        assert_eq!(paths[0].xform.apply(Point::new(1.0, 1.0)), Point::new(14.0, 2.0));
    }

    #[test]
    fn test_sibling_transforms_do_not_leak() {
        let svg = r#"<svg>
            <g transform="translate(5,5)"><path d="M0,0"/></g>
            <path id="plain" d="M0,0"/>
        </svg>"#;
        let paths = extract_paths(svg).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[1].xform.is_identity());
        assert_eq!(paths[1].label(), "#plain (index 1)");
    }

    #[test]
    fn test_hidden_groups_skipped() {
        let svg = r#"<svg xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
            <g inkscape:label="Guides" style="display:none"><path d="M0,0L1,1"/></g>
            <g style="fill:none; display : none"><path d="M0,0L1,1"/></g>
            <g inkscape:label="Plot"><path d="M2,2L3,3"/></g>
        </svg>"#;
        let paths = extract_paths(svg).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].data, "M2,2L3,3");
    }

    #[test]
    fn test_unsupported_elements_skipped() {
        let svg = r#"<svg>
            <defs><path d="M9,9L8,8"/></defs>
            <metadata/>
            <sodipodi:namedview/>
            <rect width="10" height="10"/>
            <a><path d="M7,7L6,6"/></a>
            <path d="M0,0L1,1"/>
            <path id="empty"/>
        </svg>"#;
        let paths = extract_paths(svg).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].data, "M0,0L1,1");
    }

    #[test]
    fn test_page_units_flip_y() {
        let svg = r#"<svg width="20mm" height="10mm" viewBox="0 0 40 20">
            <path d="M0,0L40,20"/>
        </svg>"#;
        let paths = extract_paths(svg).unwrap();
        let xform = paths[0].xform;
        assert_eq!(xform.apply(Point::new(0.0, 0.0)), Point::new(0.0, 10.0));
        assert_eq!(xform.apply(Point::new(40.0, 20.0)), Point::new(20.0, 0.0));
    }

    #[test]
    fn test_page_units_respect_view_box_origin() {
        let svg = r#"<svg width="10mm" height="10mm" viewBox="5 5 10 10"><path d="M5,5"/></svg>"#;
        let paths = extract_paths(svg).unwrap();
        assert_eq!(paths[0].xform.apply(Point::new(5.0, 5.0)), Point::new(0.0, 10.0));
    }

    #[test]
    fn test_unitless_page_is_untouched() {
        let svg = r#"<svg width="20" height="10" viewBox="0 0 200 100"><path d="M1,1"/></svg>"#;
        let paths = extract_paths(svg).unwrap();
        assert!(paths[0].xform.is_identity());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(extract_paths("<svg><g></svg>").is_err());
    }

    #[test]
    fn test_attribute_entities_decoded() {
        let svg = r#"<svg>
            <g transform="translate(5,&#32;5)"><path id="a&amp;b" d="M0,0&#10;L1,0"/></g>
        </svg>"#;
        let paths = extract_paths(svg).unwrap();
        assert_eq!(paths[0].data, "M0,0\nL1,0");
        assert_eq!(paths[0].id.as_deref(), Some("a&b"));
        assert_eq!(paths[0].xform, XForm::translate(5.0, 5.0));
    }
}
