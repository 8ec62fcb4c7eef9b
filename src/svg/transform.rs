//! `transform` attribute parsing
//!
//! Only `matrix(...)` and `translate(...)` are applied. `rotate`, `scale`,
//! `skewX` and `skewY` are recognised but left out of the resulting matrix;
//! they are reported back so the caller can warn about them.

use crate::error::ConvertError;
use crate::types::XForm;
use tracing::{debug, warn};

/// Result of parsing one `transform` attribute
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTransform {
    pub xform: XForm,
    /// Recognised functions that were not applied, e.g. `scale(2)`
    pub ignored: Vec<String>,
}

impl ParsedTransform {
    fn identity() -> Self {
        Self {
            xform: XForm::identity(),
            ignored: Vec::new(),
        }
    }
}

/// Parse a transform list such as `translate(10,5) matrix(1 0 0 1 2 2)`.
///
/// Functions compose left to right, so the rightmost is applied to points
/// first. Syntax errors make the whole attribute fall back to identity.
pub fn parse_transform(text: &str) -> ParsedTransform {
    match parse_functions(text) {
        Ok(parsed) => {
            for function in &parsed.ignored {
                warn!("{}", ConvertError::UnsupportedTransform(function.clone()));
            }
            parsed
        }
        Err(reason) => {
            warn!("No transform procedure defined for '{}': {}", text, reason);
            ParsedTransform::identity()
        }
    }
}

fn parse_functions(text: &str) -> Result<ParsedTransform, String> {
    let mut parsed = ParsedTransform::identity();
    let mut rest = text.trim_start_matches(|c: char| c.is_whitespace() || c == ',');

    while !rest.is_empty() {
        let name_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if name_len == 0 {
            return Err(format!("expected a transform function at '{}'", rest));
        }
        let name = &rest[..name_len];

        let after_name = rest[name_len..].trim_start();
        let Some(args_start) = after_name.strip_prefix('(') else {
            return Err(format!("missing '(' after '{}'", name));
        };
        let Some(close) = args_start.find(')') else {
            return Err(format!("missing ')' for '{}'", name));
        };
        let raw_args = &args_start[..close];
        let args = parse_args(raw_args).map_err(|e| format!("{} in '{}'", e, name))?;
        let source = format!("{}({})", name, raw_args.trim());

        match (name, args.as_slice()) {
            ("matrix", &[a, b, c, d, e, f]) => {
                debug!("transform: {}", source);
                parsed.xform = parsed.xform.compose(&XForm::matrix(a, b, c, d, e, f));
            }
            ("translate", &[tx]) => {
                debug!("transform: {}", source);
                parsed.xform = parsed.xform.compose(&XForm::translate(tx, 0.0));
            }
            ("translate", &[tx, ty]) => {
                debug!("transform: {}", source);
                parsed.xform = parsed.xform.compose(&XForm::translate(tx, ty));
            }
            ("rotate", &[_] | &[_, _, _])
            | ("scale", &[_] | &[_, _])
            | ("skewX", &[_])
            | ("skewY", &[_]) => parsed.ignored.push(source),
            ("matrix" | "translate" | "rotate" | "scale" | "skewX" | "skewY", _) => {
                return Err(format!(
                    "wrong number of arguments ({}) for '{}'",
                    args.len(),
                    name
                ));
            }
            _ => return Err(format!("unknown transform function '{}'", name)),
        }

        rest = args_start[close + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }

    Ok(parsed)
}

fn parse_args(raw: &str) -> Result<Vec<f64>, String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| format!("invalid number '{}'", s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn test_translate() {
        let t = parse_transform("translate(5,5)");
        assert_eq!(t.xform, XForm::translate(5.0, 5.0));
        assert!(t.ignored.is_empty());
    }

    #[test]
    fn test_translate_single_argument() {
        let t = parse_transform("translate(3)");
        assert_eq!(t.xform, XForm::translate(3.0, 0.0));
    }

    #[test]
    fn test_matrix_with_spaces() {
        let t = parse_transform("matrix(2 0 0 2 1 1)");
        assert_eq!(t.xform.apply(Point::new(1.0, 1.0)), Point::new(3.0, 3.0));
    }

    #[test]
    fn test_list_applies_rightmost_first() {
        let t = parse_transform("translate(10, 0) matrix(2,0,0,2,0,0)");
        assert_eq!(t.xform.apply(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
    }

    #[test]
    fn test_scale_and_rotate_ignored() {
        let t = parse_transform("scale(2) translate(1,1) rotate(45)");
        assert_eq!(t.xform, XForm::translate(1.0, 1.0));
        assert_eq!(t.ignored, vec!["scale(2)".to_string(), "rotate(45)".to_string()]);
    }

    #[test]
    fn test_malformed_is_identity() {
        assert!(parse_transform("translate(1,").xform.is_identity());
        assert!(parse_transform("skew(1)").xform.is_identity());
        assert!(parse_transform("matrix(1,2,3)").xform.is_identity());
        assert!(parse_transform("translate(a,b)").xform.is_identity());
    }

    #[test]
    fn test_empty_is_identity() {
        let t = parse_transform("  ");
        assert!(t.xform.is_identity());
        assert!(t.ignored.is_empty());
    }
}
