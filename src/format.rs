/// Format a number with a fixed number of decimals, treating -0 as 0
pub(crate) fn fixed(n: f64, precision: usize) -> String {
    let n = if n == 0.0 { 0.0 } else { n };
    let s = format!("{:.*}", precision, n);
    // Small negatives can still round to "-0.000"
    match s.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => s,
    }
}
