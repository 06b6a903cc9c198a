// Utility functions

/// Replaces every non-alphanumeric character with `_`, for export file names.
pub fn sanitize_filename(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Interprets a feed cell as a 0/1 flag.
///
/// Numbers other than zero count as set, as do `true`, `yes`, `y` and `x`.
/// Blank or unparseable cells are unset.
pub fn parse_flag(cell: &str) -> bool {
    let cell = cell.trim();
    if let Ok(n) = cell.parse::<f64>() {
        return n != 0.0 && !n.is_nan();
    }
    matches!(cell.to_ascii_lowercase().as_str(), "true" | "yes" | "y" | "x")
}
