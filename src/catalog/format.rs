//! Display formatting for catalog cells.

pub const PLACEHOLDER: &str = "—";

/// `12` -> `"12%"`, `0` -> `"0%"`, absent -> `"—"`.
///
/// Shared by the table columns and the highlight cards.
pub fn format_return(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}%", v),
        None => PLACEHOLDER.to_string(),
    }
}

/// Text cell: absent or empty renders as the placeholder dash.
pub fn format_text(value: Option<&str>) -> String {
    match value {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_placeholder() {
        assert_eq!(format_return(Some(0.0)), "0%");
        assert_eq!(format_return(None), "—");
    }

    #[test]
    fn integral_and_fractional() {
        assert_eq!(format_return(Some(12.0)), "12%");
        assert_eq!(format_return(Some(-3.75)), "-3.75%");
    }

    #[test]
    fn empty_text_is_placeholder() {
        assert_eq!(format_text(Some("")), "—");
        assert_eq!(format_text(None), "—");
        assert_eq!(format_text(Some("Equity")), "Equity");
    }
}
