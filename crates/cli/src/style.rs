//! Colors for the lines printed after the terminal UI has closed.

use console::Style;

/// A finished item: a fully resolved file, or "No conflicts detected".
pub fn success(msg: &str) -> String {
    let style = Style::new().green();
    format!("{} {}", style.apply_to("✓"), msg)
}

/// The single red line printed before exiting with status 1.
pub fn error(msg: &str) -> String {
    Style::new().red().apply_to(msg).to_string()
}

/// Conflicts the session left with their markers in place.
pub fn warn(msg: &str) -> String {
    format!("{} {}", Style::new().yellow().apply_to("!"), msg)
}

/// The summary's "Resolved n of m" headline.
pub fn header(msg: &str) -> String {
    Style::new().bold().apply_to(msg).to_string()
}

/// A file that still has unresolved conflicts.
pub fn dim(msg: &str) -> String {
    Style::new().dim().apply_to(msg).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_a_single_line() {
        let line = error("fac: failed to load settings");
        assert!(line.contains("fac: failed to load settings"));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_markers_prefix_message() {
        assert!(success("No conflicts detected").ends_with(" No conflicts detected"));
        assert!(warn("1 left unresolved").ends_with(" 1 left unresolved"));
    }
}
