//! Pure formatting functions for UI output.
//!
//! `format_*` functions build strings and are testable; `display_*` functions
//! only print what the formatters return.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::scanner::{ChangeCode, TemplateChange, TemplateChangeReport};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// One report line: `[warning] templates/cart.php - This template may ...`
pub fn format_template_change(change: &TemplateChange) -> String {
    let code = match change.code {
        ChangeCode::Warning => style(format!("[{}]", change.code)).yellow(),
        ChangeCode::Notice => style(format!("[{}]", change.code)).green(),
    };
    format!("{} {} - {}", code, change.file_path, change.message)
}

/// Heading plus one line per change, or a single line when nothing changed.
pub fn format_template_report(report: &TemplateChangeReport) -> Vec<String> {
    if report.is_empty() {
        return vec!["No template changes detected".to_string()];
    }

    let mut lines = vec![format!(
        "{} ({} need a version bump, {} bumped)",
        style("Template changes").bold(),
        report.warnings().count(),
        report.notices().count()
    )];
    lines.extend(
        report
            .changes
            .iter()
            .map(|change| format!("  {}", format_template_change(change))),
    );
    lines
}

/// Display the template change report.
pub fn display_template_report(report: &TemplateChangeReport) {
    println!();
    for line in format_template_report(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    #[test]
    fn test_format_template_change() {
        plain();
        let line = format_template_change(&TemplateChange::notice("templates/a.php"));
        assert_eq!(line, "[notice] templates/a.php - Version bump found");
    }

    #[test]
    fn test_format_empty_report() {
        plain();
        let lines = format_template_report(&TemplateChangeReport::default());
        assert_eq!(lines, vec!["No template changes detected"]);
    }

    #[test]
    fn test_format_report_counts() {
        plain();
        let report = TemplateChangeReport {
            changes: vec![
                TemplateChange::notice("templates/a.php"),
                TemplateChange::warning("templates/b.php"),
                TemplateChange::warning("templates/c.php"),
            ],
        };

        let lines = format_template_report(&report);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Template changes (2 need a version bump, 1 bumped)");
        assert!(lines[2].starts_with("  [warning] templates/b.php"));
    }

    #[test]
    fn test_display_status() {
        // Visual verification test - output is printed to stdout
        display_status("test status");
    }
}
