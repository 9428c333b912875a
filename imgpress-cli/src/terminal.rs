//! Terminal output helpers: section headers, aligned status lines and
//! success/warning/error messages.
//!
//! Everything is written through `log::info!` so it shares the logger's
//! destination. Color is disabled when `NO_COLOR` is set.

use console::style;
use log::info;
use owo_colors::OwoColorize;

const LABEL_WIDTH: usize = 12;

/// Whether output may be colored (respects the NO_COLOR environment variable).
pub fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Prints a section header, e.g. `===== CONVERT =====`.
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Prints an aligned `label: value` line. `highlight` renders the value bold.
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let line = format_status(label, value);
    if should_use_color() && highlight {
        let (head, _) = line.split_at(line.len() - value.len());
        info!("{head}{}", style(value).bold());
    } else {
        info!("{line}");
    }
}

fn format_status(label: &str, value: &str) -> String {
    let padding = LABEL_WIDTH.saturating_sub(label.chars().count()).max(1);
    format!("  {label}:{} {value}", " ".repeat(padding))
}

pub fn print_success(message: &str) {
    info!("");
    if should_use_color() {
        info!("  ✓ {}", message.green());
    } else {
        info!("  ✓ {message}");
    }
}

pub fn print_warning(message: &str) {
    info!("");
    if should_use_color() {
        info!("  ! {}", message.yellow());
    } else {
        info!("  ! {message}");
    }
}

/// Prints an error with an optional suggestion for the user.
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    if should_use_color() {
        info!("✗ {}", title.red().bold());
    } else {
        info!("✗ {title}");
    }
    info!("");
    info!("  Message:    {message}");
    if let Some(suggestion) = suggestion {
        info!("  Suggestion: {suggestion}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines_align_values() {
        assert_eq!(format_status("Input", "/photos"), "  Input:        /photos");
        assert_eq!(format_status("Workers", "6"), "  Workers:      6");
        assert_eq!(
            format_status("A very long label", "x"),
            "  A very long label:  x"
        );
    }
}
