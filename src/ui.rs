use colored::{ColoredString, Colorize};
use fleet::StatusLabel;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Pad text to a fixed-width column, cutting it short with `…` if it won't fit
///
/// Padding happens before coloring so escape codes don't count toward width.
pub fn column(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len < width {
        format!("{text:<width$}")
    } else {
        let kept: String = text.chars().take(width.saturating_sub(2)).collect();
        format!("{kept}… ")
    }
}

/// Color a host status label: running green, stopped red, anything else yellow
pub fn status_label(label: &StatusLabel) -> ColoredString {
    match label {
        StatusLabel::Running => label.as_str().green().bold(),
        StatusLabel::Stopped => label.as_str().red().bold(),
        StatusLabel::Other(other) => other.as_str().yellow().bold(),
    }
}
