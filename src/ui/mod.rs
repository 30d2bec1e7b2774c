pub mod icons;
pub mod progress;

pub use progress::LoadingIndicator;

use console::style;

/// Bold section heading followed by an underline of the same width.
pub fn heading(title: &str) -> String {
    format!(
        "{}\n{}",
        style(title).bold(),
        "=".repeat(title.chars().count())
    )
}

/// Red error banner used by every view.
pub fn error_banner(message: &str) -> String {
    format!("{}{}", icons::CROSS, style(message).red())
}
