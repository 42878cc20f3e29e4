use console::style;
use std::fmt::Display;

/// Human-readable CLI output. Machine-readable results go to stdout as JSON instead.
pub struct Output;

impl Output {
    pub fn success<T: Display>(message: T) {
        eprintln!("{} {}", style("✓").green(), message);
    }

    pub fn warning<T: Display>(message: T) {
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    pub fn section<T: Display>(title: T) {
        eprintln!("\n{}", style(title).bold().underlined());
    }

    pub fn sub_item<T: Display>(message: T) {
        eprintln!("  {} {}", style("→").dim(), message);
    }

    pub fn tip<T: Display>(message: T) {
        eprintln!("{} {}", style("TIP:").cyan(), style(message).dim());
    }
}
