//! Terminal output helpers.

use owo_colors::OwoColorize;

/// Small colored-output wrapper so command code doesn't sprinkle escape
/// codes everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn status(&self, message: &str) {
        println!("{}", message);
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", "!".yellow(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn list_item(&self, message: &str) {
        println!("  - {}", message);
    }

    pub fn event(&self, label: &str, detail: &str) {
        println!("{} {}", label.bold().cyan(), detail);
    }
}
