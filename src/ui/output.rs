//! Status lines for the CLI. Styling is skipped when stdout is not a terminal.

use crate::ui::Icons;
use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

static COLOR: OnceLock<bool> = OnceLock::new();

fn color_enabled() -> bool {
    *COLOR.get_or_init(|| console::Term::stdout().is_term())
}

fn paint_with(color: bool, text: &str, style: Style) -> String {
    if color {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

fn paint(text: &str, style: Style) -> String {
    paint_with(color_enabled(), text, style)
}

pub fn header(icon: &str, text: &str) {
    println!("{} {}", icon, paint(text, Style::new().cyan().bold()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, paint(label, Style::new().green().bold()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, paint(label, Style::new().red().bold()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        paint(Icons::INFO, Style::new().magenta()),
        paint(label, Style::new().dimmed()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", paint(title, Style::new().cyan().bold()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_output_has_no_escapes() {
        let text = paint_with(false, "Initializing sqlite:data.db", Style::new().cyan().bold());
        assert_eq!(text, "Initializing sqlite:data.db");
    }

    #[test]
    fn test_colored_output_wraps_text() {
        let text = paint_with(true, "done", Style::new().green().bold());
        assert!(text.contains("done"));
        assert!(text.contains('\u{1b}'));
    }
}
