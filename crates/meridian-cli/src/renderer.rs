//! Terminal rendering for markdown reports.
//!
//! Reports, graphs and trees are markdown produced by the core's Display
//! implementations. With color enabled they are styled through termimad;
//! otherwise the markdown is printed as is. Machine-readable output such
//! as JSON or Mermaid source always bypasses styling.

use termimad::{crossterm::style::Color, MadSkin};

/// Prints markdown either styled or verbatim
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Cyan);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Render markdown text to the terminal
    pub fn render(&self, markdown: &str) {
        if !self.rich_enabled {
            print!("{markdown}");
            return;
        }
        // Headers keep their hash marks so section depth stays visible
        for line in markdown.lines() {
            if line.starts_with('#') {
                println!("\x1b[36m{line}\x1b[0m");
            } else {
                self.skin.print_inline(line);
                println!();
            }
        }
    }

    /// Print text that must not be styled, such as JSON or Mermaid source
    pub fn render_raw(&self, text: &str) {
        if text.ends_with('\n') {
            print!("{text}");
        } else {
            println!("{text}");
        }
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
