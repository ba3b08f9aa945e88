//! Human and JSON output for the `tfh` commands.
//!
//! Library code narrates through `tracing`; only the CLI layer prints here.

pub mod json;
pub mod progress;
pub mod styles;

use console::Term;
use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;
pub use styles::Styles;

/// Terminal state and flags shared by every command.
pub struct OutputContext {
    pub styles: Styles,
    /// stdout is a terminal.
    pub is_tty: bool,
    /// `--quiet`: only errors are printed.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are on only for a terminal without `--no-color` or `NO_COLOR`.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let mut styles = Styles::default();
        if is_tty && !no_color && std::env::var_os("NO_COLOR").is_none() {
            styles.colorize();
        }
        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// A ticking spinner on a terminal, a hidden bar otherwise, so callers
    /// can finish it unconditionally.
    #[must_use]
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.show_progress() {
            progress::spinner(msg)
        } else {
            progress::hidden()
        }
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// `key  value`, key dimmed.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}
