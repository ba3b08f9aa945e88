//! Colors for human-readable output.

use owo_colors::Style;

/// Styles for the marks and labels `tfh` prints. All plain by default;
/// [`Styles::colorize`] switches them on for color terminals.
#[derive(Default, Clone)]
pub struct Styles {
    /// `✓` marks.
    pub success: Style,
    /// `⚠` marks and benign failures.
    pub warning: Style,
    /// `✗` marks in `tfh doctor`.
    pub error: Style,
    /// Keys of key-value lines.
    pub dim: Style,
    /// Report titles.
    pub header: Style,
}

impl Styles {
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.dim = Style::new().dimmed();
        self.header = Style::new().bold().cyan();
    }
}
