//! Transcript styling.

use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Colors are disabled when the `NO_COLOR` environment variable is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Read `NO_COLOR` from the environment (any value disables colors).
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Explicitly enabled or disabled.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== TranscriptStyles =====

/// Styles for transcript entries and the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptStyles {
    /// Fully revealed messages.
    pub finished: Style,
    /// The message still streaming in.
    pub streaming: Style,
    /// Status bar.
    pub status: Style,
}

impl TranscriptStyles {
    /// Styles for the given color configuration.
    pub fn with_color_config(colors: ColorConfig) -> Self {
        if !colors.colors_enabled() {
            return Self {
                finished: Style::default(),
                streaming: Style::default().add_modifier(Modifier::BOLD),
                status: Style::default().add_modifier(Modifier::REVERSED),
            };
        }
        Self {
            finished: Style::default(),
            streaming: Style::default().fg(Color::Green),
            status: Style::default().fg(Color::Black).bg(Color::Cyan),
        }
    }
}

impl Default for TranscriptStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env())
    }
}
