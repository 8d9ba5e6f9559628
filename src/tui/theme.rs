use ratatui::style::Color;

use crate::model::config::UiConfig;
use crate::model::task::Priority;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub cyan: Color,
    pub selection_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x12, 0x12, 0x12),
            text: Color::Rgb(0xB3, 0xB3, 0xB3),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0x1D, 0xB9, 0x54),
            dim: Color::Rgb(0x53, 0x53, 0x53),
            red: Color::Rgb(0xFF, 0x41, 0x6C),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            cyan: Color::Rgb(0x44, 0xDD, 0xFF),
            selection_bg: Color::Rgb(0x28, 0x28, 0x28),
        }
    }
}

/// Parse a hex color string like "#1DB954" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from store config, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            if let Some(color) = parse_hex_color(value) {
                match key.as_str() {
                    "background" => theme.background = color,
                    "text" => theme.text = color,
                    "text_bright" => theme.text_bright = color,
                    "highlight" => theme.highlight = color,
                    "dim" => theme.dim = color,
                    "red" => theme.red = color,
                    "yellow" => theme.yellow = color,
                    "cyan" => theme.cyan = color,
                    "selection_bg" => theme.selection_bg = color,
                    _ => {}
                }
            }
        }

        theme
    }

    /// Get the color for a priority bucket
    pub fn priority_color(&self, priority: Priority) -> Color {
        match priority {
            Priority::Overdue => self.red,
            Priority::Today => self.yellow,
            Priority::High => self.highlight,
            Priority::Medium => self.cyan,
            Priority::Low => self.dim,
        }
    }
}
