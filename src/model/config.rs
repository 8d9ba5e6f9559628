use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from config.toml in the store directory. Entirely
/// optional; absence or a parse failure falls back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Hex color overrides for the TUI theme, e.g. `highlight = "#1DB954"`.
    #[serde(default)]
    pub colors: HashMap<String, String>,
}
