//! Shared preset defaults (lowest layer)
//!
//! Docs and theme options every site starts from.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Preset every site is built with.
pub const CLASSIC_PRESET: &str = "@docusaurus/preset-classic";

/// Shared docs/theme options for the classic preset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedDefaults {
    /// Show the author of the last update on each doc page (default: true)
    pub show_last_update_author: bool,

    /// Show the time of the last update on each doc page (default: true)
    pub show_last_update_time: bool,

    /// Initial color mode (default: "light")
    pub default_color_mode: String,

    /// Follow the reader's OS color preference (default: true)
    pub respect_prefers_color_scheme: bool,
}

impl Default for SharedDefaults {
    fn default() -> Self {
        Self {
            show_last_update_author: true,
            show_last_update_time: true,
            default_color_mode: "light".to_string(),
            respect_prefers_color_scheme: true,
        }
    }
}

impl SharedDefaults {
    /// Convert to the JSON layer used for merging
    pub fn to_value(&self) -> Value {
        json!({
            "presets": [
                [
                    CLASSIC_PRESET,
                    {
                        "docs": {
                            "showLastUpdateAuthor": self.show_last_update_author,
                            "showLastUpdateTime": self.show_last_update_time,
                            "remarkPlugins": []
                        },
                        "theme": {
                            "colorMode": {
                                "defaultMode": self.default_color_mode,
                                "respectPrefersColorScheme": self.respect_prefers_color_scheme
                            }
                        }
                    }
                ]
            ]
        })
    }
}
