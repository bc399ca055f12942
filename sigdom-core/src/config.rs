//! Binder configuration.
//!
//! The defaults match what a browser page expects. A configuration can also
//! be loaded from JSON, with every field optional:
//!
//! ```json
//! { "marker_label": "live", "extra_svg_tags": ["hatch"] }
//! ```

use serde::Deserialize;

use crate::error::Result;

/// Knobs of the element binder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Text of the comment node that anchors a reactive child range.
    pub marker_label: String,

    /// Event that writes a bound `value` back into its signal.
    pub value_event: String,

    /// Event that writes a bound `checked` back into its signal.
    pub checked_event: String,

    /// Tag names created in the SVG namespace besides the built-in set.
    pub extra_svg_tags: Vec<String>,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            marker_label: "signal".to_owned(),
            value_event: "input".to_owned(),
            checked_event: "change".to_owned(),
            extra_svg_tags: Vec::new(),
        }
    }
}

impl BinderConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
