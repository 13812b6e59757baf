//! Binding configuration.

use serde::{Deserialize, Serialize};

use crate::parser::ParamStyle;

/// Settings that control how statements are scanned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    /// Grammar used to recognize named parameters.
    pub param_style: ParamStyle,
}

impl BindConfig {
    /// Creates the default configuration (`:name:` parameters).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parameter grammar.
    #[must_use]
    pub const fn param_style(mut self, style: ParamStyle) -> Self {
        self.param_style = style;
        self
    }
}
