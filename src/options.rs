//! Compiler options
//!
//! Options arrive either as JSON from the build pipeline or from a TOML
//! file. Every field has a default so an empty document is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::validate::{StyleError, ERR_CONFIG};

/// How conflicts between shorthands and longhands are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleResolution {
    /// The last applied declaration wins; a later shorthand resets the
    /// longhands set before it. Resolved at merge time.
    #[default]
    ApplicationOrder,
    /// Longhands always win over their shorthands, whatever the order.
    PropertySpecificity,
    /// Shorthands are expanded into longhands at compile time.
    LegacyExpandShorthands,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOptions {
    pub class_name_prefix: String,
    pub dev: bool,
    pub style_resolution: StyleResolution,
    pub enable_font_size_px_to_rem: bool,
    #[serde(rename = "useCSSLayers", alias = "useCssLayers")]
    pub use_css_layers: bool,
    pub layer_prefix: String,
    pub strict_merge: bool,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            class_name_prefix: "x".to_string(),
            dev: false,
            style_resolution: StyleResolution::default(),
            enable_font_size_px_to_rem: false,
            use_css_layers: false,
            layer_prefix: "priority".to_string(),
            strict_merge: false,
        }
    }
}

impl StyleOptions {
    pub fn from_json(value: serde_json::Value) -> Result<Self, StyleError> {
        serde_json::from_value(value).map_err(|err| {
            StyleError::new(ERR_CONFIG, format!("Invalid compiler options: {}", err))
        })
    }

    /// Strict merging is implied by dev builds.
    pub fn merge_is_strict(&self) -> bool {
        self.strict_merge || self.dev
    }
}

/// Reads options from a TOML file.
pub fn load(path: &Path) -> Result<StyleOptions, StyleError> {
    let text = fs::read_to_string(path).map_err(|err| {
        StyleError::new(
            ERR_CONFIG,
            format!("failed to read config {}: {}", path.display(), err),
        )
    })?;
    toml::from_str(&text).map_err(|err| {
        StyleError::new(
            ERR_CONFIG,
            format!("failed to parse config {}: {}", path.display(), err),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn test_defaults_when_empty() {
        let path = temp_path("style_options_empty");
        let _ = fs::write(&path, "");
        let options = load(&path).expect("options should parse");
        assert_eq!(options, StyleOptions::default());
        assert_eq!(options.class_name_prefix, "x");
        assert_eq!(options.style_resolution, StyleResolution::ApplicationOrder);
    }

    #[test]
    fn test_loads_toml_options() {
        let path = temp_path("style_options_full");
        let _ = fs::write(
            &path,
            r#"
classNamePrefix = "s"
dev = true
styleResolution = "property-specificity"
enableFontSizePxToRem = true
useCSSLayers = true
"#,
        );
        let options = load(&path).expect("options should parse");
        assert_eq!(options.class_name_prefix, "s");
        assert!(options.dev);
        assert!(options.merge_is_strict());
        assert_eq!(options.style_resolution, StyleResolution::PropertySpecificity);
        assert!(options.enable_font_size_px_to_rem);
        assert!(options.use_css_layers);
    }

    #[test]
    fn test_from_json_rejects_unknown_resolution() {
        let err = StyleOptions::from_json(serde_json::json!({
            "styleResolution": "whatever"
        }))
        .unwrap_err();
        assert_eq!(err.code, ERR_CONFIG);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load(Path::new("/nonexistent/style-options.toml")).unwrap_err();
        assert_eq!(err.code, ERR_CONFIG);
    }

    fn temp_path(prefix: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("{}_{}.toml", prefix, nanos))
    }
}
