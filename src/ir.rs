//! Compiler data model
//!
//! Every type here is an immutable compile product or compile input and
//! round-trips through JSON so the build pipeline can store and forward it.

#[cfg(feature = "napi")]
use napi_derive::napi;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Key of the marker that identifies compiler output.
pub const COMPILED_MARKER_KEY: &str = "$$css";

/// Key of the object form `{ "$$dynamic": "param" }` of a dynamic value.
pub const DYNAMIC_VALUE_KEY: &str = "$$dynamic";

// ═══════════════════════════════════════════════════════════════════════════════
// INPUT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Number(f64),
    String(String),
}

/// A raw declaration value. `Null` explicitly unsets the property under its
/// condition, which is different from leaving the property out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Null,
    Number(f64),
    String(String),
    /// Fallback list: one declaration per entry, last supported one wins.
    Fallbacks(Vec<ScalarValue>),
    /// Value supplied at render time through a custom property.
    Dynamic {
        #[serde(rename = "$$dynamic")]
        param: String,
    },
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::String(value.to_string())
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub namespace: String,
    pub property: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub value: StyleValue,
}

impl Declaration {
    pub fn new(namespace: &str, property: &str, value: impl Into<StyleValue>) -> Self {
        Self {
            namespace: namespace.to_string(),
            property: property.to_string(),
            conditions: vec![],
            value: value.into(),
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// One physical CSS rule and, when it differs, its right-to-left twin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct InjectableStyle {
    pub priority: f64,
    pub ltr: String,
    pub rtl: Option<String>,
}

impl InjectableStyle {
    pub fn new(priority: f64, ltr: String, rtl: String) -> Self {
        let rtl = if rtl == ltr { None } else { Some(rtl) };
        Self { priority, ltr, rtl }
    }
}

/// Class name -> rule, in first-seen order.
pub type Injectables = IndexMap<String, InjectableStyle>;

/// Value of the `$$css` marker: `true` in production, the source identity
/// of the namespace in dev builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompiledMarker {
    Flag(bool),
    Source(String),
}

impl CompiledMarker {
    pub fn source(&self) -> Option<&str> {
        match self {
            CompiledMarker::Source(s) => Some(s),
            CompiledMarker::Flag(_) => None,
        }
    }
}

/// Synthetic style key -> atomic class name, or `None` for an explicit unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatCompiledStyles {
    #[serde(rename = "$$css")]
    pub marker: CompiledMarker,
    #[serde(flatten)]
    pub classes: IndexMap<String, Option<String>>,
}

impl FlatCompiledStyles {
    pub fn new(marker: CompiledMarker) -> Self {
        Self {
            marker,
            classes: IndexMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.classes.get(key).and_then(|c| c.as_deref())
    }
}

/// A render-time parameter bound to the custom property a compiled class
/// reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct DynamicBinding {
    pub key: String,
    pub param: String,
    pub var_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledNamespace {
    pub namespace: String,
    pub styles: FlatCompiledStyles,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dynamic: Vec<DynamicBinding>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_style_value_shapes() {
        let v: StyleValue = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(v, StyleValue::Null);
        let v: StyleValue = serde_json::from_value(json!(4)).unwrap();
        assert_eq!(v, StyleValue::Number(4.0));
        let v: StyleValue = serde_json::from_value(json!(["red", 1])).unwrap();
        assert_eq!(
            v,
            StyleValue::Fallbacks(vec![
                ScalarValue::String("red".to_string()),
                ScalarValue::Number(1.0)
            ])
        );
        let v: StyleValue = serde_json::from_value(json!({ "$$dynamic": "color" })).unwrap();
        assert_eq!(
            v,
            StyleValue::Dynamic {
                param: "color".to_string()
            }
        );
    }

    #[test]
    fn test_injectable_drops_identical_rtl() {
        let same = InjectableStyle::new(3000.0, ".a{color:red}".into(), ".a{color:red}".into());
        assert!(same.rtl.is_none());
        let mirrored =
            InjectableStyle::new(3000.0, ".a{float:left}".into(), ".a{float:right}".into());
        assert_eq!(mirrored.rtl.as_deref(), Some(".a{float:right}"));
    }

    #[test]
    fn test_flat_styles_serialize_with_marker() {
        let mut styles = FlatCompiledStyles::new(CompiledMarker::Flag(true));
        styles.classes.insert("color".into(), Some("x1".into()));
        styles.classes.insert(":hover_color".into(), None);
        let value = serde_json::to_value(&styles).unwrap();
        assert_eq!(
            value,
            json!({ "$$css": true, "color": "x1", ":hover_color": null })
        );
        let back: FlatCompiledStyles = serde_json::from_value(value).unwrap();
        assert_eq!(back, styles);
    }
}
