//! Validation for the style compiler
//!
//! Error codes, the `StyleError` diagnostic type, and the checks that turn
//! malformed declarations into fatal compile errors: unknown properties,
//! unrecognized conditions, unclosed function calls and shorthand forms the
//! configured resolution mode cannot express.

#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};

use crate::options::StyleResolution;
use crate::priorities;
use crate::properties;
use crate::value_parser;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_UNKNOWN_PROPERTY: &str = "STYLE-ERR-UNKNOWN-PROPERTY";
pub const ERR_INVALID_CONDITION: &str = "STYLE-ERR-INVALID-CONDITION";
pub const ERR_UNCLOSED_FUNCTION: &str = "STYLE-ERR-UNCLOSED-FUNCTION";
pub const ERR_ILLEGAL_SHORTHAND: &str = "STYLE-ERR-ILLEGAL-SHORTHAND";
pub const ERR_UNKNOWN_TOKEN: &str = "STYLE-ERR-UNKNOWN-TOKEN";
pub const ERR_INVALID_TOKEN_CONDITION: &str = "STYLE-ERR-INVALID-TOKEN-CONDITION";
pub const ERR_INVALID_VALUE: &str = "STYLE-ERR-INVALID-VALUE";
pub const ERR_NOT_COMPILED: &str = "STYLE-ERR-NOT-COMPILED";
pub const ERR_CONFIG: &str = "STYLE-ERR-CONFIG";

// ═══════════════════════════════════════════════════════════════════════════════
// GUARANTEES
// ═══════════════════════════════════════════════════════════════════════════════

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_UNKNOWN_PROPERTY => "Every atomic class maps to a real CSS property.",
        ERR_INVALID_CONDITION => {
            "Conditions are `default`, a recognized pseudo selector, or an at-rule."
        }
        ERR_UNCLOSED_FUNCTION => "Emitted declarations never leave a function call open.",
        ERR_ILLEGAL_SHORTHAND => {
            "Shorthands are only accepted in forms the resolution mode can order correctly."
        }
        ERR_UNKNOWN_TOKEN => "Themes only override tokens their group declares.",
        ERR_INVALID_TOKEN_CONDITION => "Token values may only vary by at-rule.",
        ERR_INVALID_VALUE => "Every declaration value is a literal string, number or fallback list.",
        ERR_NOT_COMPILED => "Only compiler output is merged into class names.",
        ERR_CONFIG => "Compiler options are read from a well-formed configuration.",
        _ => "Unknown invariant.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STYLE ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
#[error("[{code}] {message}")]
pub struct StyleError {
    pub code: String,
    pub message: String,
    pub guarantee: String,
    pub namespace: Option<String>,
    pub property: Option<String>,
    pub value: Option<String>,
    pub hints: Vec<String>,
}

pub type Result<T> = std::result::Result<T, StyleError>;

impl StyleError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        StyleError {
            code: code.to_string(),
            message: message.into(),
            guarantee: get_guarantee(code).to_string(),
            namespace: None,
            property: None,
            value: None,
            hints: vec![],
        }
    }

    pub fn in_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    pub fn for_property(mut self, property: &str) -> Self {
        self.property = Some(property.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHECKS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fails unless `property` (already dashed) is a custom property, a
/// vendor-prefixed property, or a known standard property.
pub fn validate_property(namespace: &str, property: &str) -> Result<()> {
    if properties::is_known_property(property) {
        return Ok(());
    }
    Err(StyleError::new(
        ERR_UNKNOWN_PROPERTY,
        format!(
            "Unknown CSS property `{}` in namespace `{}`.",
            property, namespace
        ),
    )
    .in_namespace(namespace)
    .for_property(property))
}

/// Lints a canonical value. Only structural problems are rejected; CSS
/// accepts far more values than the normalizer understands.
pub fn validate_value(
    namespace: &str,
    property: &str,
    value: &str,
    resolution: StyleResolution,
) -> Result<()> {
    let tokens = value_parser::tokenize(value);
    if value_parser::has_unclosed_function(&tokens) {
        return Err(StyleError::new(
            ERR_UNCLOSED_FUNCTION,
            format!(
                "Value `{}` for `{}` in namespace `{}` has an unclosed function call.",
                value, property, namespace
            ),
        )
        .in_namespace(namespace)
        .for_property(property)
        .with_value(value));
    }

    if resolution == StyleResolution::PropertySpecificity
        && priorities::is_multi_value_box_shorthand(property)
    {
        let parts = value_parser::split_top_level_spaces(value).len();
        if parts > 1 && !value.contains("var(") {
            return Err(StyleError::new(
                ERR_ILLEGAL_SHORTHAND,
                format!(
                    "Multi-value shorthand `{}: {}` in namespace `{}` is not supported with property-specificity resolution.",
                    property, value, namespace
                ),
            )
            .in_namespace(namespace)
            .for_property(property)
            .with_value(value)
            .with_hint("Use the individual longhand properties instead."));
        }
    }

    Ok(())
}
