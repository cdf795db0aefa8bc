//! `@keyframes` compilation
//!
//! The animation name is derived from the canonical LTR frame text, so
//! identical animations declared anywhere share one rule.

use indexmap::IndexMap;

use crate::hash;
use crate::ir::{InjectableStyle, ScalarValue, StyleValue};
use crate::normalize::{self, NormalizeOptions};
use crate::options::StyleOptions;
use crate::properties;
use crate::rtl::{self, Direction};
use crate::validate::{self, Result, StyleError, ERR_INVALID_VALUE};

/// Frame selector (`from`, `to`, `50%`) -> property -> value.
pub type Keyframes = IndexMap<String, IndexMap<String, StyleValue>>;

const KEYFRAMES_PRIORITY: f64 = 0.0;
const NAME_SUFFIX: &str = "-B";

/// Returns the generated animation name and its rule.
pub fn compile_keyframes(
    frames: &Keyframes,
    options: &StyleOptions,
) -> Result<(String, InjectableStyle)> {
    let normalize = NormalizeOptions::from(options);
    let mut ltr = String::new();
    let mut rtl = String::new();

    for (selector, declarations) in frames {
        let selector = selector.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut ltr_body = Vec::new();
        let mut rtl_body = Vec::new();
        for (raw_property, value) in declarations {
            let property = properties::dashify(raw_property);
            validate::validate_property("@keyframes", &property)?;
            for value in frame_values(&property, value, normalize)? {
                validate::validate_value(
                    "@keyframes",
                    &property,
                    &value,
                    options.style_resolution,
                )?;
                let (p, v) = rtl::generate(&property, &value, Direction::Ltr);
                ltr_body.push(format!("{}:{};", p, v));
                let (p, v) = rtl::generate(&property, &value, Direction::Rtl);
                rtl_body.push(format!("{}:{};", p, v));
            }
        }
        ltr.push_str(&format!("{}{{{}}}", selector, ltr_body.concat()));
        rtl.push_str(&format!("{}{{{}}}", selector, rtl_body.concat()));
    }

    let name = format!(
        "{}{}{}",
        options.class_name_prefix,
        hash::hash(&ltr),
        NAME_SUFFIX
    );
    tracing::debug!("compiled keyframes {} ({} frames)", name, frames.len());

    let rule = InjectableStyle::new(
        KEYFRAMES_PRIORITY,
        format!("@keyframes {}{{{}}}", name, ltr),
        format!("@keyframes {}{{{}}}", name, rtl),
    );
    Ok((name, rule))
}

fn frame_values(
    property: &str,
    value: &StyleValue,
    options: NormalizeOptions,
) -> Result<Vec<String>> {
    let scalar = |item: &ScalarValue| match item {
        ScalarValue::Number(n) => normalize::number_to_value(property, *n, options),
        ScalarValue::String(s) => normalize::normalize_with(property, s, options),
    };
    match value {
        StyleValue::Number(n) => Ok(vec![scalar(&ScalarValue::Number(*n))]),
        StyleValue::String(s) => Ok(vec![normalize::normalize_with(property, s, options)]),
        StyleValue::Fallbacks(items) if !items.is_empty() => Ok(items.iter().map(scalar).collect()),
        _ => Err(StyleError::new(
            ERR_INVALID_VALUE,
            format!(
                "Keyframe values for `{}` must be literal strings, numbers or fallback lists.",
                property
            ),
        )
        .in_namespace("@keyframes")
        .for_property(property)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(pairs: &[(&str, &str, StyleValue)]) -> Keyframes {
        let mut frames = Keyframes::new();
        for (selector, property, value) in pairs {
            frames
                .entry(selector.to_string())
                .or_default()
                .insert(property.to_string(), value.clone());
        }
        frames
    }

    #[test]
    fn test_name_and_rule() {
        let options = StyleOptions::default();
        let (name, rule) = compile_keyframes(
            &frames(&[
                ("from", "opacity", StyleValue::Number(0.0)),
                ("to", "opacity", StyleValue::Number(1.0)),
            ]),
            &options,
        )
        .unwrap();
        assert!(name.starts_with('x'));
        assert!(name.ends_with("-B"));
        assert_eq!(
            rule.ltr,
            format!("@keyframes {}{{from{{opacity:0;}}to{{opacity:1;}}}}", name)
        );
        assert!(rule.rtl.is_none());
        assert_eq!(rule.priority, 0.0);
    }

    #[test]
    fn test_equivalent_spellings_share_a_name() {
        let options = StyleOptions::default();
        let (a, _) = compile_keyframes(
            &frames(&[("to", "transform", "translateX( 0px )".into())]),
            &options,
        )
        .unwrap();
        let (b, _) = compile_keyframes(
            &frames(&[("to", "transform", "translateX(0)".into())]),
            &options,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_directional_frames_get_rtl() {
        let (_, rule) = compile_keyframes(
            &frames(&[("from", "marginStart", "10px".into())]),
            &StyleOptions::default(),
        )
        .unwrap();
        assert!(rule.ltr.contains("margin-left:10px"));
        assert!(rule.rtl.as_deref().unwrap().contains("margin-right:10px"));
    }

    #[test]
    fn test_null_frame_value_is_rejected() {
        let err = compile_keyframes(
            &frames(&[("from", "opacity", StyleValue::Null)]),
            &StyleOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, ERR_INVALID_VALUE);
    }
}
