//! Runtime merge engine
//!
//! Resolves an ordered, arbitrarily nested list of compiled style objects
//! into one class string. Inputs are flattened first; falsy entries are how
//! callers express conditional styles and are skipped. Each synthetic key
//! keeps the class of the last entry that set it, and `null` removes it.
//!
//! The output order depends only on the winning keys (sorted by key
//! priority, then class name), never on how the inputs were grouped, so
//! merging pre-merged results gives the same string as one flat merge.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ir::{FlatCompiledStyles, COMPILED_MARKER_KEY};
use crate::options::{StyleOptions, StyleResolution};
use crate::priorities;
use crate::validate::{Result, StyleError, ERR_NOT_COMPILED};

/// Key holding the inline custom property values of a dynamic style.
pub const INLINE_VARS_KEY: &str = "$$vars";

/// A compiled style plus the custom property values its dynamic classes
/// read at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRef {
    pub styles: FlatCompiledStyles,
    pub vars: IndexMap<String, Value>,
}

/// One merge argument.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleRef {
    /// `false`, `null`, `undefined`, `""` or `0`.
    Skip,
    Compiled(FlatCompiledStyles),
    Dynamic(DynamicRef),
    List(Vec<StyleRef>),
    /// Anything that is not compiler output.
    Invalid(Value),
}

impl StyleRef {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => StyleRef::Skip,
            Value::String(s) if s.is_empty() => StyleRef::Skip,
            Value::Number(n) if n.as_f64() == Some(0.0) => StyleRef::Skip,
            Value::Array(items) => StyleRef::List(items.iter().map(StyleRef::from_json).collect()),
            Value::Object(map) if map.contains_key(COMPILED_MARKER_KEY) => {
                let mut map = map.clone();
                let vars = map.remove(INLINE_VARS_KEY);
                let Ok(styles) = serde_json::from_value::<FlatCompiledStyles>(Value::Object(map))
                else {
                    return StyleRef::Invalid(value.clone());
                };
                match vars {
                    None => StyleRef::Compiled(styles),
                    Some(Value::Object(vars)) => StyleRef::Dynamic(DynamicRef {
                        styles,
                        vars: vars.into_iter().collect(),
                    }),
                    Some(_) => StyleRef::Invalid(value.clone()),
                }
            }
            other => StyleRef::Invalid(other.clone()),
        }
    }
}

impl From<FlatCompiledStyles> for StyleRef {
    fn from(styles: FlatCompiledStyles) -> Self {
        StyleRef::Compiled(styles)
    }
}

/// Depth-first, order-preserving walk over nested lists that yields only
/// the leaves.
pub struct Flatten<'a> {
    stack: Vec<std::slice::Iter<'a, StyleRef>>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a StyleRef;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(StyleRef::List(items)) => self.stack.push(items.iter()),
                Some(StyleRef::Skip) => {}
                Some(leaf) => return Some(leaf),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

pub fn flatten(refs: &[StyleRef]) -> Flatten<'_> {
    Flatten {
        stack: vec![refs.iter()],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOptions {
    pub resolution: StyleResolution,
    /// Fail on non-compiled arguments instead of skipping them.
    pub strict: bool,
    pub dev: bool,
}

impl From<&StyleOptions> for MergeOptions {
    fn from(options: &StyleOptions) -> Self {
        Self {
            resolution: options.style_resolution,
            strict: options.merge_is_strict(),
            dev: options.dev,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    pub class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<IndexMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_style_src: Option<String>,
}

/// A surviving class with its key already split, so resets and ordering
/// never re-parse the key.
#[derive(Debug, Clone, Copy)]
struct Winner<'a> {
    class: &'a str,
    priority: u32,
    conditions: &'a str,
    property: &'a str,
}

impl<'a> Winner<'a> {
    fn new(key: &'a str, class: &'a str) -> Self {
        let (conditions, property) = priorities::split_style_key(key);
        Self {
            class,
            priority: priorities::key_priority(key),
            conditions,
            property,
        }
    }
}

pub fn merge(refs: &[StyleRef], options: &MergeOptions) -> Result<MergeResult> {
    let mut winners: IndexMap<&str, Winner> = IndexMap::new();
    let mut style: IndexMap<String, Value> = IndexMap::new();
    let mut sources: Vec<&str> = Vec::new();

    for entry in flatten(refs) {
        let styles = match entry {
            StyleRef::Compiled(styles) => styles,
            StyleRef::Dynamic(dynamic) => {
                for (name, value) in &dynamic.vars {
                    style.insert(name.clone(), value.clone());
                }
                &dynamic.styles
            }
            StyleRef::Invalid(value) => {
                if options.strict {
                    return Err(StyleError::new(
                        ERR_NOT_COMPILED,
                        format!("merge received a value that is not compiled style: {}", value),
                    )
                    .with_hint("Pass objects produced by the style compiler, or a falsy value."));
                }
                tracing::warn!("merge skipped a value that is not compiled style: {}", value);
                continue;
            }
            StyleRef::Skip | StyleRef::List(_) => continue,
        };

        if let Some(source) = styles.marker.source() {
            if !sources.contains(&source) {
                sources.push(source);
            }
        }

        for (key, class) in &styles.classes {
            let Some(class) = class else {
                winners.shift_remove(key.as_str());
                continue;
            };
            let winner = Winner::new(key, class);
            if options.resolution == StyleResolution::ApplicationOrder {
                clear_longhands(&mut winners, &winner);
            }
            winners.shift_remove(key.as_str());
            winners.insert(key.as_str(), winner);
        }
    }

    winners.sort_unstable_by(|_, a, _, b| (a.priority, a.class).cmp(&(b.priority, b.class)));
    let mut class_name = String::new();
    let mut previous: Option<&str> = None;
    for winner in winners.values() {
        if previous == Some(winner.class) {
            continue;
        }
        if !class_name.is_empty() {
            class_name.push(' ');
        }
        class_name.push_str(winner.class);
        previous = Some(winner.class);
    }

    Ok(MergeResult {
        class_name,
        style: if style.is_empty() { None } else { Some(style) },
        data_style_src: if options.dev && !sources.is_empty() {
            Some(sources.join("; "))
        } else {
            None
        },
    })
}

/// Parses every argument and merges.
pub fn merge_json(args: &[Value], options: &MergeOptions) -> Result<MergeResult> {
    let refs: Vec<StyleRef> = args.iter().map(StyleRef::from_json).collect();
    merge(&refs, options)
}

/// A shorthand applied later resets the longhands accumulated under the
/// same conditions.
fn clear_longhands(winners: &mut IndexMap<&str, Winner>, shorthand: &Winner) {
    if !priorities::is_shorthand(shorthand.property) {
        return;
    }
    winners.retain(|_, existing| {
        existing.conditions != shorthand.conditions
            || !priorities::is_child_of(existing.property, shorthand.property)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts() -> MergeOptions {
        MergeOptions::default()
    }

    #[test]
    fn test_flatten_skips_falsy_and_preserves_order() {
        let refs = [
            StyleRef::from_json(&json!({ "$$css": true, "a": "x1" })),
            StyleRef::from_json(&json!([false, [null, { "$$css": true, "b": "x2" }], ""])),
            StyleRef::from_json(&json!(0)),
        ];
        let leaves: Vec<_> = flatten(&refs).collect();
        assert_eq!(leaves.len(), 2);
    }

    #[test]
    fn test_from_json_classifies() {
        assert_eq!(StyleRef::from_json(&json!(false)), StyleRef::Skip);
        assert!(matches!(StyleRef::from_json(&json!({ "color": "x1" })), StyleRef::Invalid(_)));
        assert!(matches!(StyleRef::from_json(&json!(true)), StyleRef::Invalid(_)));
        assert!(matches!(
            StyleRef::from_json(&json!({ "$$css": true, "color": 3 })),
            StyleRef::Invalid(_)
        ));
        assert!(matches!(
            StyleRef::from_json(&json!({ "$$css": true, "color": "x1", "$$vars": { "--v": "red" } })),
            StyleRef::Dynamic(_)
        ));
    }

    #[test]
    fn test_shorthand_clears_earlier_longhands_in_application_order() {
        let result = merge_json(
            &[
                json!({ "$$css": true, "margin-top": "xtop", ":hover_margin-top": "xhovertop" }),
                json!({ "$$css": true, "margin": "xmargin" }),
            ],
            &opts(),
        )
        .unwrap();
        assert_eq!(result.class_name, "xmargin xhovertop");
    }

    #[test]
    fn test_shorthand_only_clears_longhands_under_same_conditions() {
        let result = merge_json(
            &[
                json!({
                    "$$css": true,
                    "@media (min-width:600px)_padding-top": "xmq",
                    ":hover_padding-top": "xhov",
                }),
                json!({ "$$css": true, ":hover_padding": "xhovpad" }),
            ],
            &opts(),
        )
        .unwrap();
        assert_eq!(result.class_name, "xhovpad xmq");
    }

    #[test]
    fn test_custom_property_keys_with_underscores() {
        let result = merge_json(
            &[
                json!({ "$$css": true, ":hover_--my_var": "xa", "color": "xc" }),
                json!({ "$$css": true, "--my_var": "xb" }),
            ],
            &opts(),
        )
        .unwrap();
        assert_eq!(result.class_name, "xb xa xc");
    }

    #[test]
    fn test_repeated_class_appears_once() {
        let result = merge_json(
            &[json!({ "$$css": true, "color": "xsame", "fill": "xsame" })],
            &opts(),
        )
        .unwrap();
        assert_eq!(result.class_name, "xsame");
    }

    #[test]
    fn test_longhand_after_shorthand_is_kept() {
        let result = merge_json(
            &[
                json!({ "$$css": true, "margin": "xmargin" }),
                json!({ "$$css": true, "margin-top": "xtop" }),
            ],
            &opts(),
        )
        .unwrap();
        assert_eq!(result.class_name, "xmargin xtop");
    }

    #[test]
    fn test_property_specificity_keeps_longhands() {
        let options = MergeOptions {
            resolution: StyleResolution::PropertySpecificity,
            ..MergeOptions::default()
        };
        let result = merge_json(
            &[
                json!({ "$$css": true, "margin-top": "xtop" }),
                json!({ "$$css": true, "margin": "xmargin" }),
            ],
            &options,
        )
        .unwrap();
        assert_eq!(result.class_name, "xmargin xtop");
    }

    #[test]
    fn test_dynamic_vars_fill_style() {
        let result = merge_json(
            &[json!({ "$$css": true, "color": "xdyn", "$$vars": { "--xv": "red" } })],
            &opts(),
        )
        .unwrap();
        assert_eq!(result.class_name, "xdyn");
        assert_eq!(result.style.unwrap()["--xv"], json!("red"));
    }

    #[test]
    fn test_non_compiled_argument() {
        let lenient = merge_json(&[json!({ "color": "red" }), json!({ "$$css": true, "color": "x1" })], &opts())
            .unwrap();
        assert_eq!(lenient.class_name, "x1");

        let strict = MergeOptions {
            strict: true,
            ..MergeOptions::default()
        };
        let err = merge_json(&[json!({ "color": "red" })], &strict).unwrap_err();
        assert_eq!(err.code, ERR_NOT_COMPILED);
    }

    #[test]
    fn test_dev_sources() {
        let dev = MergeOptions {
            dev: true,
            ..MergeOptions::default()
        };
        let result = merge_json(
            &[
                json!({ "$$css": "button.js:root", "color": "x1" }),
                json!({ "$$css": "card.js:base", "display": "x2" }),
            ],
            &dev,
        )
        .unwrap();
        assert_eq!(result.data_style_src.as_deref(), Some("button.js:root; card.js:base"));
    }
}
