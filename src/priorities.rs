//! Priority table
//!
//! The single source of truth for rule ordering, shared by the compiler
//! (which stamps a priority on every emitted rule) and the runtime merge
//! engine (which orders winning classes and resolves shorthand/longhand
//! conflicts). Every emitted selector has the same minimal specificity, so
//! these numbers alone decide which rule wins.
//!
//! A rule's priority is the base priority of its property plus the sum of
//! the priorities of its conditions:
//!
//! | Kind                                   | Priority |
//! |----------------------------------------|----------|
//! | custom property (`--x`)                | 1        |
//! | `@supports` / other at-rules           | 30       |
//! | `@media`                               | 31       |
//! | `@container`                           | 32       |
//! | pseudo-class                           | table, default 40 |
//! | shorthand of shorthands (`margin`)     | 1000     |
//! | shorthand of longhands (`margin-block`)| 2000     |
//! | longhand                               | 3000     |
//! | physical longhand (`margin-left`)      | 4000     |
//! | pseudo-element                         | 5000     |

use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

use crate::condition::Condition;

pub const CUSTOM_PROPERTY_PRIORITY: u32 = 1;
pub const SUPPORTS_PRIORITY: u32 = 30;
pub const MEDIA_PRIORITY: u32 = 31;
pub const CONTAINER_PRIORITY: u32 = 32;
pub const DEFAULT_AT_RULE_PRIORITY: u32 = 30;
pub const DEFAULT_PSEUDO_CLASS_PRIORITY: u32 = 40;
pub const SHORTHAND_OF_SHORTHANDS_PRIORITY: u32 = 1000;
pub const SHORTHAND_OF_LONGHANDS_PRIORITY: u32 = 2000;
pub const LONGHAND_PRIORITY: u32 = 3000;
pub const PHYSICAL_LONGHAND_PRIORITY: u32 = 4000;
pub const PSEUDO_ELEMENT_PRIORITY: u32 = 5000;

/// Separator between conditions and the property in a synthetic style key.
pub const KEY_SEPARATOR: char = '_';

lazy_static! {
    static ref PSEUDO_CLASS_PRIORITIES: HashMap<&'static str, u32> = [
        (":is", 40), (":where", 40), (":not", 40), (":has", 45), (":dir", 50),
        (":lang", 51), (":first-child", 52), (":first-of-type", 53),
        (":last-child", 54), (":last-of-type", 55), (":only-child", 56),
        (":only-of-type", 57), (":nth-child", 60), (":nth-last-child", 61),
        (":nth-of-type", 62), (":nth-last-of-type", 63), (":empty", 70),
        (":link", 80), (":any-link", 81), (":local-link", 82),
        (":target-within", 83), (":target", 84), (":visited", 85),
        (":enabled", 91), (":disabled", 92), (":required", 93),
        (":optional", 94), (":read-only", 95), (":read-write", 96),
        (":placeholder-shown", 97), (":in-range", 98), (":out-of-range", 99),
        (":default", 100), (":checked", 101), (":indeterminate", 101),
        (":blank", 102), (":valid", 103), (":invalid", 104),
        (":user-invalid", 105), (":autofill", 110), (":picture-in-picture", 120),
        (":modal", 121), (":fullscreen", 122), (":paused", 123),
        (":playing", 124), (":current", 125), (":past", 126), (":future", 127),
        (":popover-open", 128), (":open", 129), (":hover", 130),
        (":focus-within", 140), (":focus", 150), (":focus-visible", 160),
        (":active", 170),
    ]
    .into_iter()
    .collect();

    static ref PSEUDO_ELEMENTS: HashSet<&'static str> = [
        "::before", "::after", "::first-line", "::first-letter", "::placeholder",
        "::selection", "::marker", "::backdrop", "::file-selector-button",
        "::cue", "::grammar-error", "::spelling-error", "::target-text",
        "::thumb", "::part", "::slotted", "::highlight", "::view-transition",
        "::view-transition-group", "::view-transition-image-pair",
        "::view-transition-old", "::view-transition-new", "::details-content",
        "::scroll-marker", "::scroll-button",
    ]
    .into_iter()
    .collect();

    /// Direct children of each shorthand, dashed.
    static ref SHORTHANDS: HashMap<&'static str, &'static [&'static str]> = {
        let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        m.insert("animation", &[
            "animation-name", "animation-duration", "animation-timing-function",
            "animation-delay", "animation-iteration-count", "animation-direction",
            "animation-fill-mode", "animation-play-state",
        ]);
        m.insert("background", &[
            "background-color", "background-image", "background-position",
            "background-size", "background-repeat", "background-origin",
            "background-clip", "background-attachment",
        ]);
        m.insert("background-position", &["background-position-x", "background-position-y"]);
        m.insert("border", &[
            "border-width", "border-style", "border-color", "border-top",
            "border-right", "border-bottom", "border-left", "border-block",
            "border-inline",
        ]);
        m.insert("border-width", &[
            "border-top-width", "border-right-width", "border-bottom-width", "border-left-width",
            "border-start-width", "border-end-width",
        ]);
        m.insert("border-style", &[
            "border-top-style", "border-right-style", "border-bottom-style", "border-left-style",
            "border-start-style", "border-end-style",
        ]);
        m.insert("border-color", &[
            "border-top-color", "border-right-color", "border-bottom-color", "border-left-color",
            "border-start-color", "border-end-color",
        ]);
        m.insert("border-top", &["border-top-width", "border-top-style", "border-top-color"]);
        m.insert("border-right", &["border-right-width", "border-right-style", "border-right-color"]);
        m.insert("border-bottom", &["border-bottom-width", "border-bottom-style", "border-bottom-color"]);
        m.insert("border-left", &["border-left-width", "border-left-style", "border-left-color"]);
        m.insert("border-block", &[
            "border-block-width", "border-block-style", "border-block-color",
            "border-block-start", "border-block-end",
        ]);
        m.insert("border-block-width", &["border-block-start-width", "border-block-end-width"]);
        m.insert("border-block-style", &["border-block-start-style", "border-block-end-style"]);
        m.insert("border-block-color", &["border-block-start-color", "border-block-end-color"]);
        m.insert("border-block-start", &[
            "border-block-start-width", "border-block-start-style", "border-block-start-color",
        ]);
        m.insert("border-block-end", &[
            "border-block-end-width", "border-block-end-style", "border-block-end-color",
        ]);
        m.insert("border-inline", &[
            "border-inline-width", "border-inline-style", "border-inline-color",
            "border-inline-start", "border-inline-end",
        ]);
        m.insert("border-inline-width", &["border-inline-start-width", "border-inline-end-width"]);
        m.insert("border-inline-style", &["border-inline-start-style", "border-inline-end-style"]);
        m.insert("border-inline-color", &["border-inline-start-color", "border-inline-end-color"]);
        m.insert("border-inline-start", &[
            "border-inline-start-width", "border-inline-start-style", "border-inline-start-color",
        ]);
        m.insert("border-inline-end", &[
            "border-inline-end-width", "border-inline-end-style", "border-inline-end-color",
        ]);
        m.insert("border-radius", &[
            "border-top-left-radius", "border-top-right-radius",
            "border-bottom-right-radius", "border-bottom-left-radius",
            "border-start-start-radius", "border-start-end-radius",
            "border-end-start-radius", "border-end-end-radius",
            "border-top-start-radius", "border-top-end-radius",
            "border-bottom-start-radius", "border-bottom-end-radius",
        ]);
        m.insert("columns", &["column-width", "column-count"]);
        m.insert("column-rule", &["column-rule-width", "column-rule-style", "column-rule-color"]);
        m.insert("contain-intrinsic-size", &["contain-intrinsic-width", "contain-intrinsic-height"]);
        m.insert("container", &["container-name", "container-type"]);
        m.insert("flex", &["flex-grow", "flex-shrink", "flex-basis"]);
        m.insert("flex-flow", &["flex-direction", "flex-wrap"]);
        m.insert("font", &[
            "font-style", "font-variant", "font-weight", "font-stretch",
            "font-size", "line-height", "font-family",
        ]);
        m.insert("gap", &["row-gap", "column-gap"]);
        m.insert("grid", &["grid-template", "grid-auto-rows", "grid-auto-columns", "grid-auto-flow"]);
        m.insert("grid-template", &["grid-template-rows", "grid-template-columns", "grid-template-areas"]);
        m.insert("grid-area", &["grid-row", "grid-column"]);
        m.insert("grid-row", &["grid-row-start", "grid-row-end"]);
        m.insert("grid-column", &["grid-column-start", "grid-column-end"]);
        m.insert("inset", &[
            "top", "right", "bottom", "left", "start", "end", "inset-inline", "inset-block",
        ]);
        m.insert("inset-inline", &["inset-inline-start", "inset-inline-end"]);
        m.insert("inset-block", &["inset-block-start", "inset-block-end"]);
        m.insert("list-style", &["list-style-type", "list-style-position", "list-style-image"]);
        m.insert("margin", &[
            "margin-top", "margin-right", "margin-bottom", "margin-left",
            "margin-inline", "margin-block", "margin-horizontal", "margin-vertical",
        ]);
        m.insert("margin-inline", &["margin-inline-start", "margin-inline-end"]);
        m.insert("margin-block", &["margin-block-start", "margin-block-end"]);
        m.insert("margin-horizontal", &["margin-start", "margin-end"]);
        m.insert("margin-vertical", &["margin-top", "margin-bottom"]);
        m.insert("mask", &[
            "mask-image", "mask-mode", "mask-position", "mask-size", "mask-repeat",
            "mask-origin", "mask-clip", "mask-composite",
        ]);
        m.insert("outline", &["outline-color", "outline-style", "outline-width"]);
        m.insert("overflow", &["overflow-x", "overflow-y"]);
        m.insert("overscroll-behavior", &["overscroll-behavior-x", "overscroll-behavior-y"]);
        m.insert("padding", &[
            "padding-top", "padding-right", "padding-bottom", "padding-left",
            "padding-inline", "padding-block", "padding-horizontal", "padding-vertical",
        ]);
        m.insert("padding-inline", &["padding-inline-start", "padding-inline-end"]);
        m.insert("padding-block", &["padding-block-start", "padding-block-end"]);
        m.insert("padding-horizontal", &["padding-start", "padding-end"]);
        m.insert("padding-vertical", &["padding-top", "padding-bottom"]);
        m.insert("place-content", &["align-content", "justify-content"]);
        m.insert("place-items", &["align-items", "justify-items"]);
        m.insert("place-self", &["align-self", "justify-self"]);
        m.insert("scroll-margin", &[
            "scroll-margin-top", "scroll-margin-right", "scroll-margin-bottom",
            "scroll-margin-left", "scroll-margin-inline", "scroll-margin-block",
        ]);
        m.insert("scroll-margin-inline", &["scroll-margin-inline-start", "scroll-margin-inline-end"]);
        m.insert("scroll-margin-block", &["scroll-margin-block-start", "scroll-margin-block-end"]);
        m.insert("scroll-padding", &[
            "scroll-padding-top", "scroll-padding-right", "scroll-padding-bottom",
            "scroll-padding-left", "scroll-padding-inline", "scroll-padding-block",
        ]);
        m.insert("scroll-padding-inline", &["scroll-padding-inline-start", "scroll-padding-inline-end"]);
        m.insert("scroll-padding-block", &["scroll-padding-block-start", "scroll-padding-block-end"]);
        m.insert("text-decoration", &[
            "text-decoration-line", "text-decoration-style", "text-decoration-color",
            "text-decoration-thickness",
        ]);
        m.insert("text-emphasis", &["text-emphasis-style", "text-emphasis-color"]);
        m.insert("transition", &[
            "transition-property", "transition-duration", "transition-timing-function",
            "transition-delay", "transition-behavior",
        ]);
        m
    };

    /// Longhands that have a logical (writing-mode relative) counterpart.
    static ref PHYSICAL_LONGHANDS: HashSet<&'static str> = [
        "margin-top", "margin-right", "margin-bottom", "margin-left",
        "padding-top", "padding-right", "padding-bottom", "padding-left",
        "top", "right", "bottom", "left", "width", "height", "min-width",
        "min-height", "max-width", "max-height", "overflow-x", "overflow-y",
        "border-top-width", "border-right-width", "border-bottom-width",
        "border-left-width", "border-top-style", "border-right-style",
        "border-bottom-style", "border-left-style", "border-top-color",
        "border-right-color", "border-bottom-color", "border-left-color",
        "border-top-left-radius", "border-top-right-radius",
        "border-bottom-right-radius", "border-bottom-left-radius",
        "scroll-margin-top", "scroll-margin-right", "scroll-margin-bottom",
        "scroll-margin-left", "scroll-padding-top", "scroll-padding-right",
        "scroll-padding-bottom", "scroll-padding-left",
        "overscroll-behavior-x", "overscroll-behavior-y",
        "contain-intrinsic-width", "contain-intrinsic-height",
    ]
    .into_iter()
    .collect();

    /// Shorthands whose space-separated components are per-side values.
    static ref MULTI_VALUE_BOX_SHORTHANDS: HashSet<&'static str> = [
        "margin", "padding", "inset", "border-width", "border-style",
        "border-color", "border-radius", "scroll-margin", "scroll-padding",
        "margin-inline", "margin-block", "padding-inline", "padding-block",
        "inset-inline", "inset-block", "gap", "overflow",
    ]
    .into_iter()
    .collect();
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

fn pseudo_base(pseudo: &str) -> &str {
    pseudo.split('(').next().unwrap_or(pseudo)
}

pub fn is_known_pseudo(pseudo: &str) -> bool {
    let base = pseudo_base(pseudo);
    if base.starts_with("::") {
        return PSEUDO_ELEMENTS.contains(base)
            || base.starts_with("::-webkit-")
            || base.starts_with("::-moz-");
    }
    PSEUDO_CLASS_PRIORITIES.contains_key(base)
        || base.starts_with(":-webkit-")
        || base.starts_with(":-moz-")
}

pub fn pseudo_class_priority(pseudo: &str) -> u32 {
    PSEUDO_CLASS_PRIORITIES
        .get(pseudo_base(pseudo))
        .copied()
        .unwrap_or(DEFAULT_PSEUDO_CLASS_PRIORITY)
}

/// Priority of a single condition string or dashed property name.
pub fn get_priority(key: &str) -> u32 {
    if key.starts_with("--") {
        return CUSTOM_PROPERTY_PRIORITY;
    }
    if key.starts_with('@') {
        return if key.starts_with("@supports") {
            SUPPORTS_PRIORITY
        } else if key.starts_with("@media") {
            MEDIA_PRIORITY
        } else if key.starts_with("@container") {
            CONTAINER_PRIORITY
        } else {
            DEFAULT_AT_RULE_PRIORITY
        };
    }
    if key.starts_with("::") {
        return PSEUDO_ELEMENT_PRIORITY;
    }
    if key.starts_with(':') {
        return pseudo_class_priority(key);
    }
    property_priority(key)
}

pub fn property_priority(property: &str) -> u32 {
    if property.starts_with("--") {
        return CUSTOM_PROPERTY_PRIORITY;
    }
    if let Some(children) = SHORTHANDS.get(property) {
        if children.iter().any(|child| SHORTHANDS.contains_key(child)) {
            return SHORTHAND_OF_SHORTHANDS_PRIORITY;
        }
        return SHORTHAND_OF_LONGHANDS_PRIORITY;
    }
    if PHYSICAL_LONGHANDS.contains(property) {
        return PHYSICAL_LONGHAND_PRIORITY;
    }
    LONGHAND_PRIORITY
}

pub fn is_shorthand(property: &str) -> bool {
    SHORTHANDS.contains_key(property)
}

pub fn is_multi_value_box_shorthand(property: &str) -> bool {
    MULTI_VALUE_BOX_SHORTHANDS.contains(property)
}

/// Every property a shorthand resets, transitively, in table order.
pub fn longhands_of(shorthand: &str) -> Vec<&'static str> {
    let mut out = Vec::new();
    let mut stack: Vec<&'static str> = match SHORTHANDS.get(shorthand) {
        Some(children) => children.iter().rev().copied().collect(),
        None => return out,
    };
    while let Some(next) = stack.pop() {
        if out.contains(&next) {
            continue;
        }
        out.push(next);
        if let Some(children) = SHORTHANDS.get(next) {
            stack.extend(children.iter().rev().copied());
        }
    }
    out
}

lazy_static! {
    /// Transitive closure of `SHORTHANDS`, built once.
    static ref RESETS: HashMap<&'static str, HashSet<&'static str>> = SHORTHANDS
        .keys()
        .map(|shorthand| (*shorthand, longhands_of(shorthand).into_iter().collect()))
        .collect();
}

/// True when setting `shorthand` resets `property`.
pub fn is_child_of(property: &str, shorthand: &str) -> bool {
    RESETS
        .get(shorthand)
        .map_or(false, |children| children.contains(property))
}

// ═══════════════════════════════════════════════════════════════════════════════
// SYNTHETIC STYLE KEYS
// ═══════════════════════════════════════════════════════════════════════════════

/// `["@media (min-width:600px)", ":hover"]` + `color` ->
/// `@media (min-width:600px)_:hover_color`.
pub fn style_key(path: &[Condition], property: &str) -> String {
    let mut key = String::new();
    for condition in path {
        if *condition == Condition::Default {
            continue;
        }
        key.push_str(condition.as_str());
        key.push(KEY_SEPARATOR);
    }
    key.push_str(property);
    key
}

/// Splits the leading condition off `rest`. A condition starts with `:` or
/// `@` and ends at the first separator outside parentheses.
fn split_condition(rest: &str) -> Option<(&str, &str)> {
    if !(rest.starts_with(':') || rest.starts_with('@')) {
        return None;
    }
    let mut depth = 0usize;
    for (i, b) in rest.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ if b as char == KEY_SEPARATOR && depth == 0 => {
                return Some((&rest[..i], &rest[i + 1..]));
            }
            _ => {}
        }
    }
    None
}

/// Condition strings of a synthetic key, outermost first.
#[derive(Debug, Clone)]
pub struct KeyConditions<'a> {
    rest: &'a str,
}

impl<'a> Iterator for KeyConditions<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let (condition, rest) = split_condition(self.rest)?;
        self.rest = rest;
        Some(condition)
    }
}

pub fn key_conditions(key: &str) -> KeyConditions<'_> {
    KeyConditions { rest: key }
}

/// Splits a synthetic key into its condition prefix and property without
/// allocating. Conditions are consumed from the left, so the property keeps
/// any separators of its own (`:hover_--my_var` -> `(":hover", "--my_var")`).
pub fn split_style_key(key: &str) -> (&str, &str) {
    let mut rest = key;
    while let Some((_, tail)) = split_condition(rest) {
        rest = tail;
    }
    let conditions = &key[..key.len() - rest.len()];
    (conditions.strip_suffix(KEY_SEPARATOR).unwrap_or(conditions), rest)
}

/// Priority of a synthetic key: property base plus its conditions.
pub fn key_priority(key: &str) -> u32 {
    let (_, property) = split_style_key(key);
    property_priority(property) + key_conditions(key).map(get_priority).sum::<u32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_priorities() {
        assert_eq!(get_priority("@supports (display:grid)"), 30);
        assert_eq!(get_priority("@media (min-width:600px)"), 31);
        assert_eq!(get_priority("@container (min-width:10px)"), 32);
        assert_eq!(get_priority("@starting-style"), 30);
        assert_eq!(get_priority("::before"), 5000);
        assert_eq!(get_priority(":hover"), 130);
        assert_eq!(get_priority(":nth-child(2n)"), 60);
        assert_eq!(get_priority("--brand"), 1);
    }

    #[test]
    fn test_property_priorities() {
        assert_eq!(property_priority("margin"), 1000);
        assert_eq!(property_priority("margin-block"), 2000);
        assert_eq!(property_priority("margin-block-start"), 3000);
        assert_eq!(property_priority("margin-top"), 4000);
        assert_eq!(property_priority("color"), 3000);
    }

    #[test]
    fn test_longhands_are_transitive() {
        let children = longhands_of("margin");
        assert!(children.contains(&"margin-top"));
        assert!(children.contains(&"margin-inline-start"));
        assert!(is_child_of("border-top-color", "border"));
        assert!(!is_child_of("color", "border"));
    }

    #[test]
    fn test_style_key_round_trip() {
        let path = vec![
            Condition::parse("@media (min-width:600px)").unwrap(),
            Condition::parse(":hover").unwrap(),
        ];
        let key = style_key(&path, "background-color");
        assert_eq!(key, "@media (min-width:600px)_:hover_background-color");
        let (conditions, property) = split_style_key(&key);
        assert_eq!(conditions, "@media (min-width:600px)_:hover");
        assert_eq!(property, "background-color");
        assert_eq!(
            key_conditions(&key).collect::<Vec<_>>(),
            vec!["@media (min-width:600px)", ":hover"]
        );
        assert_eq!(key_priority(&key), 3000 + 31 + 130);
    }

    #[test]
    fn test_plain_key_has_no_conditions() {
        let (conditions, property) = split_style_key("color");
        assert!(conditions.is_empty());
        assert_eq!(property, "color");
        assert_eq!(key_conditions("color").count(), 0);
        assert_eq!(key_priority("margin-left"), 4000);
    }

    #[test]
    fn test_custom_property_keeps_its_underscores() {
        assert_eq!(split_style_key(":hover_--my_var"), (":hover", "--my_var"));
        assert_eq!(key_priority(":hover_--my_var"), 1 + 130);
        assert_eq!(split_style_key("--my_var"), ("", "--my_var"));
        assert_eq!(key_priority("--my_var"), 1);
        assert_eq!(
            split_style_key("@media (min-width:600px)_--a_b_c"),
            ("@media (min-width:600px)", "--a_b_c")
        );
    }

    #[test]
    fn test_separator_inside_parentheses_stays_in_condition() {
        let key = ":is(.a_b,:hover)_color";
        assert_eq!(split_style_key(key), (":is(.a_b,:hover)", "color"));
        assert_eq!(key_priority(key), 3000 + 40);
    }

    #[test]
    fn test_reset_table_is_precomputed() {
        for shorthand in ["margin", "border", "inset", "grid", "font"] {
            for child in longhands_of(shorthand) {
                assert!(is_child_of(child, shorthand), "{} resets {}", shorthand, child);
            }
        }
        assert!(!is_child_of("margin", "margin"));
        assert!(!is_child_of("color", "not-a-shorthand"));
    }

    #[test]
    fn test_known_pseudos() {
        assert!(is_known_pseudo(":hover"));
        assert!(is_known_pseudo(":not(:first-child)"));
        assert!(is_known_pseudo("::-webkit-scrollbar"));
        assert!(is_known_pseudo("::thumb"));
        assert!(!is_known_pseudo(":hovering"));
    }
}
