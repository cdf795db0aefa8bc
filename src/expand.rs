//! Shorthand expansion for `legacy-expand-shorthands` resolution.
//!
//! Box shorthands are split into their per-side longhands at compile time
//! so the merge engine only ever sees longhands. Start/end sides use the
//! legacy logical names, which direction mirroring later lowers to physical
//! sides. Shorthands whose components cannot be split positionally (`font`,
//! `background`, `border`) and values that read custom properties are left
//! alone.

use crate::value_parser;

type Sides = [&'static str; 4];

const MARGIN: Sides = ["margin-top", "margin-end", "margin-bottom", "margin-start"];
const PADDING: Sides = ["padding-top", "padding-end", "padding-bottom", "padding-start"];
const INSET: Sides = ["top", "end", "bottom", "start"];
const BORDER_WIDTH: Sides = [
    "border-top-width", "border-end-width", "border-bottom-width", "border-start-width",
];
const BORDER_STYLE: Sides = [
    "border-top-style", "border-end-style", "border-bottom-style", "border-start-style",
];
const BORDER_COLOR: Sides = [
    "border-top-color", "border-end-color", "border-bottom-color", "border-start-color",
];
const BORDER_RADIUS: Sides = [
    "border-top-start-radius", "border-top-end-radius",
    "border-bottom-end-radius", "border-bottom-start-radius",
];
const SCROLL_MARGIN: Sides = [
    "scroll-margin-top", "scroll-margin-right", "scroll-margin-bottom", "scroll-margin-left",
];
const SCROLL_PADDING: Sides = [
    "scroll-padding-top", "scroll-padding-right", "scroll-padding-bottom", "scroll-padding-left",
];

/// Longhand names a shorthand expands into, in emission order. Empty when
/// the property is not expanded.
pub fn expanded_properties(property: &str) -> Vec<&'static str> {
    if let Some(sides) = box_sides(property) {
        return sides.to_vec();
    }
    match pair(property) {
        Some((a, b)) => vec![a, b],
        None => vec![],
    }
}

/// Expands `(property, canonical value)`; returns `None` when the
/// declaration must stay as written.
pub fn expand(property: &str, value: &str) -> Option<Vec<(&'static str, String)>> {
    if value.contains("var(") || value.contains('/') {
        return None;
    }
    let parts = value_parser::split_top_level_spaces(value);
    if parts.is_empty() {
        return None;
    }

    if let Some(sides) = box_sides(property) {
        let [top, end, bottom, start] = if property == "border-radius" {
            corner_values(&parts)?
        } else {
            side_values(&parts)?
        };
        return Some(vec![
            (sides[0], top),
            (sides[1], end),
            (sides[2], bottom),
            (sides[3], start),
        ]);
    }

    let (first, second) = pair(property)?;
    let (a, b) = match parts.as_slice() {
        [a] => (a.clone(), a.clone()),
        [a, b] => (a.clone(), b.clone()),
        _ => return None,
    };
    Some(vec![(first, a), (second, b)])
}

fn box_sides(property: &str) -> Option<Sides> {
    Some(match property {
        "margin" => MARGIN,
        "padding" => PADDING,
        "inset" => INSET,
        "border-width" => BORDER_WIDTH,
        "border-style" => BORDER_STYLE,
        "border-color" => BORDER_COLOR,
        "border-radius" => BORDER_RADIUS,
        "scroll-margin" => SCROLL_MARGIN,
        "scroll-padding" => SCROLL_PADDING,
        _ => return None,
    })
}

fn pair(property: &str) -> Option<(&'static str, &'static str)> {
    Some(match property {
        "margin-horizontal" => ("margin-start", "margin-end"),
        "margin-vertical" => ("margin-top", "margin-bottom"),
        "padding-horizontal" => ("padding-start", "padding-end"),
        "padding-vertical" => ("padding-top", "padding-bottom"),
        "margin-inline" => ("margin-inline-start", "margin-inline-end"),
        "margin-block" => ("margin-block-start", "margin-block-end"),
        "padding-inline" => ("padding-inline-start", "padding-inline-end"),
        "padding-block" => ("padding-block-start", "padding-block-end"),
        "inset-inline" => ("inset-inline-start", "inset-inline-end"),
        "inset-block" => ("inset-block-start", "inset-block-end"),
        "gap" => ("row-gap", "column-gap"),
        "overflow" => ("overflow-x", "overflow-y"),
        _ => return None,
    })
}

/// CSS positional rules for `top right bottom left`.
fn side_values(parts: &[String]) -> Option<[String; 4]> {
    Some(match parts {
        [a] => [a.clone(), a.clone(), a.clone(), a.clone()],
        [a, b] => [a.clone(), b.clone(), a.clone(), b.clone()],
        [a, b, c] => [a.clone(), b.clone(), c.clone(), b.clone()],
        [a, b, c, d] => [a.clone(), b.clone(), c.clone(), d.clone()],
        _ => return None,
    })
}

/// CSS positional rules for `top-left top-right bottom-right bottom-left`.
fn corner_values(parts: &[String]) -> Option<[String; 4]> {
    Some(match parts {
        [a] => [a.clone(), a.clone(), a.clone(), a.clone()],
        [a, b] => [a.clone(), b.clone(), a.clone(), b.clone()],
        [a, b, c] => [a.clone(), b.clone(), c.clone(), b.clone()],
        [a, b, c, d] => [a.clone(), b.clone(), c.clone(), d.clone()],
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_two_values() {
        let expanded = expand("margin", "1px 2px").unwrap();
        assert_eq!(
            expanded,
            vec![
                ("margin-top", "1px".to_string()),
                ("margin-end", "2px".to_string()),
                ("margin-bottom", "1px".to_string()),
                ("margin-start", "2px".to_string()),
            ]
        );
    }

    #[test]
    fn test_border_radius_three_values() {
        let expanded = expand("border-radius", "1px 2px 3px").unwrap();
        assert_eq!(expanded[2], ("border-bottom-end-radius", "3px".to_string()));
        assert_eq!(expanded[3], ("border-bottom-start-radius", "2px".to_string()));
    }

    #[test]
    fn test_pairs() {
        assert_eq!(
            expand("gap", "4px").unwrap(),
            vec![("row-gap", "4px".to_string()), ("column-gap", "4px".to_string())]
        );
        assert_eq!(
            expand("overflow", "hidden auto").unwrap(),
            vec![
                ("overflow-x", "hidden".to_string()),
                ("overflow-y", "auto".to_string())
            ]
        );
    }

    #[test]
    fn test_unexpandable_values() {
        assert!(expand("margin", "var(--space)").is_none());
        assert!(expand("border-radius", "1px/2px").is_none());
        assert!(expand("font", "12px serif").is_none());
        assert!(expand("margin", "1px 2px 3px 4px 5px").is_none());
    }

    #[test]
    fn test_expanded_properties() {
        assert_eq!(expanded_properties("padding").len(), 4);
        assert_eq!(expanded_properties("gap"), vec!["row-gap", "column-gap"]);
        assert!(expanded_properties("color").is_empty());
    }
}
