//! Writing-direction mirroring
//!
//! Lowers one logical declaration into the physical declaration used for
//! left-to-right documents and the one used for right-to-left documents.
//!
//! Legacy logical names (`margin-start`, `border-top-end-radius`, `end`)
//! and logical keywords (`float: start`, `text-align: end`) resolve to a
//! physical side. Values that CSS has no logical spelling for are flipped
//! for RTL: `background-position` sides, `cursor` resize directions, shadow
//! x-offsets, and positional box shorthands (`border-radius`, four-value
//! `margin`/`padding`).

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::value_parser::{self, parse_dimension};

lazy_static! {
    /// Logical property -> (LTR physical, RTL physical).
    static ref LOGICAL_PROPERTIES: HashMap<&'static str, (&'static str, &'static str)> = [
        ("margin-start", ("margin-left", "margin-right")),
        ("margin-end", ("margin-right", "margin-left")),
        ("padding-start", ("padding-left", "padding-right")),
        ("padding-end", ("padding-right", "padding-left")),
        ("border-start", ("border-left", "border-right")),
        ("border-end", ("border-right", "border-left")),
        ("border-start-width", ("border-left-width", "border-right-width")),
        ("border-end-width", ("border-right-width", "border-left-width")),
        ("border-start-style", ("border-left-style", "border-right-style")),
        ("border-end-style", ("border-right-style", "border-left-style")),
        ("border-start-color", ("border-left-color", "border-right-color")),
        ("border-end-color", ("border-right-color", "border-left-color")),
        ("border-top-start-radius", ("border-top-left-radius", "border-top-right-radius")),
        ("border-top-end-radius", ("border-top-right-radius", "border-top-left-radius")),
        ("border-bottom-start-radius", ("border-bottom-left-radius", "border-bottom-right-radius")),
        ("border-bottom-end-radius", ("border-bottom-right-radius", "border-bottom-left-radius")),
        ("start", ("left", "right")),
        ("end", ("right", "left")),
        ("margin-horizontal", ("margin-inline", "margin-inline")),
        ("margin-vertical", ("margin-block", "margin-block")),
        ("padding-horizontal", ("padding-inline", "padding-inline")),
        ("padding-vertical", ("padding-block", "padding-block")),
    ]
    .into_iter()
    .collect();

    static ref CURSOR_FLIPS: HashMap<&'static str, &'static str> = [
        ("e-resize", "w-resize"),
        ("w-resize", "e-resize"),
        ("ne-resize", "nw-resize"),
        ("nw-resize", "ne-resize"),
        ("se-resize", "sw-resize"),
        ("sw-resize", "se-resize"),
        ("nesw-resize", "nwse-resize"),
        ("nwse-resize", "nesw-resize"),
    ]
    .into_iter()
    .collect();
}

const LOGICAL_KEYWORD_PROPERTIES: &[&str] = &["float", "clear", "text-align"];
const FOUR_SIDED_SHORTHANDS: &[&str] = &[
    "margin", "padding", "inset", "border-width", "border-style", "border-color",
    "scroll-margin", "scroll-padding",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Physical `(property, value)` for the given direction.
pub fn generate(property: &str, value: &str, direction: Direction) -> (String, String) {
    let property_out = match LOGICAL_PROPERTIES.get(property) {
        Some((ltr, rtl)) => match direction {
            Direction::Ltr => *ltr,
            Direction::Rtl => *rtl,
        },
        None => property,
    };
    (property_out.to_string(), mirror_value(property, value, direction))
}

pub fn generate_ltr(property: &str, value: &str) -> (String, String) {
    generate(property, value, Direction::Ltr)
}

pub fn generate_rtl(property: &str, value: &str) -> (String, String) {
    generate(property, value, Direction::Rtl)
}

fn mirror_value(property: &str, value: &str, direction: Direction) -> String {
    if LOGICAL_KEYWORD_PROPERTIES.contains(&property) {
        return resolve_logical_keyword(value, direction);
    }
    match property {
        "background-position" | "background-position-x" => {
            map_words(value, |word| background_side(word, direction))
        }
        "cursor" if direction == Direction::Rtl => {
            map_words(value, |word| CURSOR_FLIPS.get(word).map(|w| w.to_string()))
        }
        "box-shadow" | "text-shadow" if direction == Direction::Rtl => flip_shadow(value),
        "border-radius" if direction == Direction::Rtl => flip_border_radius(value),
        p if FOUR_SIDED_SHORTHANDS.contains(&p) && direction == Direction::Rtl => {
            flip_four_sided(value)
        }
        _ => value.to_string(),
    }
}

fn resolve_logical_keyword(value: &str, direction: Direction) -> String {
    let (start, end) = match direction {
        Direction::Ltr => ("left", "right"),
        Direction::Rtl => ("right", "left"),
    };
    match value {
        "start" | "inline-start" => start.to_string(),
        "end" | "inline-end" => end.to_string(),
        other => other.to_string(),
    }
}

fn background_side(word: &str, direction: Direction) -> Option<String> {
    let physical = match (word, direction) {
        ("start", Direction::Ltr) | ("end", Direction::Rtl) | ("right", Direction::Rtl) => "left",
        ("end", Direction::Ltr) | ("start", Direction::Rtl) | ("left", Direction::Rtl) => "right",
        _ => return None,
    };
    Some(physical.to_string())
}

fn map_words(value: &str, f: impl Fn(&str) -> Option<String>) -> String {
    let tokens = value_parser::tokenize(value)
        .into_iter()
        .map(|token| match &token {
            value_parser::ValueToken::Word(word) => {
                f(word).map(value_parser::ValueToken::Word).unwrap_or(token)
            }
            _ => token,
        })
        .collect::<Vec<_>>();
    value_parser::stringify(&tokens)
}

fn negate_length(word: &str) -> String {
    match parse_dimension(word) {
        Some(dim) if dim.value() == 0.0 => word.to_string(),
        Some(dim) if dim.is_negative() => format!("{}{}", dim.number, dim.unit),
        Some(dim) => format!("-{}{}", dim.number, dim.unit),
        None => word.to_string(),
    }
}

fn flip_shadow(value: &str) -> String {
    value_parser::split_top_level_commas(value)
        .iter()
        .map(|shadow| {
            let mut flipped = false;
            value_parser::split_top_level_spaces(shadow)
                .into_iter()
                .map(|part| {
                    if !flipped && parse_dimension(&part).is_some() {
                        flipped = true;
                        negate_length(&part)
                    } else {
                        part
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn flip_border_radius(value: &str) -> String {
    value
        .split('/')
        .map(|side| {
            let parts = value_parser::split_top_level_spaces(side);
            let flipped: Vec<&str> = match parts.as_slice() {
                [a, b] => vec![b.as_str(), a.as_str()],
                [a, b, c] => vec![b.as_str(), a.as_str(), b.as_str(), c.as_str()],
                [a, b, c, d] => vec![b.as_str(), a.as_str(), d.as_str(), c.as_str()],
                _ => return side.trim().to_string(),
            };
            flipped.join(" ")
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn flip_four_sided(value: &str) -> String {
    let parts = value_parser::split_top_level_spaces(value);
    match parts.as_slice() {
        [top, right, bottom, left] => format!("{} {} {} {}", top, left, bottom, right),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_start() {
        assert_eq!(generate_ltr("float", "start"), ("float".into(), "left".into()));
        assert_eq!(generate_rtl("float", "start"), ("float".into(), "right".into()));
        assert_eq!(generate_rtl("float", "left"), ("float".into(), "left".into()));
    }

    #[test]
    fn test_logical_property_names() {
        assert_eq!(generate_ltr("margin-start", "4px").0, "margin-left");
        assert_eq!(generate_rtl("margin-start", "4px").0, "margin-right");
        assert_eq!(generate_rtl("border-top-end-radius", "2px").0, "border-top-left-radius");
        assert_eq!(generate_rtl("end", "0").0, "left");
    }

    #[test]
    fn test_text_align() {
        assert_eq!(generate_ltr("text-align", "end").1, "right");
        assert_eq!(generate_rtl("text-align", "end").1, "left");
        assert_eq!(generate_rtl("text-align", "center").1, "center");
    }

    #[test]
    fn test_background_position() {
        assert_eq!(generate_ltr("background-position", "start top").1, "left top");
        assert_eq!(generate_rtl("background-position", "left top").1, "right top");
        assert_eq!(generate_rtl("background-position", "center").1, "center");
    }

    #[test]
    fn test_cursor() {
        assert_eq!(generate_rtl("cursor", "e-resize").1, "w-resize");
        assert_eq!(generate_ltr("cursor", "e-resize").1, "e-resize");
        assert_eq!(generate_rtl("cursor", "pointer").1, "pointer");
    }

    #[test]
    fn test_shadows() {
        assert_eq!(
            generate_rtl("box-shadow", "1px 2px 3px red,inset -4px 0 blue").1,
            "-1px 2px 3px red,inset 4px 0 blue"
        );
        assert_eq!(generate_rtl("text-shadow", "0 1px red").1, "0 1px red");
    }

    #[test]
    fn test_border_radius() {
        assert_eq!(generate_rtl("border-radius", "1px 2px").1, "2px 1px");
        assert_eq!(generate_rtl("border-radius", "1px 2px 3px").1, "2px 1px 2px 3px");
        assert_eq!(generate_rtl("border-radius", "1px 2px 3px 4px").1, "2px 1px 4px 3px");
        assert_eq!(generate_rtl("border-radius", "5px").1, "5px");
        assert_eq!(
            generate_rtl("border-radius", "1px 2px/3px 4px").1,
            "2px 1px/4px 3px"
        );
    }

    #[test]
    fn test_four_sided() {
        assert_eq!(generate_rtl("margin", "1px 2px 3px 4px").1, "1px 4px 3px 2px");
        assert_eq!(generate_rtl("margin", "1px 2px").1, "1px 2px");
    }

    #[test]
    fn test_direction_insensitive() {
        assert_eq!(generate_ltr("color", "red"), generate_rtl("color", "red"));
    }
}
