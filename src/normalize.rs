//! Value normalizer
//!
//! Canonicalizes a declaration value so that equivalent spellings hash to
//! the same class name. The stages run in a fixed order over one token
//! stream:
//!
//! 1. whitespace: collapse, trim, drop spaces around commas and inside
//!    parentheses (spaces around `+`/`-` inside `calc()` are words and stay)
//! 2. zero dimensions: `0px` -> `0`, angles -> `0deg`, durations -> `0s`
//! 3. leading zeros: `0.5` -> `.5`
//! 4. empty strings: `''` -> `""`
//! 5. durations: `500ms` -> `.5s` (below `10ms` is left alone)
//! 6. optional `font-size` px -> rem
//!
//! Normalization never fails and is idempotent; fragments it does not
//! understand pass through unchanged.

use crate::options::StyleOptions;
use crate::properties;
use crate::value_parser::{self, format_number, parse_dimension, ValueToken};

const ANGLE_UNITS: &[&str] = &["deg", "grad", "rad", "turn"];
const TIME_UNITS: &[&str] = &["s", "ms"];
/// Functions whose arguments must keep their units, e.g. `calc(0px + 1em)`.
const MATH_FUNCTIONS: &[&str] = &["calc", "min", "max", "clamp"];
const ROOT_FONT_SIZE_PX: f64 = 16.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub font_size_px_to_rem: bool,
}

impl From<&StyleOptions> for NormalizeOptions {
    fn from(options: &StyleOptions) -> Self {
        Self {
            font_size_px_to_rem: options.enable_font_size_px_to_rem,
        }
    }
}

/// Normalizes with default options.
pub fn normalize(property: &str, raw: &str) -> String {
    normalize_with(property, raw, NormalizeOptions::default())
}

pub fn normalize_with(property: &str, raw: &str, options: NormalizeOptions) -> String {
    let tokens = value_parser::tokenize(raw);
    let tokens = collapse_whitespace(tokens);
    let tokens = if properties::is_custom_property(property) {
        tokens
    } else {
        strip_zero_units(tokens)
    };
    let tokens = map_words(tokens, strip_leading_zero);
    let tokens = tokens.into_iter().map(normalize_empty_string).collect();
    let tokens = map_words(tokens, milliseconds_to_seconds);
    let tokens = if options.font_size_px_to_rem && property == "font-size" {
        map_words(tokens, px_to_rem)
    } else {
        tokens
    };
    value_parser::stringify(&tokens)
}

/// Converts a numeric value to its CSS string: unitless properties keep
/// the bare number, everything else is a px length (or rem for font sizes
/// when enabled).
pub fn number_to_value(property: &str, n: f64, options: NormalizeOptions) -> String {
    if properties::is_unitless(property) || n == 0.0 {
        return format_number(n);
    }
    if options.font_size_px_to_rem && property == "font-size" {
        return format!("{}rem", format_number(n / ROOT_FONT_SIZE_PX));
    }
    format!("{}px", format_number(n))
}

// ═══════════════════════════════════════════════════════════════════════════════
// STAGES
// ═══════════════════════════════════════════════════════════════════════════════

fn collapse_whitespace(tokens: Vec<ValueToken>) -> Vec<ValueToken> {
    let mut out: Vec<ValueToken> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        if token == ValueToken::Space {
            let after_opener = match out.last() {
                None => true,
                Some(prev) => prev.opens() || *prev == ValueToken::Comma,
            };
            let before_closer = match iter.peek() {
                None => true,
                Some(ValueToken::CloseParen) | Some(ValueToken::Comma) => true,
                Some(ValueToken::Word(w)) => w.starts_with('!'),
                Some(_) => false,
            };
            if after_opener || before_closer || out.last() == Some(&ValueToken::Space) {
                continue;
            }
        }
        out.push(token);
    }
    out
}

fn strip_zero_units(tokens: Vec<ValueToken>) -> Vec<ValueToken> {
    let mut math_depth: Vec<bool> = Vec::new();
    tokens
        .into_iter()
        .map(|token| {
            match &token {
                ValueToken::Function(name) => {
                    math_depth.push(MATH_FUNCTIONS.contains(&name.to_ascii_lowercase().as_str()));
                }
                ValueToken::OpenParen => math_depth.push(false),
                ValueToken::CloseParen => {
                    math_depth.pop();
                }
                ValueToken::Word(word) if !math_depth.iter().any(|m| *m) => {
                    if let Some(zero) = zero_dimension(word) {
                        return ValueToken::Word(zero);
                    }
                }
                _ => {}
            }
            token
        })
        .collect()
}

fn zero_dimension(word: &str) -> Option<String> {
    let dim = parse_dimension(word)?;
    if dim.value() != 0.0 {
        return None;
    }
    let unit = dim.unit.to_ascii_lowercase();
    let canonical = if ANGLE_UNITS.contains(&unit.as_str()) {
        "0deg"
    } else if TIME_UNITS.contains(&unit.as_str()) {
        "0s"
    } else if unit == "fr" {
        "0fr"
    } else if unit == "%" {
        "0%"
    } else {
        "0"
    };
    Some(canonical.to_string())
}

fn map_words(tokens: Vec<ValueToken>, f: fn(&str) -> Option<String>) -> Vec<ValueToken> {
    tokens
        .into_iter()
        .map(|token| match &token {
            ValueToken::Word(word) => f(word).map(ValueToken::Word).unwrap_or(token),
            _ => token,
        })
        .collect()
}

fn strip_leading_zero(word: &str) -> Option<String> {
    let dim = parse_dimension(word)?;
    let fraction = dim.number.strip_prefix("0.")?;
    if fraction.is_empty() {
        return None;
    }
    Some(format!("{}.{}{}", dim.sign, fraction, dim.unit))
}

fn normalize_empty_string(token: ValueToken) -> ValueToken {
    match token {
        ValueToken::Str(s) if s == "''" => ValueToken::Str("\"\"".to_string()),
        other => other,
    }
}

fn milliseconds_to_seconds(word: &str) -> Option<String> {
    let dim = parse_dimension(word)?;
    if !dim.unit.eq_ignore_ascii_case("ms") {
        return None;
    }
    let ms = dim.value();
    if ms.abs() < 10.0 {
        return None;
    }
    Some(format!("{}s", format_number(ms / 1000.0)))
}

fn px_to_rem(word: &str) -> Option<String> {
    let dim = parse_dimension(word)?;
    if !dim.unit.eq_ignore_ascii_case("px") {
        return None;
    }
    Some(format!("{}rem", format_number(dim.value() / ROOT_FONT_SIZE_PX)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_in_functions() {
        assert_eq!(normalize("color", "rgba( 1, 222, 33 , 0.5)"), "rgba(1,222,33,.5)");
    }

    #[test]
    fn test_zero_dimensions_and_important() {
        assert_eq!(
            normalize("margin", "0px 1px 0.5rem -1pt !important"),
            "0 1px .5rem -1pt!important"
        );
    }

    #[test]
    fn test_calc_keeps_operator_spaces() {
        assert_eq!(normalize("width", "calc( 100% - 10px )"), "calc(100% - 10px)");
        assert_eq!(normalize("width", "calc(0px + 1em)"), "calc(0px + 1em)");
    }

    #[test]
    fn test_zero_angles_and_durations() {
        assert_eq!(normalize("transform", "rotate(0rad)"), "rotate(0deg)");
        assert_eq!(normalize("transition-duration", "0ms"), "0s");
        assert_eq!(normalize("flex-basis", "0%"), "0%");
        assert_eq!(normalize("grid-template-columns", "0fr 1fr"), "0fr 1fr");
    }

    #[test]
    fn test_empty_string_quotes() {
        assert_eq!(normalize("content", "''"), "\"\"");
        assert_eq!(normalize("content", "'a'"), "'a'");
    }

    #[test]
    fn test_milliseconds() {
        assert_eq!(normalize("transition-duration", "500ms"), ".5s");
        assert_eq!(normalize("transition-duration", "1500ms"), "1.5s");
        assert_eq!(normalize("transition-duration", "10ms"), ".01s");
        assert_eq!(normalize("transition-duration", "5ms"), "5ms");
    }

    #[test]
    fn test_font_size_px_to_rem() {
        let options = NormalizeOptions {
            font_size_px_to_rem: true,
        };
        assert_eq!(normalize_with("font-size", "24px", options), "1.5rem");
        assert_eq!(normalize_with("font-size", "12px", options), ".75rem");
        assert_eq!(normalize_with("width", "24px", options), "24px");
        assert_eq!(normalize("font-size", "24px"), "24px");
    }

    #[test]
    fn test_custom_properties_keep_zero_units() {
        assert_eq!(normalize("--gutter", "0px"), "0px");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            ("color", "rgba( 1, 222, 33 , 0.5)"),
            ("margin", "0px 1px 0.5rem -1pt !important"),
            ("transition", "opacity 500ms ease-in-out, transform 0.25s"),
            ("content", "''"),
            ("width", "calc( 100% - 0.5px )"),
            ("font-family", "\"Helvetica Neue\" , Arial"),
        ];
        for (property, raw) in samples {
            let once = normalize(property, raw);
            assert_eq!(normalize(property, &once), once, "not idempotent for {}", raw);
        }
    }

    #[test]
    fn test_unparseable_passes_through() {
        assert_eq!(normalize("color", "#FFF"), "#FFF");
        assert_eq!(normalize("grid-template-areas", "\"a b\""), "\"a b\"");
    }

    #[test]
    fn test_number_to_value() {
        let options = NormalizeOptions::default();
        assert_eq!(number_to_value("width", 10.0, options), "10px");
        assert_eq!(number_to_value("opacity", 0.5, options), ".5");
        assert_eq!(number_to_value("margin", 0.0, options), "0");
        let rem = NormalizeOptions {
            font_size_px_to_rem: true,
        };
        assert_eq!(number_to_value("font-size", 8.0, rem), ".5rem");
    }
}
