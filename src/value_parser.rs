//! CSS value tokenizer
//!
//! A deliberately small lexer for declaration values. It understands just
//! enough structure (function calls, parentheses, strings, commas and
//! whitespace) for normalization, linting, direction mirroring and shorthand
//! expansion. Anything else is an opaque word.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DIMENSION_RE: Regex =
        Regex::new(r"^([+-]?)(\d*\.?\d+(?:[eE][+-]?\d+)?)([a-zA-Z%]*)$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueToken {
    Space,
    Comma,
    /// Function name; the opening parenthesis is implied.
    Function(String),
    OpenParen,
    CloseParen,
    /// Quoted string including its quotes.
    Str(String),
    Word(String),
}

impl ValueToken {
    pub fn opens(&self) -> bool {
        matches!(self, ValueToken::Function(_) | ValueToken::OpenParen)
    }
}

pub fn tokenize(input: &str) -> Vec<ValueToken> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = input.chars().peekable();

    fn flush(word: &mut String, tokens: &mut Vec<ValueToken>) {
        if !word.is_empty() {
            tokens.push(ValueToken::Word(std::mem::take(word)));
        }
    }

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                flush(&mut word, &mut tokens);
                while chars.peek().is_some_and(|n| n.is_whitespace()) {
                    chars.next();
                }
                tokens.push(ValueToken::Space);
            }
            ',' => {
                flush(&mut word, &mut tokens);
                tokens.push(ValueToken::Comma);
            }
            '(' => {
                if word.is_empty() {
                    tokens.push(ValueToken::OpenParen);
                } else {
                    tokens.push(ValueToken::Function(std::mem::take(&mut word)));
                }
            }
            ')' => {
                flush(&mut word, &mut tokens);
                tokens.push(ValueToken::CloseParen);
            }
            '"' | '\'' => {
                flush(&mut word, &mut tokens);
                let mut text = String::from(c);
                while let Some(n) = chars.next() {
                    text.push(n);
                    if n == '\\' {
                        if let Some(escaped) = chars.next() {
                            text.push(escaped);
                        }
                        continue;
                    }
                    if n == c {
                        break;
                    }
                }
                tokens.push(ValueToken::Str(text));
            }
            '!' => {
                flush(&mut word, &mut tokens);
                word.push('!');
            }
            _ => word.push(c),
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

pub fn stringify(tokens: &[ValueToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            ValueToken::Space => out.push(' '),
            ValueToken::Comma => out.push(','),
            ValueToken::Function(name) => {
                out.push_str(name);
                out.push('(');
            }
            ValueToken::OpenParen => out.push('('),
            ValueToken::CloseParen => out.push(')'),
            ValueToken::Str(s) | ValueToken::Word(s) => out.push_str(s),
        }
    }
    out
}

/// True when a function call or parenthesis is never closed.
pub fn has_unclosed_function(tokens: &[ValueToken]) -> bool {
    let mut depth: i32 = 0;
    for token in tokens {
        if token.opens() {
            depth += 1;
        } else if *token == ValueToken::CloseParen && depth > 0 {
            depth -= 1;
        }
    }
    depth > 0
}

/// Splits a value on top-level whitespace (outside any parentheses).
pub fn split_top_level_spaces(value: &str) -> Vec<String> {
    split_top_level(value, &ValueToken::Space)
}

/// Splits a value on top-level commas (outside any parentheses).
pub fn split_top_level_commas(value: &str) -> Vec<String> {
    split_top_level(value, &ValueToken::Comma)
        .into_iter()
        .map(|part| part.trim().to_string())
        .collect()
}

fn split_top_level(value: &str, separator: &ValueToken) -> Vec<String> {
    let tokens = tokenize(value.trim());
    let mut parts = Vec::new();
    let mut current: Vec<ValueToken> = Vec::new();
    let mut depth = 0usize;

    for token in tokens {
        if token.opens() {
            depth += 1;
        } else if token == ValueToken::CloseParen {
            depth = depth.saturating_sub(1);
        }
        if depth == 0 && &token == separator {
            if !current.is_empty() {
                parts.push(stringify(&current));
                current.clear();
            }
            continue;
        }
        current.push(token);
    }
    if !current.is_empty() {
        parts.push(stringify(&current));
    }
    parts
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dimension<'a> {
    /// `""`, `"-"` or `"+"`.
    pub sign: &'a str,
    pub number: &'a str,
    pub unit: &'a str,
}

impl Dimension<'_> {
    pub fn is_negative(&self) -> bool {
        self.sign == "-"
    }

    pub fn value(&self) -> f64 {
        let n = self.number.parse::<f64>().unwrap_or(0.0);
        if self.is_negative() {
            -n
        } else {
            n
        }
    }
}

/// Parses `-0.5rem`, `10px`, `.25`, `50%` into sign, number and unit.
pub fn parse_dimension(word: &str) -> Option<Dimension<'_>> {
    let caps = DIMENSION_RE.captures(word)?;
    Some(Dimension {
        sign: caps.get(1).map_or("", |m| m.as_str()),
        number: caps.get(2)?.as_str(),
        unit: caps.get(3).map_or("", |m| m.as_str()),
    })
}

/// Formats a number the way canonical values are written: no trailing
/// zeros, no leading zero before the decimal point, at most four decimals.
pub fn format_number(n: f64) -> String {
    let rounded = (n * 10000.0).round() / 10000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let text = format!("{}", rounded);
    if let Some(rest) = text.strip_prefix("0.") {
        format!(".{}", rest)
    } else if let Some(rest) = text.strip_prefix("-0.") {
        format!("-.{}", rest)
    } else {
        text
    }
}
