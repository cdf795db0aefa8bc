//! Style conditions
//!
//! A condition is `default`, a pseudo selector (`:hover`, `::before`) or an
//! at-rule (`@media (min-width:600px)`). Nested conditions are kept as a
//! path; the path is put in canonical order before it is hashed so the same
//! semantic combination always produces the same class name.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::priorities;
use crate::validate::{StyleError, ERR_INVALID_CONDITION};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Condition {
    Default,
    Pseudo(String),
    AtRule(String),
}

impl Condition {
    pub fn parse(raw: &str) -> Result<Self, StyleError> {
        let trimmed = raw.trim();
        if trimmed == "default" {
            return Ok(Condition::Default);
        }
        if trimmed.starts_with('@') {
            return Ok(Condition::AtRule(normalize_condition(trimmed)));
        }
        if trimmed.starts_with(':') {
            let pseudo = normalize_condition(trimmed);
            if priorities::is_known_pseudo(&pseudo) {
                return Ok(Condition::Pseudo(pseudo));
            }
            return Err(StyleError::new(
                ERR_INVALID_CONDITION,
                format!("Unknown pseudo selector `{}`.", trimmed),
            )
            .with_value(trimmed));
        }
        Err(StyleError::new(
            ERR_INVALID_CONDITION,
            format!(
                "Invalid condition `{}`: expected `default`, a pseudo selector or an at-rule.",
                trimmed
            ),
        )
        .with_value(trimmed))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Condition::Default => "default",
            Condition::Pseudo(s) | Condition::AtRule(s) => s,
        }
    }

    pub fn is_pseudo_element(&self) -> bool {
        matches!(self, Condition::Pseudo(s) if s.starts_with("::"))
    }

    pub fn is_pseudo_class(&self) -> bool {
        matches!(self, Condition::Pseudo(s) if !s.starts_with("::"))
    }

    pub fn is_at_rule(&self) -> bool {
        matches!(self, Condition::AtRule(_))
    }

    pub fn priority(&self) -> u32 {
        match self {
            Condition::Default => 0,
            Condition::Pseudo(s) | Condition::AtRule(s) => priorities::get_priority(s),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Condition {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Condition::parse(&value)
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        condition.as_str().to_string()
    }
}

/// Collapses whitespace and drops the optional spaces inside parentheses,
/// around commas and after colons, so `@media ( min-width: 600px )` equals
/// `@media (min-width:600px)` and `:is(:hover, :focus)` equals
/// `:is(:hover,:focus)`. Descendant spaces such as `:not(.a .b)` are kept.
fn normalize_condition(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let mut chars = collapsed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '(' | ':' | ',' => {
                out.push(c);
                while chars.peek() == Some(&' ') {
                    chars.next();
                }
            }
            ' ' if matches!(chars.peek(), Some(')') | Some(',')) => {}
            _ => out.push(c),
        }
    }
    out
}

/// Canonical order: at-rules (sorted), then pseudo-classes (sorted), then
/// pseudo-elements in declaration order. `default` entries and duplicates
/// are dropped.
pub fn canonical_path(path: &[Condition]) -> Vec<Condition> {
    let mut at_rules: Vec<Condition> = path.iter().filter(|c| c.is_at_rule()).cloned().collect();
    let mut pseudo_classes: Vec<Condition> =
        path.iter().filter(|c| c.is_pseudo_class()).cloned().collect();
    let mut pseudo_elements: Vec<Condition> = Vec::new();
    for c in path.iter().filter(|c| c.is_pseudo_element()) {
        if !pseudo_elements.contains(c) {
            pseudo_elements.push(c.clone());
        }
    }
    at_rules.sort();
    at_rules.dedup();
    pseudo_classes.sort();
    pseudo_classes.dedup();

    at_rules
        .into_iter()
        .chain(pseudo_classes)
        .chain(pseudo_elements)
        .collect()
}

/// Sum of the priorities of every condition on the path.
pub fn path_priority(path: &[Condition]) -> u32 {
    path.iter().map(Condition::priority).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(Condition::parse("default").unwrap(), Condition::Default);
        assert_eq!(
            Condition::parse(":hover").unwrap(),
            Condition::Pseudo(":hover".to_string())
        );
        assert!(Condition::parse("::before").unwrap().is_pseudo_element());
        assert!(Condition::parse("@supports (display:grid)").unwrap().is_at_rule());
    }

    #[test]
    fn test_invalid_conditions() {
        let err = Condition::parse("hover").unwrap_err();
        assert_eq!(err.code, ERR_INVALID_CONDITION);
        assert!(Condition::parse(":hovr").is_err());
    }

    #[test]
    fn test_at_rule_whitespace_is_canonical() {
        let a = Condition::parse("@media ( min-width: 600px )").unwrap();
        let b = Condition::parse("@media (min-width:600px)").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "@media (min-width:600px)");
    }

    #[test]
    fn test_functional_pseudo_whitespace_is_canonical() {
        let spaced = Condition::parse(":is(:hover, :focus)").unwrap();
        let tight = Condition::parse(":is(:hover,:focus)").unwrap();
        assert_eq!(spaced, tight);
        assert_eq!(spaced.as_str(), ":is(:hover,:focus)");
        assert_eq!(
            Condition::parse(":not( .a  .b )").unwrap().as_str(),
            ":not(.a .b)"
        );
    }

    #[test]
    fn test_canonical_path_orders_by_kind() {
        let path = vec![
            Condition::parse("::before").unwrap(),
            Condition::parse(":hover").unwrap(),
            Condition::Default,
            Condition::parse("@media (min-width:600px)").unwrap(),
        ];
        let canonical = canonical_path(&path);
        let names: Vec<&str> = canonical.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["@media (min-width:600px)", ":hover", "::before"]);
    }

    #[test]
    fn test_serde_uses_string_form() {
        let c: Condition = serde_json::from_str("\":focus\"").unwrap();
        assert_eq!(c, Condition::Pseudo(":focus".to_string()));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\":focus\"");
        assert!(serde_json::from_str::<Condition>("\"focus\"").is_err());
    }
}
