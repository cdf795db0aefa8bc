//! Token groups and themes
//!
//! A token group compiles every token into a custom property on `:root`.
//! Property names are hashed from the group's export identity and the token
//! key, so other files can reference a token without recompiling the group.
//! A theme re-assigns a subset of a group's custom properties under a
//! generated class.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::condition::{self, Condition};
use crate::hash;
use crate::ir::{CompiledMarker, FlatCompiledStyles, InjectableStyle, Injectables, StyleValue};
use crate::normalize::{self, NormalizeOptions};
use crate::options::StyleOptions;
use crate::validate::{
    self, Result, StyleError, ERR_INVALID_TOKEN_CONDITION, ERR_INVALID_VALUE, ERR_UNKNOWN_TOKEN,
};

const VARS_PRIORITY: f64 = 0.0;
const CONDITIONAL_VARS_PRIORITY: f64 = 0.1;
const THEME_PRIORITY: f64 = 0.5;
const CONDITIONAL_THEME_PRIORITY: f64 = 0.6;

/// A token value, possibly varying by at-rule:
/// `{ "default": "white", "@media (prefers-color-scheme: dark)": "black" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    Value(StyleValue),
    Conditional(IndexMap<String, TokenValue>),
}

impl From<&str> for TokenValue {
    fn from(value: &str) -> Self {
        TokenValue::Value(StyleValue::from(value))
    }
}

/// Token name -> value, in declaration order.
pub type Tokens = IndexMap<String, TokenValue>;

/// Handle for a compiled token group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarGroup {
    pub identity: String,
    /// Token name -> custom property name (`--x1a2b3c`).
    pub vars: IndexMap<String, String>,
}

impl VarGroup {
    /// `var(--name)` for a token.
    pub fn reference(&self, token: &str) -> Option<String> {
        self.vars.get(token).map(|name| format!("var({})", name))
    }
}

/// Compiles a token group declared at `export_id` (a stable identity for
/// the declaring module and export name).
pub fn define_vars(
    export_id: &str,
    tokens: &Tokens,
    options: &StyleOptions,
) -> Result<(VarGroup, Injectables)> {
    let prefix = &options.class_name_prefix;
    let identity = hash::group_identity(prefix, export_id);
    let mut vars = IndexMap::new();
    let mut blocks = ConditionalBlocks::default();

    for (token, value) in tokens {
        let name = format!("--{}", hash::var_name(prefix, &identity, token));
        for (path, value) in resolve_token(&identity, token, &name, value, options)? {
            blocks.push(path, format!("{}:{};", name, value));
        }
        vars.insert(token.clone(), name);
    }

    let injectables = blocks.into_rules(&identity, ":root", VARS_PRIORITY, CONDITIONAL_VARS_PRIORITY);
    tracing::debug!("compiled token group {} ({} tokens)", identity, vars.len());
    Ok((VarGroup { identity, vars }, injectables))
}

/// Compiles a theme for `group`. The returned object is a compiled style
/// keyed by the group identity, so merging two themes of one group keeps
/// the later one.
pub fn create_theme(
    group: &VarGroup,
    overrides: &Tokens,
    options: &StyleOptions,
) -> Result<(FlatCompiledStyles, Injectables)> {
    let mut blocks = ConditionalBlocks::default();
    for (token, value) in overrides {
        let Some(name) = group.vars.get(token) else {
            return Err(StyleError::new(
                ERR_UNKNOWN_TOKEN,
                format!(
                    "Theme overrides `{}`, which is not declared by token group {}.",
                    token, group.identity
                ),
            )
            .in_namespace(&group.identity)
            .for_property(token)
            .with_hint(format!(
                "Declared tokens: {}",
                group.vars.keys().cloned().collect::<Vec<_>>().join(", ")
            )));
        };
        for (path, value) in resolve_token(&group.identity, token, name, value, options)? {
            blocks.push(path, format!("{}:{};", name, value));
        }
    }

    let class = format!(
        "{}{}",
        options.class_name_prefix,
        hash::hash(&format!("{}{}", group.identity, blocks.fingerprint()))
    );
    let selector = format!(".{}, .{}:root", class, class);
    let injectables = blocks.into_rules(&class, &selector, THEME_PRIORITY, CONDITIONAL_THEME_PRIORITY);

    let marker = if options.dev {
        CompiledMarker::Source(format!("theme:{}", group.identity))
    } else {
        CompiledMarker::Flag(true)
    };
    let mut styles = FlatCompiledStyles::new(marker);
    styles.classes.insert(group.identity.clone(), Some(class.clone()));
    tracing::debug!("compiled theme {} for {}", class, group.identity);
    Ok((styles, injectables))
}

/// Flattens a token value into `(at-rule path, canonical value)` pairs.
fn resolve_token(
    group: &str,
    token: &str,
    name: &str,
    value: &TokenValue,
    options: &StyleOptions,
) -> Result<Vec<(Vec<Condition>, String)>> {
    let mut out = Vec::new();
    collect_token(group, token, name, value, vec![], options, &mut out)?;
    Ok(out)
}

fn collect_token(
    group: &str,
    token: &str,
    name: &str,
    value: &TokenValue,
    path: Vec<Condition>,
    options: &StyleOptions,
    out: &mut Vec<(Vec<Condition>, String)>,
) -> Result<()> {
    match value {
        TokenValue::Conditional(branches) => {
            for (key, inner) in branches {
                let condition = Condition::parse(key)
                    .map_err(|e| e.in_namespace(group).for_property(token))?;
                if matches!(condition, Condition::Pseudo(_)) {
                    return Err(StyleError::new(
                        ERR_INVALID_TOKEN_CONDITION,
                        format!(
                            "Token `{}` varies by `{}`; token values may only vary by at-rule.",
                            token, key
                        ),
                    )
                    .in_namespace(group)
                    .for_property(token)
                    .with_value(key));
                }
                let mut nested = path.clone();
                nested.push(condition);
                collect_token(group, token, name, inner, nested, options, out)?;
            }
            Ok(())
        }
        TokenValue::Value(StyleValue::String(s)) => {
            let canonical = normalize::normalize_with(name, s, NormalizeOptions::from(options));
            validate::validate_value(group, name, &canonical, options.style_resolution)?;
            out.push((condition::canonical_path(&path), canonical));
            Ok(())
        }
        TokenValue::Value(StyleValue::Number(n)) => {
            let canonical = normalize::number_to_value(name, *n, NormalizeOptions::from(options));
            out.push((condition::canonical_path(&path), canonical));
            Ok(())
        }
        TokenValue::Value(_) => Err(StyleError::new(
            ERR_INVALID_VALUE,
            format!("Token `{}` must be a string, a number or a conditional map.", token),
        )
        .in_namespace(group)
        .for_property(token)),
    }
}

/// Custom property assignments grouped by at-rule path, in first-seen
/// order. The empty path is the unconditional block.
#[derive(Default)]
struct ConditionalBlocks {
    blocks: IndexMap<Vec<Condition>, String>,
}

impl ConditionalBlocks {
    fn push(&mut self, path: Vec<Condition>, declaration: String) {
        self.blocks.entry(path).or_default().push_str(&declaration);
    }

    fn fingerprint(&self) -> String {
        self.blocks
            .iter()
            .map(|(path, body)| {
                let conditions: String = path.iter().map(Condition::as_str).collect();
                format!("{}{{{}}}", conditions, body)
            })
            .collect()
    }

    /// One rule per block. The unconditional block is keyed by `key`,
    /// conditional ones by `key` plus a hash of their path.
    fn into_rules(
        self,
        key: &str,
        selector: &str,
        priority: f64,
        conditional_priority: f64,
    ) -> Injectables {
        let mut rules = Injectables::new();
        for (path, body) in self.blocks {
            let mut rule = format!("{}{{{}}}", selector, body);
            for at_rule in path.iter().rev() {
                rule = format!("{}{{{}}}", at_rule.as_str(), rule);
            }
            if path.is_empty() {
                rules.insert(key.to_string(), InjectableStyle::new(priority, rule.clone(), rule));
            } else {
                let conditions: String = path.iter().map(Condition::as_str).collect();
                let conditional_key = format!("{}-{}", key, hash::hash(&conditions));
                rules.insert(
                    conditional_key,
                    InjectableStyle::new(conditional_priority, rule.clone(), rule),
                );
            }
        }
        rules
    }
}
