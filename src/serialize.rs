//! Rule serializer
//!
//! Orders collected rules by priority and renders stylesheet text. Every
//! compiled selector has the same specificity, so order (or the cascade
//! layer a rule lands in) is the only thing deciding precedence.

use std::cmp::Ordering;

use crate::ir::{InjectableStyle, Injectables};
use crate::options::StyleOptions;

const LTR_SCOPE: &str = ":where(html:not([dir=\"rtl\"])) ";
const RTL_SCOPE: &str = ":where(html[dir=\"rtl\"]) ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Wrap each priority group in `@layer <prefix><priority>`.
    pub use_css_layers: bool,
    pub layer_prefix: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self::from(&StyleOptions::default())
    }
}

impl From<&StyleOptions> for SerializeOptions {
    fn from(options: &StyleOptions) -> Self {
        Self {
            use_css_layers: options.use_css_layers,
            layer_prefix: options.layer_prefix.clone(),
        }
    }
}

/// Collects rules from any number of compiled files. The first rule seen
/// for a class name is kept.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    rules: Injectables,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: &str, rule: InjectableStyle) {
        if !self.rules.contains_key(class) {
            self.rules.insert(class.to_string(), rule);
        }
    }

    pub fn extend(&mut self, rules: Injectables) {
        for (class, rule) in rules {
            self.rules.entry(class).or_insert(rule);
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in output order: ascending priority, first-seen on ties.
    pub fn ordered(&self) -> Vec<(&str, &InjectableStyle)> {
        let mut ordered: Vec<(&str, &InjectableStyle)> =
            self.rules.iter().map(|(c, r)| (c.as_str(), r)).collect();
        ordered.sort_by(|a, b| {
            a.1.priority
                .partial_cmp(&b.1.priority)
                .unwrap_or(Ordering::Equal)
        });
        ordered
    }

    pub fn to_css(&self, options: &SerializeOptions) -> String {
        let ordered = self.ordered();
        let css = if options.use_css_layers {
            render_layers(&ordered, &options.layer_prefix)
        } else {
            ordered
                .iter()
                .flat_map(|(_, rule)| render_rule(rule))
                .collect::<Vec<_>>()
                .join("\n")
        };
        tracing::debug!(
            "serialized {} rules into {} bytes (layers: {})",
            ordered.len(),
            css.len(),
            options.use_css_layers
        );
        css
    }
}

/// Deduplicates `rules` by class name and renders them.
pub fn serialize(rules: &[(String, InjectableStyle)], options: &SerializeOptions) -> String {
    let mut sheet = StyleSheet::new();
    for (class, rule) in rules {
        sheet.insert(class, rule.clone());
    }
    sheet.to_css(options)
}

fn render_layers(ordered: &[(&str, &InjectableStyle)], prefix: &str) -> String {
    let mut groups: Vec<(f64, Vec<String>)> = Vec::new();
    for (_, rule) in ordered {
        match groups.last_mut() {
            Some((priority, lines)) if *priority == rule.priority => lines.extend(render_rule(rule)),
            _ => groups.push((rule.priority, render_rule(rule))),
        }
    }
    if groups.is_empty() {
        return String::new();
    }

    let names: Vec<String> = groups
        .iter()
        .map(|(priority, _)| layer_name(prefix, *priority))
        .collect();
    let mut out = format!("@layer {};", names.join(", "));
    for (name, (_, lines)) in names.iter().zip(groups) {
        out.push_str(&format!("\n@layer {}{{\n{}\n}}", name, lines.join("\n")));
    }
    out
}

/// Layer names derive from the priority itself, so sheets serialized
/// separately agree on them. `.` would nest layers and becomes `_`.
fn layer_name(prefix: &str, priority: f64) -> String {
    format!("{}{}", prefix, priority).replace('.', "_")
}

/// The LTR rule alone, or both directions scoped to the document direction.
fn render_rule(rule: &InjectableStyle) -> Vec<String> {
    match &rule.rtl {
        None => vec![rule.ltr.clone()],
        // Keyframes cannot be scoped by direction.
        Some(_) if rule.ltr.starts_with("@keyframes") => vec![rule.ltr.clone()],
        Some(rtl) => vec![scope_rule(&rule.ltr, LTR_SCOPE), scope_rule(rtl, RTL_SCOPE)],
    }
}

/// Prefixes every selector of the innermost style rule with `scope`.
fn scope_rule(rule: &str, scope: &str) -> String {
    let Some(body) = rule.rfind('{') else {
        return rule.to_string();
    };
    let start = rule[..body].rfind('{').map_or(0, |i| i + 1);
    let selectors = split_selector_list(&rule[start..body])
        .into_iter()
        .map(|selector| format!("{}{}", scope, selector.trim()))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}{}{}", &rule[..start], selectors, &rule[body..])
}

/// Splits on commas outside parentheses, brackets and strings.
fn split_selector_list(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);
    parts
}
