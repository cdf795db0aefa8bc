//! Atomic class compiler
//!
//! Lowers each `(property, value, condition path)` declaration into one
//! content-addressed class and one CSS rule. Every rule selector has the
//! same minimal specificity: the class is repeated once for the base and
//! once per enclosing at-rule, so rule order (priority) alone decides which
//! declaration wins.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condition::{self, Condition};
use crate::expand;
use crate::hash;
use crate::ir::{
    CompiledMarker, CompiledNamespace, Declaration, DynamicBinding, FlatCompiledStyles,
    InjectableStyle, Injectables, ScalarValue, StyleValue, DYNAMIC_VALUE_KEY,
};
use crate::normalize::{self, NormalizeOptions};
use crate::options::{StyleOptions, StyleResolution};
use crate::priorities;
use crate::properties;
use crate::rtl::{self, Direction};
use crate::validate::{self, Result, StyleError, ERR_INVALID_VALUE};

const THUMB_PSEUDO: &str = "::thumb";
const THUMB_SELECTORS: &[&str] = &[
    "::-webkit-slider-thumb",
    "::-moz-range-thumb",
    "::-ms-thumb",
];

/// One source module worth of style namespaces, as handed over by the
/// extraction front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub path: String,
    /// Namespace -> nested style object.
    pub namespaces: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledFile {
    pub path: String,
    pub namespaces: Vec<CompiledNamespace>,
    pub injectables: Injectables,
}

// ═══════════════════════════════════════════════════════════════════════════════
// STYLE OBJECTS -> DECLARATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Flattens a nested style object into declarations, in key order.
///
/// Property values may be a literal, `null`, a fallback array, a dynamic
/// reference `{ "$$dynamic": "param" }`, or a condition object
/// `{ "default": .., ":hover": .., "@media ..": { .. } }` nested to any depth.
/// A top-level condition key may also wrap a block of properties:
/// `{ ":hover": { "color": "blue" } }`.
pub fn flatten_style_object(namespace: &str, style: &Value) -> Result<Vec<Declaration>> {
    let Value::Object(entries) = style else {
        return Err(StyleError::new(
            ERR_INVALID_VALUE,
            format!("Namespace `{}` must be a style object.", namespace),
        )
        .in_namespace(namespace));
    };

    let mut out = Vec::new();
    for (key, value) in entries {
        if key.starts_with(':') || key.starts_with('@') {
            let condition = Condition::parse(key).map_err(|e| e.in_namespace(namespace))?;
            let Value::Object(block) = value else {
                return Err(StyleError::new(
                    ERR_INVALID_VALUE,
                    format!(
                        "Condition block `{}` in namespace `{}` must contain properties.",
                        key, namespace
                    ),
                )
                .in_namespace(namespace));
            };
            for (property, inner) in block {
                flatten_value(namespace, property, inner, vec![condition.clone()], &mut out)?;
            }
            continue;
        }
        flatten_value(namespace, key, value, vec![], &mut out)?;
    }
    Ok(out)
}

fn flatten_value(
    namespace: &str,
    property: &str,
    value: &Value,
    path: Vec<Condition>,
    out: &mut Vec<Declaration>,
) -> Result<()> {
    let invalid = |detail: &str| {
        StyleError::new(
            ERR_INVALID_VALUE,
            format!(
                "Invalid value for `{}` in namespace `{}`: {}.",
                property, namespace, detail
            ),
        )
        .in_namespace(namespace)
        .for_property(property)
    };

    let style_value = match value {
        Value::Null => StyleValue::Null,
        Value::String(s) => StyleValue::String(s.clone()),
        Value::Number(n) => StyleValue::Number(n.as_f64().ok_or_else(|| invalid("number out of range"))?),
        Value::Array(items) => {
            let mut fallbacks = Vec::with_capacity(items.len());
            for item in items {
                fallbacks.push(match item {
                    Value::String(s) => ScalarValue::String(s.clone()),
                    Value::Number(n) => ScalarValue::Number(
                        n.as_f64().ok_or_else(|| invalid("number out of range"))?,
                    ),
                    _ => return Err(invalid("fallback entries must be strings or numbers")),
                });
            }
            StyleValue::Fallbacks(fallbacks)
        }
        Value::Object(map) if map.contains_key(DYNAMIC_VALUE_KEY) => {
            match map.get(DYNAMIC_VALUE_KEY) {
                Some(Value::String(param)) => StyleValue::Dynamic {
                    param: param.clone(),
                },
                _ => return Err(invalid("dynamic parameter must be a string")),
            }
        }
        Value::Object(map) => {
            for (key, inner) in map {
                let condition = Condition::parse(key)
                    .map_err(|e| e.in_namespace(namespace).for_property(property))?;
                let mut nested = path.clone();
                nested.push(condition);
                flatten_value(namespace, property, inner, nested, out)?;
            }
            return Ok(());
        }
        Value::Bool(_) => return Err(invalid("booleans are not CSS values")),
    };

    out.push(
        path.into_iter()
            .fold(Declaration::new(namespace, property, style_value), Declaration::when),
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Compiles one namespace outside of any source file.
pub fn compile(
    namespace: &str,
    declarations: &[Declaration],
    options: &StyleOptions,
) -> Result<(CompiledNamespace, Injectables)> {
    compile_namespace(None, namespace, declarations, options)
}

/// Compiles one namespace. `source` is the file the namespace was declared
/// in; dev builds record it in the compiled marker.
pub fn compile_namespace(
    source: Option<&str>,
    namespace: &str,
    declarations: &[Declaration],
    options: &StyleOptions,
) -> Result<(CompiledNamespace, Injectables)> {
    let marker = if options.dev {
        CompiledMarker::Source(match source {
            Some(file) => format!("{}:{}", file, namespace),
            None => namespace.to_string(),
        })
    } else {
        CompiledMarker::Flag(true)
    };

    let mut compiler = NamespaceCompiler {
        namespace,
        options,
        normalize: NormalizeOptions::from(options),
        styles: FlatCompiledStyles::new(marker),
        dynamic: Vec::new(),
        injectables: Injectables::new(),
    };
    for declaration in declarations {
        compiler.declaration(declaration)?;
    }

    tracing::debug!(
        "compiled namespace `{}`: {} keys, {} rules",
        namespace,
        compiler.styles.classes.len(),
        compiler.injectables.len()
    );

    Ok((
        CompiledNamespace {
            namespace: namespace.to_string(),
            styles: compiler.styles,
            dynamic: compiler.dynamic,
        },
        compiler.injectables,
    ))
}

/// Flattens and compiles every namespace of a style module. Rules shared by
/// several namespaces are collected once.
pub fn compile_namespaces(
    source: Option<&str>,
    namespaces: &IndexMap<String, Value>,
    options: &StyleOptions,
) -> Result<(Vec<CompiledNamespace>, Injectables)> {
    let mut compiled = Vec::with_capacity(namespaces.len());
    let mut injectables = Injectables::new();
    for (namespace, style) in namespaces {
        let declarations = flatten_style_object(namespace, style)?;
        let (ns, rules) = compile_namespace(source, namespace, &declarations, options)?;
        compiled.push(ns);
        for (class, rule) in rules {
            injectables.entry(class).or_insert(rule);
        }
    }
    Ok((compiled, injectables))
}

/// Compiles independent files in parallel. The first failing file (in
/// input order) is reported.
pub fn compile_files(files: &[SourceFile], options: &StyleOptions) -> Result<Vec<CompiledFile>> {
    files
        .par_iter()
        .map(|file| -> Result<CompiledFile> {
            let (namespaces, injectables) =
                compile_namespaces(Some(&file.path), &file.namespaces, options)?;
            Ok(CompiledFile {
                path: file.path.clone(),
                namespaces,
                injectables,
            })
        })
        .collect::<Vec<Result<CompiledFile>>>()
        .into_iter()
        .collect()
}

struct NamespaceCompiler<'a> {
    namespace: &'a str,
    options: &'a StyleOptions,
    normalize: NormalizeOptions,
    styles: FlatCompiledStyles,
    dynamic: Vec<DynamicBinding>,
    injectables: Injectables,
}

impl NamespaceCompiler<'_> {
    fn declaration(&mut self, declaration: &Declaration) -> Result<()> {
        let property = properties::dashify(&declaration.property);
        validate::validate_property(self.namespace, &property)?;
        let path = condition::canonical_path(&declaration.conditions);
        let expanding = self.options.style_resolution == StyleResolution::LegacyExpandShorthands;

        let values = match &declaration.value {
            StyleValue::Null => {
                let longhands = if expanding {
                    expand::expanded_properties(&property)
                } else {
                    vec![]
                };
                if longhands.is_empty() {
                    self.unset(&path, &property);
                } else {
                    for longhand in longhands {
                        self.unset(&path, longhand);
                    }
                }
                return Ok(());
            }
            StyleValue::Number(n) => vec![normalize::number_to_value(&property, *n, self.normalize)],
            StyleValue::String(s) => vec![normalize::normalize_with(&property, s, self.normalize)],
            StyleValue::Fallbacks(items) => items
                .iter()
                .map(|item| match item {
                    ScalarValue::Number(n) => {
                        normalize::number_to_value(&property, *n, self.normalize)
                    }
                    ScalarValue::String(s) => {
                        normalize::normalize_with(&property, s, self.normalize)
                    }
                })
                .collect(),
            StyleValue::Dynamic { param } => {
                let key = priorities::style_key(&path, &property);
                let var_name = format!(
                    "--{}",
                    hash::var_name(&self.options.class_name_prefix, self.namespace, &key)
                );
                self.dynamic.push(DynamicBinding {
                    key,
                    param: param.clone(),
                    var_name: var_name.clone(),
                });
                vec![format!("var({})", var_name)]
            }
        };

        if values.is_empty() {
            return Err(StyleError::new(
                ERR_INVALID_VALUE,
                format!(
                    "Empty fallback list for `{}` in namespace `{}`.",
                    property, self.namespace
                ),
            )
            .in_namespace(self.namespace)
            .for_property(&property));
        }
        for value in &values {
            validate::validate_value(
                self.namespace,
                &property,
                value,
                self.options.style_resolution,
            )?;
        }

        if expanding && values.len() == 1 {
            if let Some(longhands) = expand::expand(&property, &values[0]) {
                for (longhand, value) in longhands {
                    self.atomic(&path, longhand, &[value]);
                }
                return Ok(());
            }
        }
        self.atomic(&path, &property, &values);
        Ok(())
    }

    fn unset(&mut self, path: &[Condition], property: &str) {
        let key = priorities::style_key(path, property);
        tracing::trace!("{}: unset `{}`", self.namespace, key);
        self.styles.classes.insert(key, None);
    }

    fn atomic(&mut self, path: &[Condition], property: &str, values: &[String]) {
        let key = priorities::style_key(path, property);
        let class = hash::class_name(
            &self.options.class_name_prefix,
            property,
            &values.join(","),
            path,
        );
        tracing::trace!("{}: `{}` -> {}", self.namespace, key, class);

        if !self.injectables.contains_key(&class) {
            let priority = f64::from(
                priorities::property_priority(property) + condition::path_priority(path),
            );
            let ltr = build_rule(&class, path, property, values, Direction::Ltr);
            let rtl = build_rule(&class, path, property, values, Direction::Rtl);
            self.injectables
                .insert(class.clone(), InjectableStyle::new(priority, ltr, rtl));
        }
        self.styles.classes.insert(key, Some(class));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RULE TEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// `.c` repeated once for the base and once per at-rule, followed by the
/// pseudo suffixes. `::thumb` expands to one selector per vendor.
pub fn build_selector(class: &str, path: &[Condition]) -> String {
    let at_rules = path.iter().filter(|c| c.is_at_rule()).count();
    let base = format!(".{}", class).repeat(1 + at_rules);
    let pseudos: Vec<&str> = path
        .iter()
        .filter(|c| matches!(c, Condition::Pseudo(_)))
        .map(Condition::as_str)
        .collect();

    if !pseudos.contains(&THUMB_PSEUDO) {
        return format!("{}{}", base, pseudos.concat());
    }
    THUMB_SELECTORS
        .iter()
        .map(|vendor| {
            let suffix: String = pseudos
                .iter()
                .map(|p| if *p == THUMB_PSEUDO { *vendor } else { *p })
                .collect();
            format!("{}{}", base, suffix)
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Full rule text for one direction, folded through every at-rule on the
/// path (first at-rule outermost).
pub fn build_rule(
    class: &str,
    path: &[Condition],
    property: &str,
    values: &[String],
    direction: Direction,
) -> String {
    let body = values
        .iter()
        .map(|value| {
            let (p, v) = rtl::generate(property, value, direction);
            format!("{}:{}", p, v)
        })
        .collect::<Vec<_>>()
        .join(";");

    let mut rule = format!("{}{{{}}}", build_selector(class, path), body);
    for at_rule in path.iter().rev().filter(|c| c.is_at_rule()) {
        rule = format!("{}{{{}}}", at_rule.as_str(), rule);
    }
    rule
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn media() -> Condition {
        Condition::parse("@media (min-width: 600px)").unwrap()
    }

    #[test]
    fn test_selector_repeats_per_at_rule() {
        let supports = Condition::parse("@supports (display:grid)").unwrap();
        let hover = Condition::parse(":hover").unwrap();
        let path = condition::canonical_path(&[hover, media(), supports]);
        assert_eq!(build_selector("x1", &path), ".x1.x1.x1:hover");
    }

    #[test]
    fn test_thumb_expands_to_vendor_selectors() {
        let path = vec![Condition::parse("::thumb").unwrap()];
        assert_eq!(
            build_selector("x1", &path),
            ".x1::-webkit-slider-thumb,.x1::-moz-range-thumb,.x1::-ms-thumb"
        );
    }

    #[test]
    fn test_rule_wraps_at_rules() {
        let supports = Condition::parse("@supports (display:grid)").unwrap();
        let path = condition::canonical_path(&[media(), supports]);
        let rule = build_rule("x1", &path, "color", &["red".to_string()], Direction::Ltr);
        assert_eq!(
            rule,
            "@media (min-width:600px){@supports (display:grid){.x1.x1.x1{color:red}}}"
        );
    }

    #[test]
    fn test_flatten_nested_conditions() {
        let decls = flatten_style_object(
            "root",
            &json!({
                "color": { "default": "red", ":hover": "blue", "@media (min-width:600px)": { ":hover": null } },
                ":focus": { "outlineWidth": 2 }
            }),
        )
        .unwrap();
        assert_eq!(decls.len(), 4);
        assert_eq!(decls[0].conditions, vec![Condition::Default]);
        assert_eq!(decls[2].value, StyleValue::Null);
        assert_eq!(decls[2].conditions.len(), 2);
        assert_eq!(decls[3].property, "outlineWidth");
        assert_eq!(decls[3].value, StyleValue::Number(2.0));
    }

    #[test]
    fn test_flatten_rejects_bad_condition_with_context() {
        let err = flatten_style_object("card", &json!({ "color": { "hover": "red" } })).unwrap_err();
        assert_eq!(err.code, validate::ERR_INVALID_CONDITION);
        assert_eq!(err.namespace.as_deref(), Some("card"));
        assert_eq!(err.property.as_deref(), Some("color"));
    }

    #[test]
    fn test_flatten_rejects_booleans() {
        let err = flatten_style_object("card", &json!({ "color": true })).unwrap_err();
        assert_eq!(err.code, ERR_INVALID_VALUE);
    }

    #[test]
    fn test_compile_files_matches_sequential() {
        let files: Vec<SourceFile> = (0..8)
            .map(|i| SourceFile {
                path: format!("src/file{}.js", i),
                namespaces: [(
                    "root".to_string(),
                    json!({ "color": "red", "marginTop": i }),
                )]
                .into_iter()
                .collect(),
            })
            .collect();
        let options = StyleOptions::default();
        let parallel = compile_files(&files, &options).unwrap();
        for (file, compiled) in files.iter().zip(&parallel) {
            let (namespaces, injectables) =
                compile_namespaces(Some(&file.path), &file.namespaces, &options).unwrap();
            assert_eq!(compiled.path, file.path);
            assert_eq!(compiled.namespaces, namespaces);
            assert_eq!(compiled.injectables, injectables);
        }
    }
}
