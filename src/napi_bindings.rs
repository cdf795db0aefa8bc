//! N-API exports for the JavaScript build pipeline and runtime.
//!
//! Inputs and outputs cross the boundary as JSON values. Compile errors are
//! forwarded as the serialized `StyleError` so callers keep the code and the
//! namespace/property context.

use napi_derive::napi;
use serde::Serialize;
use serde_json::{json, Value};

use crate::compile;
use crate::ir::Injectables;
use crate::keyframes::{self, Keyframes};
use crate::merge::{self, MergeOptions};
use crate::normalize::{self, NormalizeOptions};
use crate::options::StyleOptions;
use crate::serialize::{self, SerializeOptions};
use crate::validate::StyleError;
use crate::vars::{self, Tokens, VarGroup};

fn to_napi_error(err: StyleError) -> napi::Error {
    let reason = serde_json::to_string(&err).unwrap_or_else(|_| err.to_string());
    napi::Error::from_reason(reason)
}

fn read_options(options: Option<Value>) -> napi::Result<StyleOptions> {
    match options {
        Some(value) => StyleOptions::from_json(value).map_err(to_napi_error),
        None => Ok(StyleOptions::default()),
    }
}

fn read<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> napi::Result<T> {
    serde_json::from_value(value)
        .map_err(|e| napi::Error::from_reason(format!("invalid {}: {}", what, e)))
}

fn write<T: Serialize>(value: &T) -> napi::Result<Value> {
    serde_json::to_value(value).map_err(|e| napi::Error::from_reason(e.to_string()))
}

/// `{ namespace: styleObject }` -> `{ namespaces, injectables }`.
#[napi]
pub fn compile_namespaces_native(
    namespaces: Value,
    file_path: Option<String>,
    options: Option<Value>,
) -> napi::Result<Value> {
    let options = read_options(options)?;
    let namespaces = read(namespaces, "style namespaces")?;
    let (compiled, injectables) =
        compile::compile_namespaces(file_path.as_deref(), &namespaces, &options)
            .map_err(to_napi_error)?;
    Ok(json!({ "namespaces": write(&compiled)?, "injectables": write(&injectables)? }))
}

#[napi]
pub fn define_vars_native(
    export_id: String,
    tokens: Value,
    options: Option<Value>,
) -> napi::Result<Value> {
    let options = read_options(options)?;
    let tokens: Tokens = read(tokens, "tokens")?;
    let (group, injectables) =
        vars::define_vars(&export_id, &tokens, &options).map_err(to_napi_error)?;
    Ok(json!({ "group": write(&group)?, "injectables": write(&injectables)? }))
}

#[napi]
pub fn create_theme_native(
    group: Value,
    overrides: Value,
    options: Option<Value>,
) -> napi::Result<Value> {
    let options = read_options(options)?;
    let group: VarGroup = read(group, "token group")?;
    let overrides: Tokens = read(overrides, "theme overrides")?;
    let (theme, injectables) =
        vars::create_theme(&group, &overrides, &options).map_err(to_napi_error)?;
    Ok(json!({ "theme": write(&theme)?, "injectables": write(&injectables)? }))
}

#[napi]
pub fn keyframes_native(frames: Value, options: Option<Value>) -> napi::Result<Value> {
    let options = read_options(options)?;
    let frames: Keyframes = read(frames, "keyframes")?;
    let (name, rule) = keyframes::compile_keyframes(&frames, &options).map_err(to_napi_error)?;
    Ok(json!({ "name": name, "rule": write(&rule)? }))
}

/// Renders a `{ className: InjectableStyle }` map collected across files.
#[napi]
pub fn serialize_rules_native(rules: Value, options: Option<Value>) -> napi::Result<String> {
    let options = read_options(options)?;
    let rules: Injectables = read(rules, "rules")?;
    let rules: Vec<_> = rules.into_iter().collect();
    Ok(serialize::serialize(&rules, &SerializeOptions::from(&options)))
}

#[napi]
pub fn merge_native(args: Vec<Value>, options: Option<Value>) -> napi::Result<Value> {
    let options = read_options(options)?;
    let result =
        merge::merge_json(&args, &MergeOptions::from(&options)).map_err(to_napi_error)?;
    write(&result)
}

#[napi]
pub fn normalize_value_native(
    property: String,
    value: String,
    options: Option<Value>,
) -> napi::Result<String> {
    let options = read_options(options)?;
    Ok(normalize::normalize_with(
        &property,
        &value,
        NormalizeOptions::from(&options),
    ))
}
