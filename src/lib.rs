//! # Atomic Style Compiler
//!
//! Build-time compiler for atomic CSS plus the runtime merge engine that
//! consumes its output.
//!
//! ## Compile time
//!
//! 1. **Normalize**: every value is canonicalized (`normalize`) so that
//!    equivalent spellings produce the same class.
//! 2. **Lower**: each `(property, value, condition path)` becomes one
//!    content-addressed class and one rule (`compile`). Class names are a
//!    hash of normalized content, so files compiled independently (or in
//!    parallel) agree on names without coordination.
//! 3. **Mirror**: direction-sensitive declarations get an RTL twin (`rtl`);
//!    `rtl` is `None` whenever both directions are identical.
//! 4. **Serialize**: rules from every file are deduplicated by class and
//!    ordered by priority (`serialize`).
//!
//! ## Run time
//!
//! `merge` walks a nested, possibly falsy list of compiled objects and
//! returns one class string ordered by priority, plus inline custom
//! property values for dynamic styles.
//!
//! ## Invariants
//!
//! - Every selector has the same minimal specificity; priority alone
//!   decides precedence (`priorities`).
//! - Identical `(property, normalized value, canonical path)` triples yield
//!   identical class names and rule text.
//! - Normalization never fails and is idempotent.

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod compile;
pub mod condition;
pub mod expand;
pub mod hash;
pub mod ir;
pub mod keyframes;
pub mod merge;
pub mod normalize;
pub mod options;
pub mod priorities;
pub mod properties;
pub mod rtl;
pub mod serialize;
pub mod validate;
pub mod value_parser;
pub mod vars;

#[cfg(feature = "napi")]
mod napi_bindings;


pub use compile::{compile, compile_files, compile_namespaces, flatten_style_object, SourceFile};
pub use condition::Condition;
pub use ir::{
    CompiledNamespace, Declaration, FlatCompiledStyles, InjectableStyle, Injectables, StyleValue,
};
pub use keyframes::compile_keyframes;
pub use merge::{merge, merge_json, MergeOptions, MergeResult, StyleRef};
pub use normalize::normalize;
pub use options::{StyleOptions, StyleResolution};
pub use serialize::{serialize, SerializeOptions, StyleSheet};
pub use validate::{Result, StyleError};
pub use vars::{create_theme, define_vars, VarGroup};

#[cfg(feature = "napi")]
pub use napi_bindings::*;

#[cfg(feature = "napi")]
#[napi]
pub fn compiler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
