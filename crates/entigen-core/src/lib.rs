//! Core types for entigen.
//!
//! This crate holds the pieces every component builds on: declarative
//! configuration schemas and their validation errors, the base entity
//! schemas, and the code-generation context.

pub mod codegen;
pub mod config;
pub mod entity;
pub mod error;
pub mod macros;
pub mod schema;
pub mod validation;

#[doc(hidden)]
pub use serde as __serde;

pub use codegen::{CodegenContext, ConfigExt, CppType, Expression, Variable};
pub use error::{Error, Result};
pub use schema::{ConfigMap, Presence, Schema, SchemaKey, Validator};
pub use validation::{ValidationError, ValidationErrorKind, ValidationErrors};
