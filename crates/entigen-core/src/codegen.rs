//! Code generation context.
//!
//! Validated configuration is turned into C++ statements for the firmware's
//! `setup()`. The context tracks every declared variable by id so later
//! components can reference objects created by earlier ones.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::ConfigMap;
use crate::{codegen_err, not_found_err};

/// A fully qualified C++ type name, e.g. `sensor::Sensor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CppType(pub &'static str);

impl fmt::Display for CppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A rendered C++ expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression(String);

impl Expression {
    pub fn raw(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// A C++ string literal. Non-ASCII and control bytes become octal escapes.
    pub fn string(value: &str) -> Self {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('"');
        for byte in value.bytes() {
            match byte {
                b'"' => out.push_str("\\\""),
                b'\\' => out.push_str("\\\\"),
                b'\n' => out.push_str("\\n"),
                0x20..=0x7e => out.push(byte as char),
                other => out.push_str(&format!("\\{:03o}", other)),
            }
        }
        out.push('"');
        Self(out)
    }

    pub fn int(value: i64) -> Self {
        Self(value.to_string())
    }

    pub fn uint(value: u64) -> Self {
        Self(value.to_string())
    }

    pub fn bool(value: bool) -> Self {
        Self(value.to_string())
    }

    /// `ns::Enum::MEMBER`
    pub fn enum_value(enum_type: &str, member: &str) -> Self {
        Self(format!("{}::{}", enum_type, member))
    }

    /// A free function call, e.g. `App.register_sensor(x)`.
    pub fn call(function: &str, args: impl IntoIterator<Item = Expression>) -> Self {
        Self(format!("{}({})", function, join_args(args)))
    }

    /// `new T(args)`
    pub fn new_object(ty: CppType, args: impl IntoIterator<Item = Expression>) -> Self {
        Self(format!("new {}({})", ty, join_args(args)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn join_args(args: impl IntoIterator<Item = Expression>) -> String {
    args.into_iter()
        .map(|a| a.0)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A pointer variable declared in the generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub id: String,
    pub ty: CppType,
}

impl Variable {
    pub fn expr(&self) -> Expression {
        Expression(self.id.clone())
    }

    /// `id->method(args)`
    pub fn call(&self, method: &str, args: impl IntoIterator<Item = Expression>) -> Expression {
        Expression(format!("{}->{}({})", self.id, method, join_args(args)))
    }
}

/// Accumulates everything the generated translation unit needs.
#[derive(Debug, Default)]
pub struct CodegenContext {
    includes: BTreeSet<String>,
    defines: BTreeMap<String, Option<String>>,
    globals: Vec<String>,
    statements: Vec<String>,
    variables: HashMap<String, Variable>,
    declaration_order: Vec<String>,
}

impl CodegenContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_include(&mut self, header: impl Into<String>) {
        self.includes.insert(header.into());
    }

    /// Add a `#define`. Defining the same name twice keeps the last value.
    pub fn add_define(&mut self, name: impl Into<String>, value: Option<String>) {
        self.defines.insert(name.into(), value);
    }

    /// Declare a global pointer `ty *id` and assign it a freshly constructed object.
    pub fn declare_new(
        &mut self,
        id: &str,
        ty: CppType,
        args: impl IntoIterator<Item = Expression>,
    ) -> Result<Variable> {
        if self.variables.contains_key(id) {
            return Err(codegen_err!("id '{}' is declared more than once", id));
        }
        let var = Variable {
            id: id.to_string(),
            ty,
        };
        self.globals.push(format!("{} *{};", ty, id));
        self.statements
            .push(format!("{} = {};", id, Expression::new_object(ty, args)));
        self.variables.insert(id.to_string(), var.clone());
        self.declaration_order.push(id.to_string());
        tracing::debug!(id, ty = ty.0, "Declared variable");
        Ok(var)
    }

    /// Append a statement to `setup()`.
    pub fn add(&mut self, expr: Expression) {
        self.statements.push(format!("{};", expr));
    }

    pub fn get_variable(&self, id: &str) -> Result<&Variable> {
        self.variables
            .get(id)
            .ok_or_else(|| not_found_err!("no variable with id '{}' has been declared", id))
    }

    /// Variables of the given type, in declaration order.
    pub fn variables_of_type(&self, ty: CppType) -> Vec<&Variable> {
        self.declaration_order
            .iter()
            .filter_map(|id| self.variables.get(id))
            .filter(|v| v.ty == ty)
            .collect()
    }

    pub fn has_define(&self, name: &str) -> bool {
        self.defines.contains_key(name)
    }

    pub fn define(&self, name: &str) -> Option<&str> {
        self.defines.get(name).and_then(|v| v.as_deref())
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Render the translation unit.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for header in &self.includes {
            out.push_str(&format!("#include \"{}\"\n", header));
        }
        if !self.includes.is_empty() {
            out.push('\n');
        }
        for (name, value) in &self.defines {
            match value {
                Some(v) => out.push_str(&format!("#define {} {}\n", name, v)),
                None => out.push_str(&format!("#define {}\n", name)),
            }
        }
        if !self.defines.is_empty() {
            out.push('\n');
        }
        for global in &self.globals {
            out.push_str(global);
            out.push('\n');
        }
        if !self.globals.is_empty() {
            out.push('\n');
        }
        out.push_str("void setup() {\n");
        for statement in &self.statements {
            out.push_str("  ");
            out.push_str(statement);
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }
}

/// Typed accessors over a validated mapping.
///
/// Values have already been checked by their schema, so a type mismatch here
/// means the schema and the generator disagree.
pub trait ConfigExt {
    fn str_value(&self, key: &str) -> Result<Option<&str>>;
    fn i64_value(&self, key: &str) -> Result<Option<i64>>;
    fn u64_value(&self, key: &str) -> Result<Option<u64>>;
    fn bool_value(&self, key: &str) -> Result<Option<bool>>;
    fn map_value(&self, key: &str) -> Result<Option<&ConfigMap>>;

    fn required_str(&self, key: &str) -> Result<&str> {
        self.str_value(key)?
            .ok_or_else(|| codegen_err!("validated configuration has no '{}'", key))
    }
}

fn typed<'a, T>(
    map: &'a ConfigMap,
    key: &str,
    expected: &str,
    get: impl FnOnce(&'a Value) -> Option<T>,
) -> Result<Option<T>> {
    match map.get(key) {
        None => Ok(None),
        Some(v) => get(v)
            .map(Some)
            .ok_or_else(|| Error::codegen(format!("'{}' is not a validated {}", key, expected))),
    }
}

impl ConfigExt for ConfigMap {
    fn str_value(&self, key: &str) -> Result<Option<&str>> {
        typed(self, key, "string", Value::as_str)
    }

    fn i64_value(&self, key: &str) -> Result<Option<i64>> {
        typed(self, key, "integer", Value::as_i64)
    }

    fn u64_value(&self, key: &str) -> Result<Option<u64>> {
        typed(self, key, "unsigned integer", Value::as_u64)
    }

    fn bool_value(&self, key: &str) -> Result<Option<bool>> {
        typed(self, key, "boolean", Value::as_bool)
    }

    fn map_value(&self, key: &str) -> Result<Option<&ConfigMap>> {
        typed(self, key, "mapping", Value::as_object)
    }
}
