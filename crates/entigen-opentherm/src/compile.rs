//! Whole-document validation and code generation.
//!
//! A document has a required `opentherm` hub section and an optional
//! `sensor` section:
//!
//! ```json
//! {
//!   "opentherm": { "in_pin": 4, "out_pin": 5 },
//!   "sensor": { "t_boiler": { "name": "Boiler" } }
//! }
//! ```

use entigen_core::codegen::{CodegenContext, ConfigExt};
use entigen_core::schema::{ConfigMap, Schema, Validator};
use entigen_core::{Error, Result};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::constants::{OPENTHERM, SENSOR};
use crate::{hub, sensor};

static DOCUMENT_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .required(OPENTHERM, Validator::Nested(hub::CONFIG_SCHEMA.clone()))
        .optional(SENSOR, Validator::Nested(sensor::CONFIG_SCHEMA.clone()))
});

/// A document that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocument {
    pub hub: ConfigMap,
    pub sensor: Option<ConfigMap>,
}

impl ValidatedDocument {
    /// Names of the configured sensors, sorted.
    pub fn sensor_names(&self) -> Vec<&str> {
        self.sensor
            .iter()
            .flat_map(|s| s.iter())
            .filter(|(_, v)| v.is_object())
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

/// Validate a document, reporting every problem at once.
pub fn validate_document(document: &Value) -> Result<ValidatedDocument> {
    let mut validated = DOCUMENT_SCHEMA.validate(document)?;

    let hub = match validated.remove(OPENTHERM) {
        Some(Value::Object(map)) => map,
        _ => return Err(Error::config(format!("validated document has no '{}'", OPENTHERM))),
    };
    let sensor = validated.map_value(SENSOR)?.cloned();

    Ok(ValidatedDocument { hub, sensor })
}

/// Generate code for a validated document.
pub fn generate(document: &ValidatedDocument) -> Result<CodegenContext> {
    let mut ctx = CodegenContext::new();
    hub::to_code(&mut ctx, &document.hub)?;
    if let Some(sensors) = &document.sensor {
        sensor::to_code(&mut ctx, sensors)?;
    }
    Ok(ctx)
}

/// Validate a document and render the generated code.
pub fn compile(document: &Value) -> Result<String> {
    let validated = validate_document(document)?;
    let ctx = generate(&validated)?;
    Ok(ctx.render())
}
