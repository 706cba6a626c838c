//! Base schemas shared by every entity kind.
//!
//! An entity is one externally observable object (a sensor, a switch, ...).
//! Each kind builds on [`entity_base_schema`] and applies the common keys
//! through [`setup_entity`].

pub mod sensor;

use crate::codegen::{CodegenContext, ConfigExt, Expression, Variable};
use crate::error::Result;
use crate::schema::{ConfigMap, Schema, Validator};

pub const CONF_ID: &str = "id";
pub const CONF_NAME: &str = "name";
pub const CONF_INTERNAL: &str = "internal";
pub const CONF_DISABLED_BY_DEFAULT: &str = "disabled_by_default";
pub const CONF_ICON: &str = "icon";

/// Keys every entity accepts. The id is generated as `<entity>_<kind>`.
pub fn entity_base_schema(kind: &str) -> Schema {
    Schema::new()
        .generate_id(kind)
        .optional(CONF_NAME, Validator::String)
        .optional(CONF_INTERNAL, Validator::Boolean)
        .optional(CONF_DISABLED_BY_DEFAULT, Validator::Boolean)
        .optional(CONF_ICON, Validator::Icon)
}

/// Emit setters for the keys of [`entity_base_schema`] that are present.
pub fn setup_entity(ctx: &mut CodegenContext, var: &Variable, conf: &ConfigMap) -> Result<()> {
    if let Some(name) = conf.str_value(CONF_NAME)? {
        ctx.add(var.call("set_name", [Expression::string(name)]));
    }
    if let Some(internal) = conf.bool_value(CONF_INTERNAL)? {
        ctx.add(var.call("set_internal", [Expression::bool(internal)]));
    }
    if let Some(disabled) = conf.bool_value(CONF_DISABLED_BY_DEFAULT)? {
        ctx.add(var.call("set_disabled_by_default", [Expression::bool(disabled)]));
    }
    if let Some(icon) = conf.str_value(CONF_ICON)? {
        ctx.add(var.call("set_icon", [Expression::string(icon)]));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::CppType;
    use serde_json::json;

    #[test]
    fn test_base_schema_keys() {
        let schema = entity_base_schema("switch");
        let names: Vec<_> = schema.keys().map(|k| k.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["id", "name", "internal", "disabled_by_default", "icon"]
        );
        assert!(schema.keys().all(|k| !k.is_required()));
    }

    #[test]
    fn test_setup_entity_only_emits_present_keys() {
        let conf = json!({"id": "pump", "name": "Pump", "internal": true})
            .as_object()
            .cloned()
            .unwrap();

        let mut ctx = CodegenContext::new();
        let var = ctx.declare_new("pump", CppType("switch_::Switch"), []).unwrap();
        setup_entity(&mut ctx, &var, &conf).unwrap();

        assert_eq!(
            &ctx.statements()[1..],
            &[
                "pump->set_name(\"Pump\");".to_string(),
                "pump->set_internal(true);".to_string(),
            ]
        );
    }
}
