//! The OpenTherm hub component.
//!
//! The hub owns the bus connection; every entity component attaches to it.

use entigen_core::codegen::{CodegenContext, ConfigExt, CppType, Expression, Variable};
use entigen_core::config::defaults;
use entigen_core::entity::CONF_ID;
use entigen_core::schema::{ConfigMap, Schema, Validator};
use entigen_core::Result;
use once_cell::sync::Lazy;

use crate::constants::{
    CONF_BOOT_PIN, CONF_DEVICE_TIMEOUT, CONF_IN_PIN, CONF_OUT_PIN, CONF_RESET_PIN,
};

/// Runtime type of the hub.
pub const HUB_TYPE: CppType = CppType("opentherm::OpenthermHub");

const HUB_HEADER: &str = "components/opentherm/hub.h";

/// Schema of the `opentherm` section.
pub static CONFIG_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .optional_with_default(CONF_ID, Validator::Id, defaults::HUB_ID)
        .required(CONF_IN_PIN, Validator::Pin)
        .required(CONF_OUT_PIN, Validator::Pin)
        .optional(CONF_BOOT_PIN, Validator::Pin)
        .optional(CONF_RESET_PIN, Validator::Pin)
        .optional(CONF_DEVICE_TIMEOUT, Validator::TimePeriod)
});

/// Declare the hub and configure its pins.
pub fn to_code(ctx: &mut CodegenContext, config: &ConfigMap) -> Result<Variable> {
    let id = config.required_str(CONF_ID)?;

    ctx.add_include(HUB_HEADER);
    ctx.add_define("USE_OPENTHERM", None);

    let hub = ctx.declare_new(id, HUB_TYPE, [])?;
    ctx.add(Expression::call("App.register_component", [hub.expr()]));

    for key in [CONF_IN_PIN, CONF_OUT_PIN, CONF_BOOT_PIN, CONF_RESET_PIN] {
        if let Some(pin) = config.i64_value(key)? {
            ctx.add(hub.call(&format!("set_{}", key), [Expression::int(pin)]));
        }
    }
    if let Some(timeout) = config.u64_value(CONF_DEVICE_TIMEOUT)? {
        ctx.add(hub.call("set_device_timeout", [Expression::uint(timeout)]));
    }

    tracing::info!(hub = id, "Generated OpenTherm hub");
    Ok(hub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_and_pins() {
        let conf = CONFIG_SCHEMA
            .validate(&json!({"in_pin": "GPIO21", "out_pin": 22}))
            .unwrap();
        assert_eq!(conf["id"], "opentherm_hub");
        assert_eq!(conf["in_pin"], 21);
        assert_eq!(conf["out_pin"], 22);
        assert!(!conf.contains_key("boot_pin"));
    }

    #[test]
    fn test_missing_and_bad_pins() {
        let errors = CONFIG_SCHEMA
            .validate(&json!({"in_pin": 50, "device_timeout": "soon"}))
            .unwrap_err();
        let codes: Vec<_> = errors.iter().map(|e| (e.path_string(), e.code())).collect();
        assert_eq!(
            codes,
            vec![
                ("in_pin".to_string(), "OUT_OF_RANGE"),
                ("out_pin".to_string(), "MISSING_REQUIRED"),
                ("device_timeout".to_string(), "INVALID_FORMAT"),
            ]
        );
    }

    #[test]
    fn test_to_code() {
        let conf = CONFIG_SCHEMA
            .validate(&json!({
                "id": "boiler",
                "in_pin": 4,
                "out_pin": 5,
                "reset_pin": 18,
                "device_timeout": "3s"
            }))
            .unwrap();

        let mut ctx = CodegenContext::new();
        let hub = to_code(&mut ctx, &conf).unwrap();

        assert_eq!(hub.id, "boiler");
        assert_eq!(
            ctx.statements(),
            &[
                "boiler = new opentherm::OpenthermHub();".to_string(),
                "App.register_component(boiler);".to_string(),
                "boiler->set_in_pin(4);".to_string(),
                "boiler->set_out_pin(5);".to_string(),
                "boiler->set_reset_pin(18);".to_string(),
                "boiler->set_device_timeout(3000);".to_string(),
            ]
        );
        assert!(ctx.has_define("USE_OPENTHERM"));
    }
}
