//! Tests for the sensor schema adapter.
//!
//! Covers:
//! - Aggregated schema shape
//! - Per-entity defaults
//! - `data_type` membership
//! - Generation only for configured entities

use entigen_core::codegen::CodegenContext;
use entigen_core::entity::sensor::DeviceClass;
use entigen_core::schema::{ConfigMap, Schema, Validator};
use entigen_opentherm::hub::{self, HUB_TYPE};
use entigen_opentherm::message::MessageId;
use entigen_opentherm::sensor::{get_entity_validation_schema, to_code, CONFIG_SCHEMA};
use entigen_opentherm::{MessageDataType, SensorSchema, SENSORS};
use serde_json::{json, Value};

/// Validate `body` as the configuration of a single entity named `key`.
fn validate_entity(
    definition: &SensorSchema,
    key: &str,
    body: Value,
) -> Result<ConfigMap, entigen_core::ValidationErrors> {
    let wrapper =
        Schema::new().optional(key, Validator::Nested(get_entity_validation_schema(definition)));
    let mut document = serde_json::Map::new();
    document.insert(key.to_string(), body);
    wrapper
        .validate(&Value::Object(document))
        .map(|v| v[key].as_object().cloned().unwrap())
}

fn context_with_hub() -> CodegenContext {
    let conf = hub::CONFIG_SCHEMA
        .validate(&json!({"in_pin": 4, "out_pin": 5}))
        .unwrap();
    let mut ctx = CodegenContext::new();
    hub::to_code(&mut ctx, &conf).unwrap();
    ctx
}

#[test]
fn test_aggregated_schema_has_one_key_per_sensor() {
    for name in SENSORS.keys() {
        let matching = CONFIG_SCHEMA.keys().filter(|k| k.name == *name).count();
        assert_eq!(matching, 1, "sensor '{}'", name);
    }
    // the hub reference is the only extra key
    assert_eq!(CONFIG_SCHEMA.len(), SENSORS.len() + 1);
    assert!(CONFIG_SCHEMA.contains_key("opentherm_id"));
}

#[test]
fn test_bare_definition_accepts_only_the_id() {
    let bare = SensorSchema::bare("Anything", MessageId::FeedTemp, true, MessageDataType::F88);

    let conf = validate_entity(&bare, "gauge", json!({"id": "gauge_1"})).unwrap();
    assert_eq!(conf.len(), 1);
    assert_eq!(conf["id"], "gauge_1");
}

#[test]
fn test_data_type_outside_the_set_is_rejected() {
    let errors = validate_entity(&SENSORS["t_boiler"], "t_boiler", json!({"data_type": "u32"}))
        .unwrap_err();

    let err = errors.iter().next().unwrap();
    assert_eq!(err.code(), "INVALID_OPTION");
    assert_eq!(err.path_string(), "t_boiler->data_type");
    assert_eq!(err.details()["value"], "u32");
    assert_eq!(
        err.details()["options"],
        "u8_lb,u8_hb,s8_lb,s8_hb,u8_lb_60,u8_hb_60,u16,s16,f88"
    );
}

#[test]
fn test_data_type_f88_is_accepted() {
    let conf =
        validate_entity(&SENSORS["t_boiler"], "t_boiler", json!({"data_type": "f88"})).unwrap();
    assert_eq!(conf["data_type"], "f88");
}

#[test]
fn test_definition_attributes_round_trip() {
    let definition = SensorSchema {
        unit_of_measurement: Some("°C"),
        accuracy_decimals: Some(1),
        icon: Some("mdi:thermometer"),
        ..SensorSchema::bare("Gauge", MessageId::FeedTemp, true, MessageDataType::F88)
    };

    let conf = validate_entity(
        &definition,
        "gauge",
        json!({
            "id": "gauge_temp",
            "unit_of_measurement": "°C",
            "accuracy_decimals": 1,
            "icon": "mdi:thermometer"
        }),
    )
    .unwrap();

    assert_eq!(conf.len(), 4);
    assert_eq!(conf["id"], "gauge_temp");
    assert_eq!(conf["unit_of_measurement"], "°C");
    assert_eq!(conf["accuracy_decimals"], 1);
    assert_eq!(conf["icon"], "mdi:thermometer");
}

#[test]
fn test_table_defaults_fill_absent_keys() {
    let conf = validate_entity(&SENSORS["ch_pressure"], "ch_pressure", json!({})).unwrap();
    assert_eq!(conf["id"], "ch_pressure_sensor");
    assert_eq!(conf["unit_of_measurement"], "bar");
    assert_eq!(conf["device_class"], DeviceClass::Pressure.as_str());
    assert!(!conf.contains_key("data_type"));
}

#[test]
fn test_generation_only_for_configured_sensors() {
    let config = CONFIG_SCHEMA
        .validate(&json!({"t_boiler": {"name": "Boiler"}}))
        .unwrap();

    let mut ctx = context_with_hub();
    let created = to_code(&mut ctx, &config).unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].id, "t_boiler_sensor");
    assert!(ctx.get_variable("t_dhw_sensor").is_err());

    let statements = ctx.statements();
    let has = |line: &str| statements.iter().any(|s| s == line);
    assert!(has("opentherm_hub->set_t_boiler_sensor(t_boiler_sensor);"));
    assert!(has(
        "opentherm_hub->set_t_boiler_sensor_data_type(opentherm::MessageDataType::F88);"
    ));
    assert!(has(
        "opentherm_hub->add_repeating_message(opentherm::MessageId::FEED_TEMP);"
    ));
    assert!(!statements.iter().any(|s| s.contains("t_dhw")));
}

#[test]
fn test_read_once_messages() {
    let config = CONFIG_SCHEMA
        .validate(&json!({"t_dhw_set_ub": {}, "t_dhw_set_lb": {"data_type": "u8_lb"}}))
        .unwrap();

    let mut ctx = context_with_hub();
    to_code(&mut ctx, &config).unwrap();

    let statements = ctx.statements();
    let registrations: Vec<_> = statements.iter().filter(|s| s.contains("_message(")).collect();
    assert_eq!(
        registrations,
        vec!["opentherm_hub->add_initial_message(opentherm::MessageId::DHW_BOUNDS);"]
    );
    assert!(statements.contains(
        &"opentherm_hub->set_t_dhw_set_lb_sensor_data_type(opentherm::MessageDataType::U8_LB);"
            .to_string()
    ));
    assert_eq!(
        ctx.define("OPENTHERM_SENSOR_LIST(F, sep)"),
        Some("F(t_dhw_set_lb_sensor) sep F(t_dhw_set_ub_sensor)")
    );
}

#[test]
fn test_unknown_hub_reference_is_not_found() {
    let config = CONFIG_SCHEMA
        .validate(&json!({"opentherm_id": "elsewhere", "t_boiler": {}}))
        .unwrap();

    let mut ctx = context_with_hub();
    let err = to_code(&mut ctx, &config).unwrap_err();
    assert!(matches!(err, entigen_core::Error::NotFound(_)));
    assert_eq!(ctx.variables_of_type(HUB_TYPE).len(), 1);
}
