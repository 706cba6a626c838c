//! Sensor entities of the OpenTherm hub.

use entigen_core::codegen::{CodegenContext, Variable};
use entigen_core::entity::sensor::{new_sensor, sensor_schema, SENSOR_TYPE};
use entigen_core::schema::{ConfigMap, Schema};
use entigen_core::Result;
use once_cell::sync::Lazy;

use crate::constants::{CONF_DATA_TYPE, SENSOR};
use crate::data_type::MessageDataType;
use crate::generate::{component_to_code, create_only_conf};
use crate::schema::{SensorSchema, SENSORS};
use crate::validate::create_component_schema;

pub const COMPONENT_TYPE: &str = SENSOR;

/// Data types a sensor may override its table default with.
pub const MSG_DATA_TYPES: &[MessageDataType] = MessageDataType::ALL;

/// Schema for one sensor: the numeric sensor schema with the entry's
/// attributes as defaults, plus an optional `data_type`.
pub fn get_entity_validation_schema(entity: &SensorSchema) -> Schema {
    sensor_schema(&entity.options()).optional(CONF_DATA_TYPE, MessageDataType::validator())
}

/// Schema of the `sensor` section.
pub static CONFIG_SCHEMA: Lazy<Schema> =
    Lazy::new(|| create_component_schema(&*SENSORS, get_entity_validation_schema));

/// Create the configured sensors and attach them to the hub.
pub fn to_code(ctx: &mut CodegenContext, config: &ConfigMap) -> Result<Vec<Variable>> {
    component_to_code(
        ctx,
        COMPONENT_TYPE,
        &*SENSORS,
        SENSOR_TYPE,
        create_only_conf(new_sensor),
        config,
    )
}
