//! Numeric sensor entities.

use super::{entity_base_schema, setup_entity};
use crate::codegen::{CodegenContext, ConfigExt, CppType, Expression, Variable};
use crate::config_enum;
use crate::error::Result;
use crate::schema::{ConfigMap, Schema, Validator};

pub const KIND: &str = "sensor";

pub const CONF_UNIT_OF_MEASUREMENT: &str = "unit_of_measurement";
pub const CONF_ACCURACY_DECIMALS: &str = "accuracy_decimals";
pub const CONF_DEVICE_CLASS: &str = "device_class";
pub const CONF_STATE_CLASS: &str = "state_class";
pub const CONF_FORCE_UPDATE: &str = "force_update";

/// Highest accepted `accuracy_decimals`.
pub const MAX_ACCURACY_DECIMALS: i64 = 6;

/// Runtime type of a sensor.
pub const SENSOR_TYPE: CppType = CppType("sensor::Sensor");

const SENSOR_HEADER: &str = "components/sensor/sensor.h";

config_enum! {
    /// What a sensor measures, as understood by the home automation frontend.
    pub enum DeviceClass {
        ApparentPower => "apparent_power",
        Battery => "battery",
        CarbonDioxide => "carbon_dioxide",
        Current => "current",
        Duration => "duration",
        Energy => "energy",
        Frequency => "frequency",
        Gas => "gas",
        Humidity => "humidity",
        Illuminance => "illuminance",
        Power => "power",
        PowerFactor => "power_factor",
        Pressure => "pressure",
        SignalStrength => "signal_strength",
        Temperature => "temperature",
        Voltage => "voltage",
        Volume => "volume",
        VolumeFlowRate => "volume_flow_rate",
        Water => "water",
    }
}

config_enum! {
    /// How consecutive readings relate to each other.
    pub enum StateClass {
        Measurement => "measurement",
        Total => "total",
        TotalIncreasing => "total_increasing",
    }
}

impl StateClass {
    /// The runtime constant for this state class.
    pub fn cpp_constant(&self) -> &'static str {
        match self {
            StateClass::Measurement => "sensor::STATE_CLASS_MEASUREMENT",
            StateClass::Total => "sensor::STATE_CLASS_TOTAL",
            StateClass::TotalIncreasing => "sensor::STATE_CLASS_TOTAL_INCREASING",
        }
    }
}

/// Defaults for a sensor schema. Only the fields that are set become
/// defaults; unset fields leave their key undefaulted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorOptions {
    pub unit_of_measurement: Option<String>,
    pub accuracy_decimals: Option<i64>,
    pub device_class: Option<DeviceClass>,
    pub icon: Option<String>,
    pub state_class: Option<StateClass>,
}

impl SensorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit_of_measurement = Some(unit.into());
        self
    }

    pub fn with_accuracy_decimals(mut self, decimals: i64) -> Self {
        self.accuracy_decimals = Some(decimals);
        self
    }

    pub fn with_device_class(mut self, class: DeviceClass) -> Self {
        self.device_class = Some(class);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_state_class(mut self, class: StateClass) -> Self {
        self.state_class = Some(class);
        self
    }
}

fn key_with_default<T: Into<serde_json::Value>>(
    schema: Schema,
    name: &str,
    validator: Validator,
    default: Option<T>,
) -> Schema {
    match default {
        Some(value) => schema.optional_with_default(name, validator, value),
        None => schema.optional(name, validator),
    }
}

/// Schema of a numeric sensor.
pub fn sensor_schema(options: &SensorOptions) -> Schema {
    let schema = entity_base_schema(KIND);
    let schema = key_with_default(
        schema,
        super::CONF_ICON,
        Validator::Icon,
        options.icon.clone(),
    );
    let schema = key_with_default(
        schema,
        CONF_UNIT_OF_MEASUREMENT,
        Validator::String,
        options.unit_of_measurement.clone(),
    );
    let schema = key_with_default(
        schema,
        CONF_ACCURACY_DECIMALS,
        Validator::int_range(0, MAX_ACCURACY_DECIMALS),
        options.accuracy_decimals,
    );
    let schema = key_with_default(
        schema,
        CONF_DEVICE_CLASS,
        DeviceClass::validator(),
        options.device_class.map(|c| c.as_str()),
    );
    let schema = key_with_default(
        schema,
        CONF_STATE_CLASS,
        StateClass::validator(),
        options.state_class.map(|c| c.as_str()),
    );
    schema.optional(CONF_FORCE_UPDATE, Validator::Boolean)
}

/// Declare a sensor from its validated configuration and register it with the application.
pub fn new_sensor(ctx: &mut CodegenContext, conf: &ConfigMap) -> Result<Variable> {
    let id = conf.required_str(super::CONF_ID)?;

    ctx.add_include(SENSOR_HEADER);
    ctx.add_define("USE_SENSOR", None);

    let var = ctx.declare_new(id, SENSOR_TYPE, [])?;
    ctx.add(Expression::call("App.register_sensor", [var.expr()]));
    setup_entity(ctx, &var, conf)?;

    if let Some(unit) = conf.str_value(CONF_UNIT_OF_MEASUREMENT)? {
        ctx.add(var.call("set_unit_of_measurement", [Expression::string(unit)]));
    }
    if let Some(decimals) = conf.i64_value(CONF_ACCURACY_DECIMALS)? {
        ctx.add(var.call("set_accuracy_decimals", [Expression::int(decimals)]));
    }
    if let Some(class) = conf.str_value(CONF_DEVICE_CLASS)? {
        ctx.add(var.call("set_device_class", [Expression::string(class)]));
    }
    if let Some(class) = conf.str_value(CONF_STATE_CLASS)? {
        let class: StateClass = class
            .parse()
            .map_err(|e| crate::codegen_err!("{}: {}", CONF_STATE_CLASS, e))?;
        ctx.add(var.call("set_state_class", [Expression::raw(class.cpp_constant())]));
    }
    if let Some(force) = conf.bool_value(CONF_FORCE_UPDATE)? {
        ctx.add(var.call("set_force_update", [Expression::bool(force)]));
    }

    tracing::debug!(id, "Created sensor");
    Ok(var)
}
