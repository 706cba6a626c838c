//! Static entity tables.
//!
//! Each entry describes one value the boiler exposes: where it comes from on
//! the bus, how its payload decodes, and the presentation defaults the
//! entity schema starts from.

use std::collections::BTreeMap;

use entigen_core::entity::sensor::{DeviceClass, SensorOptions, StateClass};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::data_type::MessageDataType;
use crate::message::MessageId;

/// Name-keyed entity table. Every name appears once and iteration is sorted.
pub type EntityTable<T> = BTreeMap<&'static str, T>;

/// What code generation needs to know about any table entry.
pub trait EntitySchema {
    /// Message the value is read from.
    fn message(&self) -> MessageId;

    /// Poll repeatedly instead of reading once at start-up.
    fn keep_updated(&self) -> bool;

    /// Payload decoding used when the configuration does not override it.
    fn message_data(&self) -> MessageDataType;
}

/// A sensor the hub can publish.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSchema {
    pub description: &'static str,
    pub unit_of_measurement: Option<&'static str>,
    pub accuracy_decimals: Option<i64>,
    pub device_class: Option<DeviceClass>,
    pub icon: Option<&'static str>,
    pub state_class: Option<StateClass>,
    pub message: MessageId,
    pub keep_updated: bool,
    pub message_data: MessageDataType,
}

impl SensorSchema {
    /// A definition with no presentation attributes.
    pub const fn bare(
        description: &'static str,
        message: MessageId,
        keep_updated: bool,
        message_data: MessageDataType,
    ) -> Self {
        Self {
            description,
            unit_of_measurement: None,
            accuracy_decimals: None,
            device_class: None,
            icon: None,
            state_class: None,
            message,
            keep_updated,
            message_data,
        }
    }

    /// Presentation attributes that are set, as sensor schema options.
    pub fn options(&self) -> SensorOptions {
        let mut options = SensorOptions::new();
        if let Some(unit) = self.unit_of_measurement {
            options = options.with_unit(unit);
        }
        if let Some(decimals) = self.accuracy_decimals {
            options = options.with_accuracy_decimals(decimals);
        }
        if let Some(class) = self.device_class {
            options = options.with_device_class(class);
        }
        if let Some(icon) = self.icon {
            options = options.with_icon(icon);
        }
        if let Some(class) = self.state_class {
            options = options.with_state_class(class);
        }
        options
    }
}

impl EntitySchema for SensorSchema {
    fn message(&self) -> MessageId {
        self.message
    }

    fn keep_updated(&self) -> bool {
        self.keep_updated
    }

    fn message_data(&self) -> MessageDataType {
        self.message_data
    }
}

const UNIT_CELSIUS: &str = "°C";
const UNIT_PERCENT: &str = "%";
const UNIT_HOURS: &str = "h";

fn temperature(
    description: &'static str,
    message: MessageId,
    data: MessageDataType,
) -> SensorSchema {
    SensorSchema {
        unit_of_measurement: Some(UNIT_CELSIUS),
        accuracy_decimals: Some(2),
        device_class: Some(DeviceClass::Temperature),
        state_class: Some(StateClass::Measurement),
        ..SensorSchema::bare(description, message, true, data)
    }
}

fn bound(description: &'static str, message: MessageId, data: MessageDataType) -> SensorSchema {
    SensorSchema {
        unit_of_measurement: Some(UNIT_CELSIUS),
        accuracy_decimals: Some(0),
        device_class: Some(DeviceClass::Temperature),
        ..SensorSchema::bare(description, message, false, data)
    }
}

fn counter(description: &'static str, message: MessageId) -> SensorSchema {
    SensorSchema {
        accuracy_decimals: Some(0),
        icon: Some("mdi:counter"),
        state_class: Some(StateClass::TotalIncreasing),
        ..SensorSchema::bare(description, message, true, MessageDataType::U16)
    }
}

fn hours(description: &'static str, message: MessageId) -> SensorSchema {
    SensorSchema {
        unit_of_measurement: Some(UNIT_HOURS),
        accuracy_decimals: Some(0),
        device_class: Some(DeviceClass::Duration),
        state_class: Some(StateClass::TotalIncreasing),
        ..SensorSchema::bare(description, message, true, MessageDataType::U16)
    }
}

/// Every sensor the OpenTherm hub can publish.
pub static SENSORS: Lazy<EntityTable<SensorSchema>> = Lazy::new(|| {
    use MessageDataType::*;

    let mut table = EntityTable::new();

    table.insert(
        "rel_mod_level",
        SensorSchema {
            unit_of_measurement: Some(UNIT_PERCENT),
            accuracy_decimals: Some(2),
            icon: Some("mdi:percent"),
            state_class: Some(StateClass::Measurement),
            ..SensorSchema::bare("Relative modulation level", MessageId::ModulationLevel, true, F88)
        },
    );
    table.insert(
        "ch_pressure",
        SensorSchema {
            unit_of_measurement: Some("bar"),
            accuracy_decimals: Some(2),
            device_class: Some(DeviceClass::Pressure),
            state_class: Some(StateClass::Measurement),
            ..SensorSchema::bare(
                "Water pressure in CH circuit",
                MessageId::ChWaterPressure,
                true,
                F88,
            )
        },
    );
    table.insert(
        "dhw_flow_rate",
        SensorSchema {
            unit_of_measurement: Some("L/min"),
            accuracy_decimals: Some(2),
            device_class: Some(DeviceClass::VolumeFlowRate),
            state_class: Some(StateClass::Measurement),
            ..SensorSchema::bare(
                "Water flow rate in DHW circuit",
                MessageId::DhwFlowRate,
                true,
                F88,
            )
        },
    );

    table.insert("t_boiler", temperature("Boiler water temperature", MessageId::FeedTemp, F88));
    table.insert("t_dhw", temperature("DHW temperature", MessageId::DhwTemp, F88));
    table.insert("t_outside", temperature("Outside temperature", MessageId::OutsideTemp, F88));
    table.insert("t_ret", temperature("Return water temperature", MessageId::ReturnWaterTemp, F88));
    table.insert(
        "t_storage",
        temperature("Solar storage temperature", MessageId::SolarStoreTemp, F88),
    );
    table.insert(
        "t_collector",
        temperature("Solar collector temperature", MessageId::SolarCollectTemp, S16),
    );
    table.insert(
        "t_flow_ch2",
        temperature("Flow water temperature CH2 circuit", MessageId::FeedTempCh2, F88),
    );
    table.insert(
        "t_dhw2",
        temperature("Domestic hot water temperature 2", MessageId::Dhw2Temp, F88),
    );
    table.insert(
        "t_exhaust",
        SensorSchema {
            accuracy_decimals: Some(0),
            ..temperature("Boiler exhaust temperature", MessageId::ExhaustTemp, S16)
        },
    );

    table.insert(
        "fan_speed",
        SensorSchema {
            unit_of_measurement: Some("RPM"),
            accuracy_decimals: Some(0),
            icon: Some("mdi:fan"),
            state_class: Some(StateClass::Measurement),
            ..SensorSchema::bare("Boiler fan speed", MessageId::FanSpeed, true, U16)
        },
    );
    table.insert(
        "flame_current",
        SensorSchema {
            unit_of_measurement: Some("µA"),
            accuracy_decimals: Some(2),
            device_class: Some(DeviceClass::Current),
            state_class: Some(StateClass::Measurement),
            ..SensorSchema::bare("Boiler flame current", MessageId::FlameCurrent, true, F88)
        },
    );

    table.insert("burner_starts", counter("Number of starts burner", MessageId::BurnerStarts));
    table.insert("ch_pump_starts", counter("Number of starts CH pump", MessageId::ChPumpStarts));
    table.insert(
        "dhw_pump_valve_starts",
        counter("Number of starts DHW pump/valve", MessageId::DhwPumpStarts),
    );
    table.insert(
        "dhw_burner_starts",
        counter("Number of starts burner during DHW mode", MessageId::DhwBurnerStarts),
    );
    table.insert(
        "failed_burner_starts",
        counter("Number of unsuccessful burner starts", MessageId::FailedBurnerStarts),
    );
    table.insert(
        "burner_flame_low",
        counter("Number of times flame signal was too low", MessageId::BurnerFlameLow),
    );
    table.insert(
        "burner_operation_hours",
        hours("Number of hours that burner is in operation", MessageId::BurnerHours),
    );
    table.insert(
        "ch_pump_operation_hours",
        hours("Number of hours that CH pump has been running", MessageId::ChPumpHours),
    );
    table.insert(
        "dhw_pump_valve_operation_hours",
        hours(
            "Number of hours that DHW pump has been running or DHW valve has been opened",
            MessageId::DhwPumpHours,
        ),
    );
    table.insert(
        "dhw_burner_operation_hours",
        hours(
            "Number of hours that burner is in operation during DHW mode",
            MessageId::DhwBurnerHours,
        ),
    );

    table.insert(
        "t_dhw_set_ub",
        bound("Upper bound for adjustment of DHW setpoint", MessageId::DhwBounds, S8Hb),
    );
    table.insert(
        "t_dhw_set_lb",
        bound("Lower bound for adjustment of DHW setpoint", MessageId::DhwBounds, S8Lb),
    );
    table.insert(
        "max_t_set_ub",
        bound("Upper bound for adjustment of max CH setpoint", MessageId::ChBounds, S8Hb),
    );
    table.insert(
        "max_t_set_lb",
        bound("Lower bound for adjustment of max CH setpoint", MessageId::ChBounds, S8Lb),
    );
    table.insert(
        "t_dhw_set",
        SensorSchema {
            accuracy_decimals: Some(1),
            state_class: None,
            ..temperature("Domestic hot water temperature setpoint", MessageId::DhwSetpoint, F88)
        },
    );
    table.insert(
        "max_t_set",
        SensorSchema {
            accuracy_decimals: Some(1),
            state_class: None,
            ..temperature("Maximum allowable CH water setpoint", MessageId::MaxChSetpoint, F88)
        },
    );

    table.insert(
        "oem_fault_code",
        SensorSchema::bare("OEM fault code", MessageId::FaultFlags, true, U8Lb),
    );
    table.insert(
        "oem_diagnostic_code",
        SensorSchema::bare("OEM diagnostic code", MessageId::OemDiagnostic, true, U16),
    );
    table.insert(
        "max_capacity",
        SensorSchema {
            unit_of_measurement: Some("kW"),
            accuracy_decimals: Some(0),
            device_class: Some(DeviceClass::Power),
            ..SensorSchema::bare(
                "Maximum boiler capacity (kW)",
                MessageId::MaxBoilerCapacity,
                false,
                U8Hb,
            )
        },
    );
    table.insert(
        "min_mod_level",
        SensorSchema {
            unit_of_measurement: Some(UNIT_PERCENT),
            accuracy_decimals: Some(0),
            icon: Some("mdi:percent"),
            ..SensorSchema::bare(
                "Minimum modulation level",
                MessageId::MaxBoilerCapacity,
                false,
                U8Lb,
            )
        },
    );
    table.insert(
        "opentherm_version_device",
        SensorSchema {
            accuracy_decimals: Some(1),
            ..SensorSchema::bare(
                "Version of OpenTherm implemented by device",
                MessageId::OtVersionDevice,
                false,
                F88,
            )
        },
    );
    table.insert(
        "device_type",
        SensorSchema::bare("Device product type", MessageId::VersionDevice, false, U8Hb),
    );
    table.insert(
        "device_version",
        SensorSchema::bare("Device product version", MessageId::VersionDevice, false, U8Lb),
    );

    table
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_unique() {
        let names: Vec<_> = SENSORS.keys().copied().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names, sorted);
        assert!(SENSORS.len() >= 30);
    }

    #[test]
    fn test_options_only_carry_set_attributes() {
        let boiler = &SENSORS["t_boiler"];
        let options = boiler.options();
        assert_eq!(options.unit_of_measurement.as_deref(), Some("°C"));
        assert_eq!(options.accuracy_decimals, Some(2));
        assert_eq!(options.device_class, Some(DeviceClass::Temperature));
        assert_eq!(options.icon, None);

        let bare = &SENSORS["oem_fault_code"];
        assert_eq!(bare.options(), SensorOptions::default());
    }

    #[test]
    fn test_bounds_share_a_message() {
        assert_eq!(SENSORS["t_dhw_set_ub"].message, MessageId::DhwBounds);
        assert_eq!(SENSORS["t_dhw_set_lb"].message, MessageId::DhwBounds);
        assert_eq!(SENSORS["t_dhw_set_ub"].message_data, MessageDataType::S8Hb);
        assert!(!SENSORS["t_dhw_set_ub"].keep_updated);
    }
}
