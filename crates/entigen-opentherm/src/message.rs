//! OpenTherm message types and data ids.

use serde::Serialize;

/// The 3-bit message type of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum MessageType {
    ReadData = 0,
    WriteData = 1,
    InvalidData = 2,
    ReadAck = 4,
    WriteAck = 5,
    DataInvalid = 6,
    UnknownDataid = 7,
}

impl MessageType {
    /// Returns `None` for the reserved value 3 and anything wider than 3 bits.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::ReadData),
            1 => Some(Self::WriteData),
            2 => Some(Self::InvalidData),
            4 => Some(Self::ReadAck),
            5 => Some(Self::WriteAck),
            6 => Some(Self::DataInvalid),
            7 => Some(Self::UnknownDataid),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ReadData => "READ_DATA",
            Self::WriteData => "WRITE_DATA",
            Self::InvalidData => "INVALID_DATA",
            Self::ReadAck => "READ_ACK",
            Self::WriteAck => "WRITE_ACK",
            Self::DataInvalid => "DATA_INVALID",
            Self::UnknownDataid => "UNKNOWN_DATAID",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! message_ids {
    ($($variant:ident = $value:literal => $name:literal),+ $(,)?) => {
        /// Data id of an OpenTherm message.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[repr(u8)]
        pub enum MessageId {
            $($variant = $value),+
        }

        impl MessageId {
            /// Every known id, in ascending order.
            pub const ALL: &'static [MessageId] = &[$(MessageId::$variant),+];

            /// `None` for ids this component does not know.
            pub fn from_u8(value: u8) -> Option<Self> {
                match value {
                    $($value => Some(MessageId::$variant),)+
                    _ => None,
                }
            }

            /// Protocol name, e.g. `FEED_TEMP`.
            pub fn name(&self) -> &'static str {
                match self {
                    $(MessageId::$variant => $name),+
                }
            }
        }
    };
}

message_ids! {
    Status = 0 => "STATUS",
    ChSetpoint = 1 => "CH_SETPOINT",
    ControllerConfig = 2 => "CONTROLLER_CONFIG",
    DeviceConfig = 3 => "DEVICE_CONFIG",
    CommandCode = 4 => "COMMAND_CODE",
    FaultFlags = 5 => "FAULT_FLAGS",
    Remote = 6 => "REMOTE",
    CoolingControl = 7 => "COOLING_CONTROL",
    Ch2Setpoint = 8 => "CH2_SETPOINT",
    ChSetpointOverride = 9 => "CH_SETPOINT_OVERRIDE",
    TspCount = 10 => "TSP_COUNT",
    TspCommand = 11 => "TSP_COMMAND",
    FhbSize = 12 => "FHB_SIZE",
    FhbCommand = 13 => "FHB_COMMAND",
    MaxModulationLevel = 14 => "MAX_MODULATION_LEVEL",
    MaxBoilerCapacity = 15 => "MAX_BOILER_CAPACITY",
    RoomSetpoint = 16 => "ROOM_SETPOINT",
    ModulationLevel = 17 => "MODULATION_LEVEL",
    ChWaterPressure = 18 => "CH_WATER_PRESSURE",
    DhwFlowRate = 19 => "DHW_FLOW_RATE",
    DayTime = 20 => "DAY_TIME",
    Date = 21 => "DATE",
    Year = 22 => "YEAR",
    RoomSetpointCh2 = 23 => "ROOM_SETPOINT_CH2",
    RoomTemp = 24 => "ROOM_TEMP",
    FeedTemp = 25 => "FEED_TEMP",
    DhwTemp = 26 => "DHW_TEMP",
    OutsideTemp = 27 => "OUTSIDE_TEMP",
    ReturnWaterTemp = 28 => "RETURN_WATER_TEMP",
    SolarStoreTemp = 29 => "SOLAR_STORE_TEMP",
    SolarCollectTemp = 30 => "SOLAR_COLLECT_TEMP",
    FeedTempCh2 = 31 => "FEED_TEMP_CH2",
    Dhw2Temp = 32 => "DHW2_TEMP",
    ExhaustTemp = 33 => "EXHAUST_TEMP",
    FanSpeed = 35 => "FAN_SPEED",
    FlameCurrent = 36 => "FLAME_CURRENT",
    RoomTempCh2 = 37 => "ROOM_TEMP_CH2",
    RelHumidity = 38 => "REL_HUMIDITY",
    DhwBounds = 48 => "DHW_BOUNDS",
    ChBounds = 49 => "CH_BOUNDS",
    OtcCurveBounds = 50 => "OTC_CURVE_BOUNDS",
    DhwSetpoint = 56 => "DHW_SETPOINT",
    MaxChSetpoint = 57 => "MAX_CH_SETPOINT",
    OtcCurveRatio = 58 => "OTC_CURVE_RATIO",
    HvacStatus = 70 => "HVAC_STATUS",
    RelVentSetpoint = 71 => "REL_VENT_SETPOINT",
    DeviceVent = 74 => "DEVICE_VENT",
    HvacVerId = 75 => "HVAC_VER_ID",
    RelVentilation = 77 => "REL_VENTILATION",
    RelHumidExhaust = 78 => "REL_HUMID_EXHAUST",
    ExhaustCo2 = 79 => "EXHAUST_CO2",
    SupplyInletTemp = 80 => "SUPPLY_INLET_TEMP",
    SupplyOutletTemp = 81 => "SUPPLY_OUTLET_TEMP",
    ExhaustInletTemp = 82 => "EXHAUST_INLET_TEMP",
    ExhaustOutletTemp = 83 => "EXHAUST_OUTLET_TEMP",
    ExhaustFanSpeed = 84 => "EXHAUST_FAN_SPEED",
    SupplyFanSpeed = 85 => "SUPPLY_FAN_SPEED",
    RemoteVentilationParam = 86 => "REMOTE_VENTILATION_PARAM",
    NomRelVentilation = 87 => "NOM_REL_VENTILATION",
    HvacNumTsp = 88 => "HVAC_NUM_TSP",
    HvacIdxTsp = 89 => "HVAC_IDX_TSP",
    HvacFhbSize = 90 => "HVAC_FHB_SIZE",
    HvacFhbIdx = 91 => "HVAC_FHB_IDX",
    RfSignal = 98 => "RF_SIGNAL",
    DhwMode = 99 => "DHW_MODE",
    OverrideFunc = 100 => "OVERRIDE_FUNC",
    SolarModeFlags = 101 => "SOLAR_MODE_FLAGS",
    SolarAsf = 102 => "SOLAR_ASF",
    SolarVersionId = 103 => "SOLAR_VERSION_ID",
    SolarProductId = 104 => "SOLAR_PRODUCT_ID",
    SolarNumTsp = 105 => "SOLAR_NUM_TSP",
    SolarIdxTsp = 106 => "SOLAR_IDX_TSP",
    SolarFhbSize = 107 => "SOLAR_FHB_SIZE",
    SolarFhbIdx = 108 => "SOLAR_FHB_IDX",
    SolarStarts = 109 => "SOLAR_STARTS",
    SolarHours = 110 => "SOLAR_HOURS",
    SolarEnergy = 111 => "SOLAR_ENERGY",
    SolarTotalEnergy = 112 => "SOLAR_TOTAL_ENERGY",
    FailedBurnerStarts = 113 => "FAILED_BURNER_STARTS",
    BurnerFlameLow = 114 => "BURNER_FLAME_LOW",
    OemDiagnostic = 115 => "OEM_DIAGNOSTIC",
    BurnerStarts = 116 => "BURNER_STARTS",
    ChPumpStarts = 117 => "CH_PUMP_STARTS",
    DhwPumpStarts = 118 => "DHW_PUMP_STARTS",
    DhwBurnerStarts = 119 => "DHW_BURNER_STARTS",
    BurnerHours = 120 => "BURNER_HOURS",
    ChPumpHours = 121 => "CH_PUMP_HOURS",
    DhwPumpHours = 122 => "DHW_PUMP_HOURS",
    DhwBurnerHours = 123 => "DHW_BURNER_HOURS",
    OtVersionController = 124 => "OT_VERSION_CONTROLLER",
    OtVersionDevice = 125 => "OT_VERSION_DEVICE",
    VersionController = 126 => "VERSION_CONTROLLER",
    VersionDevice = 127 => "VERSION_DEVICE",
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_reserved_value() {
        assert_eq!(MessageType::from_u8(4), Some(MessageType::ReadAck));
        assert_eq!(MessageType::from_u8(3), None);
        assert_eq!(MessageType::from_u8(8), None);
    }

    #[test]
    fn test_message_id_lookup() {
        assert_eq!(MessageId::from_u8(25), Some(MessageId::FeedTemp));
        assert_eq!(MessageId::FeedTemp.name(), "FEED_TEMP");
        assert_eq!(MessageId::from_u8(34), None);
        assert_eq!(MessageId::from_u8(200), None);
    }

    #[test]
    fn test_message_ids_are_ascending_and_roundtrip() {
        for pair in MessageId::ALL.windows(2) {
            assert!((pair[0] as u8) < (pair[1] as u8));
        }
        for id in MessageId::ALL {
            assert_eq!(MessageId::from_u8(*id as u8), Some(*id));
        }
    }

    #[test]
    fn test_serialized_names_match_protocol_names() {
        for id in MessageId::ALL {
            let json = serde_json::to_string(id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.name()));
        }
        assert_eq!(
            serde_json::to_string(&MessageType::UnknownDataid).unwrap(),
            "\"UNKNOWN_DATAID\""
        );
    }
}
