//! Configuration keys and component names.

pub const OPENTHERM: &str = "opentherm";
pub const SENSOR: &str = "sensor";

pub const CONF_OPENTHERM_ID: &str = "opentherm_id";
pub const CONF_DATA_TYPE: &str = "data_type";

// Hub
pub const CONF_IN_PIN: &str = "in_pin";
pub const CONF_OUT_PIN: &str = "out_pin";
pub const CONF_BOOT_PIN: &str = "boot_pin";
pub const CONF_RESET_PIN: &str = "reset_pin";
pub const CONF_DEVICE_TIMEOUT: &str = "device_timeout";
