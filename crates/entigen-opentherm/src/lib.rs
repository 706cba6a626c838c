//! OpenTherm component for entigen.
//!
//! Validates the `opentherm` hub and `sensor` sections of a device
//! configuration and generates the code that creates the hub and its
//! sensors. Also models the OpenTherm frame so raw bus words can be decoded
//! the same way the generated firmware decodes them, and the serial packet
//! protocol used to exchange those words with the adapter board.
//!
//! ```rust
//! use serde_json::json;
//!
//! let code = entigen_opentherm::compile(&json!({
//!     "opentherm": {"in_pin": 4, "out_pin": 5},
//!     "sensor": {"t_boiler": {"name": "Boiler water"}}
//! }))
//! .unwrap();
//!
//! assert!(code.contains("opentherm_hub->set_t_boiler_sensor(t_boiler_sensor);"));
//! ```

pub mod compile;
pub mod constants;
pub mod data_type;
pub mod frame;
pub mod generate;
pub mod hub;
pub mod message;
pub mod protocol;
pub mod schema;
pub mod sensor;
pub mod validate;

pub use compile::{compile, generate, validate_document, ValidatedDocument};
pub use data_type::MessageDataType;
pub use frame::{Frame, FrameError};
pub use message::{MessageId, MessageType};
pub use protocol::{Event, Packet, PacketDecoder, PacketError};
pub use schema::{EntitySchema, EntityTable, SensorSchema, SENSORS};
