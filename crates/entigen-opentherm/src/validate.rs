//! Component-level schema aggregation.

use entigen_core::schema::{Schema, Validator};

use crate::constants::CONF_OPENTHERM_ID;
use crate::hub::HUB_TYPE;
use crate::schema::EntityTable;

/// One optional nested key per table entry, plus the hub reference.
pub fn create_component_schema<T>(
    table: &EntityTable<T>,
    entity_schema: impl Fn(&T) -> Schema,
) -> Schema {
    let hub_ref = Schema::new().optional(
        CONF_OPENTHERM_ID,
        Validator::UseId {
            type_name: HUB_TYPE.to_string(),
        },
    );

    table.iter().fold(hub_ref, |schema, (key, entity)| {
        schema.optional(*key, Validator::Nested(entity_schema(entity)))
    })
}
