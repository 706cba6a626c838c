//! Code generation for entity components.
//!
//! Every entity present in the validated configuration is created through the
//! component's own primitive and then handed to the hub, which needs to know
//! the object, how to decode its message and whether to keep polling it.

use std::collections::BTreeMap;

use entigen_core::codegen::{CodegenContext, ConfigExt, CppType, Expression, Variable};
use entigen_core::schema::ConfigMap;
use entigen_core::{codegen_err, config_err, not_found_err, Result};

use crate::constants::{CONF_DATA_TYPE, CONF_OPENTHERM_ID};
use crate::data_type::MessageDataType;
use crate::hub::HUB_TYPE;
use crate::message::MessageId;
use crate::schema::{EntitySchema, EntityTable};

const DATA_TYPE_ENUM: &str = "opentherm::MessageDataType";
const MESSAGE_ID_ENUM: &str = "opentherm::MessageId";

/// Adapt a primitive that only needs the entity's configuration to the
/// `(key, ctx, conf)` shape used by [`component_to_code`].
pub fn create_only_conf<F>(
    create: F,
) -> impl Fn(&str, &mut CodegenContext, &ConfigMap) -> Result<Variable>
where
    F: Fn(&mut CodegenContext, &ConfigMap) -> Result<Variable>,
{
    move |_key: &str, ctx: &mut CodegenContext, conf: &ConfigMap| create(ctx, conf)
}

/// Find the hub an entity component attaches to.
///
/// An explicit `opentherm_id` wins; otherwise exactly one hub must exist.
pub fn resolve_hub(ctx: &CodegenContext, config: &ConfigMap) -> Result<Variable> {
    if let Some(id) = config.str_value(CONF_OPENTHERM_ID)? {
        let var = ctx.get_variable(id)?;
        if var.ty != HUB_TYPE {
            return Err(codegen_err!(
                "'{}' is a {}, expected {}",
                id,
                var.ty,
                HUB_TYPE
            ));
        }
        return Ok(var.clone());
    }

    let hubs = ctx.variables_of_type(HUB_TYPE);
    match hubs.as_slice() {
        [hub] => Ok((*hub).clone()),
        [] => Err(not_found_err!("no {} hub has been declared", HUB_TYPE)),
        _ => Err(config_err!(
            "{} hubs are declared, set '{}' to choose one",
            hubs.len(),
            CONF_OPENTHERM_ID
        )),
    }
}

/// Create every entity of `table` present in `config` and wire it to the hub.
///
/// Entities absent from the configuration are skipped. Errors from the
/// creation primitive are returned unchanged.
pub fn component_to_code<T, F>(
    ctx: &mut CodegenContext,
    component_type: &str,
    table: &EntityTable<T>,
    runtime_type: CppType,
    create: F,
    config: &ConfigMap,
) -> Result<Vec<Variable>>
where
    T: EntitySchema,
    F: Fn(&str, &mut CodegenContext, &ConfigMap) -> Result<Variable>,
{
    let hub = resolve_hub(ctx, config)?;

    let mut created = Vec::new();
    let mut keys = Vec::new();
    let mut messages: BTreeMap<MessageId, bool> = BTreeMap::new();

    for (key, entity) in table {
        let key: &str = key;
        let Some(entity_conf) = config.map_value(key)? else {
            continue;
        };

        let var = create(key, ctx, entity_conf)?;
        if var.ty != runtime_type {
            return Err(codegen_err!(
                "'{}' was created as {}, expected {}",
                key,
                var.ty,
                runtime_type
            ));
        }

        let data_type = match entity_conf.str_value(CONF_DATA_TYPE)? {
            Some(tag) => tag
                .parse::<MessageDataType>()
                .map_err(|e| codegen_err!("{}->{}: {}", key, CONF_DATA_TYPE, e))?,
            None => entity.message_data(),
        };

        ctx.add(hub.call(
            &format!("set_{}_{}", key, component_type),
            [var.expr()],
        ));
        ctx.add(hub.call(
            &format!("set_{}_{}_data_type", key, component_type),
            [Expression::enum_value(DATA_TYPE_ENUM, data_type.cpp_member())],
        ));

        *messages.entry(entity.message()).or_insert(false) |= entity.keep_updated();
        keys.push(format!("F({}_{})", key, component_type));

        tracing::debug!(
            entity = %key,
            message = %entity.message(),
            data_type = %data_type,
            "Generated {}",
            component_type
        );
        created.push(var);
    }

    let list = (!keys.is_empty()).then(|| keys.join(" sep "));
    ctx.add_define(
        format!("OPENTHERM_{}_LIST(F, sep)", component_type.to_uppercase()),
        list,
    );

    add_messages(ctx, &hub, &messages);

    tracing::info!(
        component = component_type,
        hub = %hub.id,
        entities = created.len(),
        messages = messages.len(),
        "Generated component"
    );
    Ok(created)
}

/// Register each message with the hub, repeating or read once at start-up.
pub fn add_messages(
    ctx: &mut CodegenContext,
    hub: &Variable,
    messages: &BTreeMap<MessageId, bool>,
) {
    for (message, keep_updated) in messages {
        let method = if *keep_updated {
            "add_repeating_message"
        } else {
            "add_initial_message"
        };
        ctx.add(hub.call(
            method,
            [Expression::enum_value(MESSAGE_ID_ENUM, message.name())],
        ));
    }
}
