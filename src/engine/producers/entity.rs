use super::{DataProducer, ProducerArgs, ProducerArgument, ProducerDefinition};
use crate::engine::cache::CacheMetadata;
use crate::engine::context::ResolveContext;
use crate::engine::resolvers::Resolved;
use crate::engine::value::Value;
use crate::error::Error;
use log::trace;
use std::convert::TryFrom;

pub(super) fn definitions() -> Vec<ProducerDefinition> {
    vec![
        ProducerDefinition::new(
            "entity_load",
            vec![
                ProducerArgument::new("type", true),
                ProducerArgument::new("id", true),
            ],
            entity_load,
        ),
        ProducerDefinition::new(
            "entity_id",
            vec![ProducerArgument::new("entity", true)],
            entity_id,
        ),
    ]
}

fn entity_load(args: ProducerArgs) -> Result<Box<dyn DataProducer>, Error> {
    let entity_type = String::try_from(args.required("type")?.clone())?;
    let id = String::try_from(args.required("id")?.clone())?;

    Ok(Box::new(EntityLoad { entity_type, id }))
}

fn entity_id(args: ProducerArgs) -> Result<Box<dyn DataProducer>, Error> {
    Ok(Box::new(EntityId {
        entity: args.required("entity")?.clone(),
    }))
}

/// Loads an entity from the entity storage.
///
/// A loaded entity is tagged `{type}:{id}`. If no entity exists, the result is null and is
/// tagged `{type}_list`, so that creating entities of the type invalidates it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityLoad {
    entity_type: String,
    id: String,
}

impl DataProducer for EntityLoad {
    fn resolve(&self, _parent: &Value, context: &ResolveContext) -> Result<Resolved, Error> {
        trace!(
            "EntityLoad::resolve called -- entity_type: {}, id: {}",
            self.entity_type,
            self.id
        );
        match context.storage()?.load(&self.entity_type, &self.id)? {
            Some(entity) => Ok(Resolved::new(entity).with_cache_metadata(
                CacheMetadata::new().with_tags(vec![format!("{}:{}", self.entity_type, self.id)]),
            )),
            None => Ok(Resolved::null().with_cache_metadata(
                CacheMetadata::new().with_tags(vec![format!("{}_list", self.entity_type)]),
            )),
        }
    }
}

/// Produces the `id` property of an entity
#[derive(Clone, Debug, PartialEq)]
pub struct EntityId {
    entity: Value,
}

impl DataProducer for EntityId {
    fn resolve(&self, _parent: &Value, _context: &ResolveContext) -> Result<Resolved, Error> {
        Ok(Resolved::new(
            self.entity.get("id").cloned().unwrap_or_default(),
        ))
    }
}
