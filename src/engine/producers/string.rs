use super::{DataProducer, ProducerArgs, ProducerArgument, ProducerDefinition};
use crate::engine::context::ResolveContext;
use crate::engine::resolvers::Resolved;
use crate::engine::value::Value;
use crate::error::Error;

pub(super) fn definitions() -> Vec<ProducerDefinition> {
    vec![ProducerDefinition::new(
        "uppercase",
        vec![ProducerArgument::new("string", true)],
        uppercase,
    )]
}

fn uppercase(args: ProducerArgs) -> Result<Box<dyn DataProducer>, Error> {
    let value = args.required("string")?;
    let string = value
        .as_str()
        .ok_or_else(|| Error::TypeConversionFailed {
            src: value.variant_name().to_string(),
            dst: "String".to_string(),
        })?
        .to_string();

    Ok(Box::new(Uppercase { string }))
}

/// Produces its `string` argument in upper case
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Uppercase {
    string: String,
}

impl DataProducer for Uppercase {
    fn resolve(&self, _parent: &Value, _context: &ResolveContext) -> Result<Resolved, Error> {
        Ok(Resolved::new(self.string.to_uppercase()))
    }
}
