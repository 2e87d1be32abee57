//! Argument validation against a tool's declared schema.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::types::ToolDefinition;
use crate::Result;

/// Check `arguments` against `definition`, walking fields in declaration order
/// and stopping at the first violation.
///
/// Required fields must be present (a JSON `null` counts as absent); any field
/// that is present must have the declared type. Undeclared fields are ignored.
pub fn validate_arguments(definition: &ToolDefinition, arguments: &Map<String, Value>) -> Result<()> {
    for spec in &definition.arguments {
        match arguments.get(&spec.name) {
            None | Some(Value::Null) if spec.required => {
                return Err(Error::missing_argument(&definition.name, &spec.name));
            }
            None | Some(Value::Null) => {}
            Some(value) if !spec.arg_type.accepts(value) => {
                return Err(Error::mistyped_argument(
                    &definition.name,
                    &spec.name,
                    spec.arg_type,
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Arguments as an object; anything else is treated as no arguments.
pub fn arguments_object(arguments: &Value) -> Map<String, Value> {
    match arguments {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}
