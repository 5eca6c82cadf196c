use indexmap::IndexMap;
use schemars::schema_for;
use serde::Serialize;
use serde_json::Value;

use super::HandlerRegistry;
use crate::command::CommandParameter;
use crate::model::{BlockType, Direction, HandlerSlot, Property, ReturnType};

/// What one registered block type supports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub block_type: BlockType,
    pub properties: Vec<PropertyEntry>,
    pub defaults_by_type: IndexMap<ReturnType, Property>,
    pub defaults_by_direction: IndexMap<Direction, Property>,
    pub default_direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyEntry {
    pub property: Property,
    pub operations: Vec<HandlerSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

impl CatalogEntry {
    pub fn property(&self, property: Property) -> Option<&PropertyEntry> {
        self.properties.iter().find(|p| p.property == property)
    }
}

/// Catalog of every registered block type, in registration order.
pub fn catalog(registry: &HandlerRegistry) -> Vec<CatalogEntry> {
    registry.handlers().map(|h| h.catalog_entry()).collect()
}

/// JSON schema of an instruction file: a list of parameter sequences, one per
/// instruction.
pub fn instruction_schema() -> Value {
    let root = schema_for!(Vec<Vec<CommandParameter>>);
    serde_json::to_value(root).unwrap_or_else(|_| serde_json::json!({ "type": "array" }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_lists_every_block_type() {
        let registry = HandlerRegistry::standard();
        let entries = catalog(&registry);
        let types: Vec<BlockType> = entries.iter().map(|e| e.block_type).collect();
        assert_eq!(types, BlockType::ALL.to_vec());
    }

    #[test]
    fn catalog_reports_operations_and_defaults() {
        let registry = HandlerRegistry::standard();
        let entries = catalog(&registry);
        let light = entries.iter().find(|e| e.block_type == BlockType::Light).unwrap();

        let intensity = light.property(Property::Intensity).unwrap();
        assert!(intensity.operations.contains(&HandlerSlot::Increment));
        assert_eq!(intensity.step, Some(1.0));
        assert_eq!(light.defaults_by_type.get(&ReturnType::Numeric), Some(&Property::Intensity));

        let cockpit = entries.iter().find(|e| e.block_type == BlockType::Cockpit).unwrap();
        let mass = cockpit.property(Property::Level).unwrap();
        assert_eq!(mass.operations, vec![HandlerSlot::Get]);
    }

    #[test]
    fn schema_describes_parameter_sequences() {
        let schema = instruction_schema();
        assert_eq!(schema["type"], "array");
        let text = schema.to_string();
        assert!(text.contains("numeric_property"));
        assert!(text.contains("selector"));
    }
}
