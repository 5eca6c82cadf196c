//! Instruction execution: selector → device handler → property → every
//! selected device, in order.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::command::{Instruction, Selector};
use crate::device::{Device, DeviceId, Host};
use crate::error::{EngineError, Result};
use crate::model::{AggregationMode, ComparisonType, Direction, Operation, Primitive, Property, ReturnType};
use crate::registry::{BlockHandler, HandlerRegistry};

/// "if the hangar lights are on": compare one property across a selection and
/// fold the per-device results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BlockCondition {
    pub selector: Selector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub comparison: ComparisonType,
    pub expected: Primitive,
    #[serde(default = "default_aggregation")]
    pub aggregation: AggregationMode,
}

fn default_aggregation() -> AggregationMode {
    AggregationMode::All
}

#[derive(Clone)]
pub struct Engine {
    registry: Arc<HandlerRegistry>,
}

impl Engine {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Run one instruction. Returns one value per selected device for `Get`,
    /// nothing otherwise.
    ///
    /// Devices are updated one at a time. If device *k* fails, devices before
    /// it keep their new state and the rest are left alone.
    pub fn execute(&self, host: &mut dyn Host, instruction: &Instruction) -> Result<Vec<Primitive>> {
        let handler = self.registry.handler(instruction.selector.block_type)?;
        let property = handler.resolve(
            instruction.property,
            instruction.direction,
            implied_value_type(instruction),
        )?;
        let targets = handler.select_instances(host, &instruction.selector)?;

        let mut results = Vec::new();
        for (applied, &id) in targets.iter().enumerate() {
            let outcome = device_at(host, id, &instruction.selector).and_then(|device| {
                handler.apply(
                    device,
                    instruction.operation,
                    property,
                    instruction.direction,
                    instruction.value.as_ref(),
                )
            });
            match outcome {
                Ok(Some(value)) => results.push(value),
                Ok(None) => {}
                Err(e) => {
                    if applied > 0 {
                        tracing::warn!(
                            selector = %instruction.selector,
                            %property,
                            applied,
                            remaining = targets.len() - applied,
                            "instruction failed partway through the selection"
                        );
                    }
                    return Err(e);
                }
            }
        }
        Ok(results)
    }

    /// Evaluate a block condition against the current device state. An empty
    /// selection folds like an empty list: ALL and NONE hold, ANY does not.
    pub fn evaluate_condition(&self, host: &mut dyn Host, condition: &BlockCondition) -> Result<bool> {
        let handler = self.registry.handler(condition.selector.block_type)?;
        let property = handler.resolve(
            condition.property,
            condition.direction,
            Some(condition.expected.return_type()),
        )?;
        let targets = handler.select_instances(host, &condition.selector)?;

        let mut results = Vec::with_capacity(targets.len());
        for id in targets {
            let device = device_at(host, id, &condition.selector)?;
            let actual = read(handler, device, property, condition.direction)?;
            results.push(condition.comparison.compare(&actual, &condition.expected)?);
        }
        Ok(condition.aggregation.aggregate(results))
    }
}

/// Value type used for default-property resolution. Instructions without a
/// value other than a bare set address the numeric default.
fn implied_value_type(instruction: &Instruction) -> Option<ReturnType> {
    match (&instruction.value, instruction.operation) {
        (Some(value), _) => Some(value.return_type()),
        (None, Operation::Set) => None,
        (None, _) => Some(ReturnType::Numeric),
    }
}

fn device_at<'h>(host: &'h mut dyn Host, id: DeviceId, selector: &Selector) -> Result<&'h mut dyn Device> {
    host.device_mut(id).ok_or_else(|| EngineError::UnknownSelector {
        selector: selector.to_string(),
    })
}

fn read(
    handler: &dyn BlockHandler,
    device: &mut dyn Device,
    property: Property,
    direction: Option<Direction>,
) -> Result<Primitive> {
    handler
        .apply(device, Operation::Get, property, direction, None)?
        .ok_or_else(|| EngineError::invalid(format!("{property} produced no value")))
}
