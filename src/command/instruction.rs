use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::params::{extract_all, extract_first, CommandParameter, Selector};
use crate::error::{EngineError, Result};
use crate::model::{Direction, Operation, Primitive, Property, UnitType};

/// One device instruction, assembled from a parameter sequence: which devices,
/// which property (if named), which direction, what value, and what to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Instruction {
    pub selector: Selector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Primitive>,
    pub operation: Operation,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PropertyKind {
    Boolean,
    Other,
}

impl Instruction {
    pub fn new(selector: Selector, operation: Operation) -> Self {
        Self {
            selector,
            property: None,
            direction: None,
            value: None,
            operation,
        }
    }

    pub fn get(selector: Selector) -> Self {
        Self::new(selector, Operation::Get)
    }

    pub fn set(selector: Selector, value: impl Into<Primitive>) -> Self {
        Self::new(selector, Operation::Set).with_value(value)
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.property = Some(property);
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_value(mut self, value: impl Into<Primitive>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Assemble an instruction from a parsed parameter sequence.
    ///
    /// The first selector is required. The first property reference, direction,
    /// unit and value literal are taken; `index` narrows the selector. A boolean
    /// property with no value means `true`, and an odd number of `not`s inverts a
    /// boolean value. Anything left over that is not a group/async/type marker
    /// is rejected.
    pub fn from_parameters(mut params: Vec<CommandParameter>) -> Result<Self> {
        if let Some(p) = params.iter().find(|p| p.is_control_flow()) {
            return Err(EngineError::invalid(format!(
                "{p:?} cannot be part of a device instruction"
            )));
        }

        let mut selector = extract_first(&mut params, |p| match p {
            CommandParameter::Selector(s) => Some(s.clone()),
            _ => None,
        })
        .ok_or_else(|| EngineError::invalid("no block selector"))?;

        if let Some(index) = extract_first(&mut params, |p| match p {
            CommandParameter::Index(i) => Some(*i),
            _ => None,
        }) {
            selector.index = Some(index);
        }

        let property = extract_first(&mut params, |p| match p {
            CommandParameter::BooleanProperty(prop) => Some((*prop, PropertyKind::Boolean)),
            CommandParameter::StringProperty(prop) | CommandParameter::NumericProperty(prop) => {
                Some((*prop, PropertyKind::Other))
            }
            _ => None,
        });
        let direction = extract_first(&mut params, |p| match p {
            CommandParameter::Direction(d) => Some(*d),
            _ => None,
        });
        let unit = extract_first(&mut params, |p| match p {
            CommandParameter::Unit(u) => Some(*u),
            _ => None,
        });
        let mut value = extract_first(&mut params, |p| match p {
            CommandParameter::Numeric(n) => Some(Primitive::Numeric(*n)),
            CommandParameter::Boolean(b) => Some(Primitive::Boolean(*b)),
            CommandParameter::String(s) => Some(Primitive::String(s.original().to_string())),
            _ => None,
        });
        let nots = extract_all(&mut params, |p| matches!(p, CommandParameter::Not).then_some(()));
        let reverse = extract_first(&mut params, |p| matches!(p, CommandParameter::Reverse).then_some(()));
        let relative = extract_first(&mut params, |p| matches!(p, CommandParameter::Relative).then_some(()));
        params.retain(|p| !p.is_ignorable());

        if let Some(p) = params.first() {
            return Err(EngineError::invalid(format!("unexpected parameter {p:?}")));
        }

        if value.is_none() && matches!(property, Some((_, PropertyKind::Boolean))) {
            value = Some(Primitive::Boolean(true));
        }

        if nots.len() % 2 == 1 {
            value = match value {
                Some(Primitive::Boolean(b)) => Some(Primitive::Boolean(!b)),
                Some(other) => {
                    return Err(EngineError::invalid(format!("cannot negate {other}")));
                }
                None => Some(Primitive::Boolean(false)),
            };
        }

        if let Some(unit) = unit {
            value = Some(apply_unit(unit, value)?);
        }

        let operation = if reverse.is_some() {
            Operation::Reverse
        } else if relative.is_some() {
            Operation::Increment
        } else if value.is_some() {
            Operation::Set
        } else if direction.is_some() {
            Operation::Move
        } else {
            Operation::Get
        };

        Ok(Self {
            selector,
            property: property.map(|(p, _)| p),
            direction,
            value,
            operation,
        })
    }
}

fn apply_unit(unit: UnitType, value: Option<Primitive>) -> Result<Primitive> {
    match value {
        Some(Primitive::Numeric(n)) => Ok(Primitive::Numeric(unit.normalize(n))),
        Some(other) => Err(EngineError::invalid(format!("{unit} applied to {other}"))),
        None => Err(EngineError::invalid(format!("{unit} given without a value"))),
    }
}
