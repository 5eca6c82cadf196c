use std::sync::Arc;

use indexmap::IndexMap;

use super::catalog::{CatalogEntry, PropertyEntry};
use super::property::PropertyHandler;
use crate::command::Selector;
use crate::device::{Device, DeviceId, Host};
use crate::error::{EngineError, Result};
use crate::model::{BlockType, Direction, Operation, Primitive, Property, ReturnType, Vector3};

/// Narrows a host device to the capability a handler drives.
pub type Downcast<T> = fn(&mut dyn Device) -> Option<&mut T>;

type Filter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Everything the engine knows about one block type: its property table, its
/// default-property tables, and how to pick its devices out of the host.
pub struct DeviceHandler<T: ?Sized> {
    block_type: BlockType,
    downcast: Downcast<T>,
    filter: Option<Filter<T>>,
    properties: IndexMap<Property, PropertyHandler<T>>,
    defaults_by_type: IndexMap<ReturnType, Property>,
    defaults_by_direction: IndexMap<Direction, Property>,
    default_direction: Direction,
}

impl<T: ?Sized + 'static> DeviceHandler<T> {
    pub fn new(block_type: BlockType, downcast: Downcast<T>) -> Self {
        Self {
            block_type,
            downcast,
            filter: None,
            properties: IndexMap::new(),
            defaults_by_type: IndexMap::new(),
            defaults_by_direction: IndexMap::new(),
            default_direction: Direction::Up,
        }
    }

    /// Register `handler` for `property`, replacing any earlier registration.
    pub fn add_property_handler(mut self, property: Property, handler: PropertyHandler<T>) -> Self {
        if self.properties.insert(property, handler).is_some() {
            tracing::trace!(block_type = %self.block_type, %property, "property handler replaced");
        }
        self
    }

    pub fn add_numeric_handler(
        self,
        property: Property,
        get: impl Fn(&T) -> f64 + Send + Sync + 'static,
        set: impl Fn(&mut T, f64) + Send + Sync + 'static,
        step: f64,
    ) -> Self {
        self.add_property_handler(property, PropertyHandler::numeric(get, set, step))
    }

    pub fn add_boolean_handler(
        self,
        property: Property,
        get: impl Fn(&T) -> bool + Send + Sync + 'static,
        set: impl Fn(&mut T, bool) + Send + Sync + 'static,
    ) -> Self {
        self.add_property_handler(property, PropertyHandler::boolean(get, set))
    }

    pub fn add_vector_handler(
        self,
        property: Property,
        get: impl Fn(&T) -> Vector3 + Send + Sync + 'static,
    ) -> Self {
        self.add_property_handler(property, PropertyHandler::vector(get))
    }

    pub fn add_direction_handlers(
        self,
        property: Property,
        default: Direction,
        entries: Vec<(PropertyHandler<T>, &[Direction])>,
    ) -> Self {
        self.add_property_handler(property, PropertyHandler::by_direction(default, entries))
    }

    pub fn default_for_type(mut self, value_type: ReturnType, property: Property) -> Self {
        self.defaults_by_type.insert(value_type, property);
        self
    }

    pub fn default_for_direction(mut self, direction: Direction, property: Property) -> Self {
        self.defaults_by_direction.insert(direction, property);
        self
    }

    /// Direction assumed by `Move` when the instruction names none.
    pub fn default_direction(mut self, direction: Direction) -> Self {
        self.default_direction = direction;
        self
    }

    /// Only devices passing `filter` are selected.
    pub fn with_filter(mut self, filter: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn property_handler(&self, property: Property) -> Option<&PropertyHandler<T>> {
        self.properties.get(&property)
    }

    fn accepts(&self, device: &T) -> bool {
        match &self.filter {
            Some(filter) => filter(device),
            None => true,
        }
    }
}

/// Type-erased view of a [`DeviceHandler`], as the registry stores it.
pub trait BlockHandler: Send + Sync {
    fn block_type(&self) -> BlockType;

    /// Pick the property an instruction addresses: the explicit one, else the
    /// direction's default when a direction is given, else the value type's
    /// default. A direction with no default does not fall back to the value
    /// type.
    fn resolve(
        &self,
        property: Option<Property>,
        direction: Option<Direction>,
        value_type: Option<ReturnType>,
    ) -> Result<Property>;

    /// Run one operation on one device.
    fn apply(
        &self,
        device: &mut dyn Device,
        operation: Operation,
        property: Property,
        direction: Option<Direction>,
        value: Option<&Primitive>,
    ) -> Result<Option<Primitive>>;

    /// Devices the selector names that are of this handler's type and pass its
    /// filter, in host order.
    fn select_instances(&self, host: &mut dyn Host, selector: &Selector) -> Result<Vec<DeviceId>>;

    fn catalog_entry(&self) -> CatalogEntry;
}

impl<T: ?Sized + 'static> BlockHandler for DeviceHandler<T> {
    fn block_type(&self) -> BlockType {
        self.block_type
    }

    fn resolve(
        &self,
        property: Option<Property>,
        direction: Option<Direction>,
        value_type: Option<ReturnType>,
    ) -> Result<Property> {
        if let Some(property) = property {
            return Ok(property);
        }
        let found = match direction {
            Some(d) => self.defaults_by_direction.get(&d),
            None => value_type.and_then(|t| self.defaults_by_type.get(&t)),
        };
        found
            .copied()
            .ok_or(EngineError::UnresolvedProperty {
                block_type: self.block_type,
            })
    }

    fn apply(
        &self,
        device: &mut dyn Device,
        operation: Operation,
        property: Property,
        direction: Option<Direction>,
        value: Option<&Primitive>,
    ) -> Result<Option<Primitive>> {
        let handler = self
            .properties
            .get(&property)
            .ok_or(EngineError::UnsupportedProperty {
                property,
                block_type: self.block_type,
            })?;
        let typed = match (self.downcast)(device) {
            Some(typed) => typed,
            None => {
                return Err(EngineError::IncompatibleDevice {
                    name: device.name().to_string(),
                    block_type: self.block_type,
                })
            }
        };
        tracing::debug!(
            block_type = %self.block_type,
            %property,
            %operation,
            direction = ?direction,
            "dispatch"
        );
        handler
            .invoke(typed, operation, direction, value, self.default_direction)
            .map_err(|e| e.for_property(property))
    }

    fn select_instances(&self, host: &mut dyn Host, selector: &Selector) -> Result<Vec<DeviceId>> {
        let unknown = || EngineError::UnknownSelector {
            selector: selector.to_string(),
        };
        let candidates = if selector.is_group {
            host.find_group(&selector.name).ok_or_else(unknown)?
        } else {
            let found = host.find_by_name(&selector.name);
            if found.is_empty() {
                return Err(unknown());
            }
            found
        };

        let mut selected = Vec::with_capacity(candidates.len());
        for id in candidates {
            let Some(device) = host.device_mut(id) else {
                continue;
            };
            if let Some(typed) = (self.downcast)(device) {
                if self.accepts(typed) {
                    selected.push(id);
                }
            }
        }

        if selected.is_empty() {
            tracing::debug!(block_type = %self.block_type, %selector, "selector matched no devices");
        }

        match selector.index {
            Some(index) => selected.get(index).map(|id| vec![*id]).ok_or_else(unknown),
            None => Ok(selected),
        }
    }

    fn catalog_entry(&self) -> CatalogEntry {
        CatalogEntry {
            block_type: self.block_type,
            properties: self
                .properties
                .iter()
                .map(|(property, handler)| PropertyEntry {
                    property: *property,
                    operations: handler.supported(),
                    step: handler.step(),
                })
                .collect(),
            defaults_by_type: self.defaults_by_type.clone(),
            defaults_by_direction: self.defaults_by_direction.clone(),
            default_direction: self.default_direction,
        }
    }
}
