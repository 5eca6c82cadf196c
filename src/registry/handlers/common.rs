use crate::device::Functional;
use crate::model::{Property, ReturnType};
use crate::registry::DeviceHandler;

/// POWER for anything that can be switched on and off. Booleans default to it.
pub(super) fn functional<T: Functional + ?Sized + 'static>(handler: DeviceHandler<T>) -> DeviceHandler<T> {
    handler
        .add_boolean_handler(Property::Power, |b| b.enabled(), |b, on| b.set_enabled(on))
        .default_for_type(ReturnType::Boolean, Property::Power)
}
