//! Built-in handlers, one per block type.

pub mod common;
pub mod light;
pub mod rotor;
pub mod ship;

use super::RegistryBuilder;
use crate::model::BlockType;

/// Register every built-in block type, in [`BlockType::ALL`] order.
pub fn register_standard(builder: &mut RegistryBuilder) {
    builder.register_handler(BlockType::Light, light::light_handler());
    builder.register_handler(BlockType::Rotor, rotor::rotor_handler());
    builder.register_handler(BlockType::Hinge, rotor::hinge_handler());
    builder.register_handler(BlockType::Cockpit, ship::cockpit_handler());
    builder.register_handler(BlockType::Remote, ship::remote_control_handler());
}
