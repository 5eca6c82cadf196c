pub mod color;
pub mod primitive;
pub mod vector;
pub mod vocabulary;

// Re-export commonly used types at the model level.
pub use color::Color;
pub use primitive::{KeyedValue, Primitive};
pub use vector::{Orientation, Vector3};
pub use vocabulary::{
    AggregationMode, BlockType, ComparisonType, ControlType, Direction, FunctionType,
    HandlerSlot, Operation, Property, ReturnType, UnitType,
};
