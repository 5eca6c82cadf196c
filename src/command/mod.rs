pub mod instruction;
pub mod params;

pub use instruction::Instruction;
pub use params::{
    extract_all, extract_first, CommandId, CommandParameter, ConditionId, IfFlags, Selector,
    StringLiteral,
};
