//! Parsed command parameters.
//!
//! A command arrives as a flat sequence of these nodes, produced by the script
//! parser. Nodes are never mutated once built; consumers pull out what they need
//! with [`extract_first`] / [`extract_all`] and inspect what is left.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{
    AggregationMode, BlockType, ComparisonType, ControlType, Direction, FunctionType, Property,
    UnitType,
};

/// Arena id of a parsed condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ConditionId(pub u32);

/// Arena id of a parsed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CommandId(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "param", content = "value", rename_all = "snake_case")]
pub enum CommandParameter {
    // ── Literals ─────────────────────────────────────────────────
    String(StringLiteral),
    Numeric(f64),
    Boolean(bool),
    Index(usize),
    Iteration(u32),

    // ── Symbolic references ──────────────────────────────────────
    Direction(Direction),
    BooleanProperty(Property),
    StringProperty(Property),
    NumericProperty(Property),
    Unit(UnitType),
    Control(ControlType),
    Function(FunctionType),
    Comparison(ComparisonType),
    AggregationMode(AggregationMode),
    Condition(ConditionId),
    CommandReference(CommandId),

    // ── Structural markers ───────────────────────────────────────
    Group,
    Async,
    If(IfFlags),
    Else,
    Not,
    And,
    Or,
    OpenParenthesis,
    CloseParenthesis,
    Reverse,
    Relative,
    Wait,
    Send,
    Listen,
    BlockType(BlockType),

    Selector(Selector),
}

impl CommandParameter {
    /// Parameters that only mean something to the program scheduler: conditions,
    /// branches, loops, calls and messaging.
    pub fn is_control_flow(&self) -> bool {
        matches!(
            self,
            CommandParameter::Control(_)
                | CommandParameter::Function(_)
                | CommandParameter::If(_)
                | CommandParameter::Else
                | CommandParameter::And
                | CommandParameter::Or
                | CommandParameter::OpenParenthesis
                | CommandParameter::CloseParenthesis
                | CommandParameter::Condition(_)
                | CommandParameter::CommandReference(_)
                | CommandParameter::Comparison(_)
                | CommandParameter::AggregationMode(_)
                | CommandParameter::Iteration(_)
                | CommandParameter::Wait
                | CommandParameter::Send
                | CommandParameter::Listen
        )
    }

    /// Markers that carry no meaning for a single device instruction.
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            CommandParameter::Group | CommandParameter::Async | CommandParameter::BlockType(_)
        )
    }
}

/// A quoted or bare word. Matching uses the lowercased form; the original text
/// is kept for values that are written back to devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StringLiteral {
    original: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sub_tokens: Vec<CommandParameter>,
}

impl StringLiteral {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            sub_tokens: Vec::new(),
        }
    }

    pub fn with_sub_tokens(original: impl Into<String>, sub_tokens: Vec<CommandParameter>) -> Self {
        Self {
            original: original.into(),
            sub_tokens,
        }
    }

    pub fn value(&self) -> String {
        self.original.to_lowercase()
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Tokens the parser found inside the string, for strings that double as
    /// inline commands.
    pub fn sub_tokens(&self) -> &[CommandParameter] {
        &self.sub_tokens
    }
}

/// Flags fixed when an `if`/`unless`/`while`/`until` keyword is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct IfFlags {
    inverse_condition: bool,
    always_evaluate: bool,
    swap_commands: bool,
}

impl IfFlags {
    pub fn new(inverse_condition: bool, always_evaluate: bool, swap_commands: bool) -> Self {
        Self {
            inverse_condition,
            always_evaluate,
            swap_commands,
        }
    }

    pub fn inverse_condition(self) -> bool {
        self.inverse_condition
    }

    pub fn always_evaluate(self) -> bool {
        self.always_evaluate
    }

    pub fn swap_commands(self) -> bool {
        self.swap_commands
    }
}

/// Which devices a command addresses: one named block (possibly several devices
/// sharing the name) or a named group, of one block type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Selector {
    pub block_type: BlockType,
    #[serde(default)]
    pub is_group: bool,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl Selector {
    pub fn single(block_type: BlockType, name: impl Into<String>) -> Self {
        Self {
            block_type,
            is_group: false,
            name: name.into(),
            index: None,
        }
    }

    pub fn group(block_type: BlockType, name: impl Into<String>) -> Self {
        Self {
            is_group: true,
            ..Self::single(block_type, name)
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_group {
            write!(f, "group \"{}\"", self.name)?;
        } else {
            write!(f, "\"{}\"", self.name)?;
        }
        if let Some(index) = self.index {
            write!(f, " @{index}")?;
        }
        Ok(())
    }
}

/// Remove and return the first parameter `select` accepts.
pub fn extract_first<T>(
    params: &mut Vec<CommandParameter>,
    mut select: impl FnMut(&CommandParameter) -> Option<T>,
) -> Option<T> {
    let (i, found) = params
        .iter()
        .enumerate()
        .find_map(|(i, p)| select(p).map(|t| (i, t)))?;
    params.remove(i);
    Some(found)
}

/// Remove and return every parameter `select` accepts, in order.
pub fn extract_all<T>(
    params: &mut Vec<CommandParameter>,
    mut select: impl FnMut(&CommandParameter) -> Option<T>,
) -> Vec<T> {
    let mut extracted = Vec::new();
    params.retain(|p| match select(p) {
        Some(t) => {
            extracted.push(t);
            false
        }
        None => true,
    });
    extracted
}
