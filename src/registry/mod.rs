pub mod catalog;
pub mod device;
pub mod handlers;
pub mod property;

use indexmap::IndexMap;

use crate::error::{EngineError, Result};
use crate::model::BlockType;

pub use device::{BlockHandler, DeviceHandler, Downcast};
pub use property::PropertyHandler;

// ── Builder ─────────────────────────────────────────────────────

/// Collects device handlers at startup. Sealing it produces the read-only
/// [`HandlerRegistry`] the engine dispatches through.
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: IndexMap<BlockType, Box<dyn BlockHandler>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `block_type`. A second registration for the same
    /// type replaces the first.
    pub fn register_handler(&mut self, block_type: BlockType, handler: impl BlockHandler + 'static) -> &mut Self {
        if handler.block_type() != block_type {
            tracing::debug!(%block_type, handler = %handler.block_type(), "handler registered under another block type");
        }
        if self.handlers.insert(block_type, Box::new(handler)).is_some() {
            tracing::warn!(%block_type, "device handler replaced");
        }
        self
    }

    pub fn seal(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}

// ── Registry ────────────────────────────────────────────────────

/// Block type → device handler. Immutable once built and safe to share
/// between threads.
pub struct HandlerRegistry {
    handlers: IndexMap<BlockType, Box<dyn BlockHandler>>,
}

impl HandlerRegistry {
    /// Registry with every built-in block type.
    pub fn standard() -> Self {
        let mut builder = RegistryBuilder::new();
        handlers::register_standard(&mut builder);
        builder.seal()
    }

    pub fn handler(&self, block_type: BlockType) -> Result<&dyn BlockHandler> {
        self.handlers
            .get(&block_type)
            .map(Box::as_ref)
            .ok_or(EngineError::UnregisteredBlockType { block_type })
    }

    /// Registered handlers in registration order.
    pub fn handlers(&self) -> impl Iterator<Item = &dyn BlockHandler> {
        self.handlers.values().map(Box::as_ref)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
