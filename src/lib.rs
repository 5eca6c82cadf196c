pub mod command;
pub mod describe;
pub mod device;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod paths;
pub mod registry;
pub mod settings;
pub mod sim;
pub mod state;
pub mod store;

pub use error::{EngineError, Result};
