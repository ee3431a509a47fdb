pub mod types;
pub mod error;
pub mod items;
pub mod engine;
pub mod selection;
pub mod render;
pub mod commands;
pub mod upload;
pub mod export;
pub mod pricing;

pub use engine::GangsheetEngine;
pub use error::EngineError;
pub use items::GangsheetItem;
pub use types::*;
