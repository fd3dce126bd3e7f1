pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::AppConfig;
pub use core::engine::{EngineOptions, OutreachEngine, RunReport};
pub use utils::error::{ApplyError, Result};
