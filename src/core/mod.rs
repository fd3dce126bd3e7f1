pub mod engine;
pub mod idempotency;
pub mod resolver;
pub mod template;

pub use crate::domain::model::{
    ApplicationAttempt, AttemptStatus, Channel, Company, Mode, OutreachContent,
};
pub use crate::domain::ports::{AttemptLog, ChannelAdapter};
pub use crate::utils::error::Result;
