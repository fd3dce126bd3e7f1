// Adapters layer: concrete implementations for external systems
// (SMTP, HTTP forms, CSV roster and audit log).

pub mod attachments;
pub mod email;
pub mod form;
pub mod log_csv;
pub mod roster;
