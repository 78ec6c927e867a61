//! Cropper Infrastructure Library
//!
//! Process-wide services that sit beside the request path:
//! - Telemetry initialization (tracing subscriber)
//! - The periodic artifact purge (cleanup)

pub mod cleanup;
pub mod telemetry;

// Re-export commonly used types
pub use cleanup::{CleanupHandle, CleanupSchedule, CleanupService, CleanupState};
pub use telemetry::init_telemetry;
