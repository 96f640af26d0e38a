// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod content;
pub mod language;
pub mod metrics;
pub mod practice;
pub mod profile;
pub mod runtime;
pub mod store;
pub mod timer;
