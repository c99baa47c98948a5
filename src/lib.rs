pub mod config;
pub mod engine;
pub mod error;
pub mod prefs;
pub mod telemetry;

// Re-export specific items for convenient access
pub use config::EngineConfig;
pub use engine::EventRecorder;
