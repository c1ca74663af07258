//! Infrastructure layer: configuration and reporting read models.

pub mod config;
pub mod projections;

pub use config::{ConfigError, NexusConfig, ReportConfig, WorkflowConfig};
