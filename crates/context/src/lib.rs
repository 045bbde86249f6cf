//! Wires the character and catalog services for an application runtime.

mod config;
mod registry;

pub use config::AppConfig;
pub use registry::{BundledCatalogs, ServiceContext};
