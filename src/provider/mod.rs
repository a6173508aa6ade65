//! Provider registry: the closed set of completion backends and the
//! configuration fields each of them accepts.

pub mod registry;

pub use registry::{lookup, providers, ConfigField, Engine, ProviderError, ProviderInfo};
