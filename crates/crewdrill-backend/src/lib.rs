//! crewdrill-backend — backend implementations.
//!
//! Implements the `Backend` trait for the hosted object-store/auth service
//! and for an in-memory store used by tests and the offline demo mode.

pub mod config;
pub mod memory;
pub mod rest;
pub mod session;

pub use config::{create_backend, load_config, load_config_from, BackendConfig, CrewdrillConfig};
pub use memory::MemoryBackend;
pub use rest::HostedBackend;
