//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FailoverConfig (validated, immutable)
//!     → consumed once by the failover manager at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; link topology is fixed for the process
//! - All fields except the link list have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::FailoverConfig;
pub use schema::LinkConfig;
pub use schema::ObservabilityConfig;
pub use schema::PingConfig;
