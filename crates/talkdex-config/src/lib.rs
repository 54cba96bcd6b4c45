//! # talkdex configuration
//!
//! Type-safe configuration loading and validation for the ingestion pipeline.
//!
//! ## Features
//!
//! - TOML configuration file with per-section defaults
//! - Environment-first API key resolution
//! - Startup validation that surfaces configuration failures before any video
//!   is processed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use talkdex_config::ConfigLoader;
//!
//! let config = ConfigLoader::load_or_default(None)?;
//! config.validate()?;
//! # Ok::<(), talkdex_config::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod credentials;
mod error;
mod loader;

pub use config::*;
pub use credentials::*;
pub use error::*;
pub use loader::*;
