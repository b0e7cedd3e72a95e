//! Common utilities and shared types for polleneer.
//!
//! This crate provides foundational components used across all polleneer crates:
//!
//! - **Configuration**: Application settings via [`Config`], including the
//!   honey-point schedule
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use polleneer_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::{Config, PointsConfig};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
