//! Core business logic for polleneer.

pub mod locks;
pub mod services;

pub use locks::KeyLocks;
pub use services::*;
