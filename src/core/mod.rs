//! Core library components.
//!
//! This module contains the reusable vault logic: storage backends, the
//! keyring manager, the resolution cascade and configuration handling.

pub mod audit;
pub mod config;
pub mod constants;
pub mod env;
pub mod keyring;
pub mod resolver;
pub mod session;
pub mod settings;
pub mod store;
pub mod types;
pub mod validation;
pub mod vault;
