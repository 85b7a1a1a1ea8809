//! # larder-core
//!
//! Core types, traits, configuration, and error handling for Larder.

pub mod config;
pub mod error;
pub mod keys;
pub mod notification;
pub mod recipe;
pub mod traits;

pub use config::shellexpand;
