//! # larder-recipes
//!
//! Recipe API clients for Larder.

pub mod spoonacular;

pub use spoonacular::{SearchParams, SpoonacularClient};
