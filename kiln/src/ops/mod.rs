//! Core operations.
//!
//! This module contains the business logic for kiln commands,
//! separated from CLI argument parsing and output rendering.

pub mod catalog;
pub mod check;
pub mod generate;

pub use catalog::{archetypes, types};
pub use check::check;
pub use generate::{generate, preview};
