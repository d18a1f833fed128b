//! Incremental tree model for virtualized, collapsible hierarchies.
//!
//! The [`tree`] module holds the engine; [`config`] and [`instruments`]
//! support the `itree` terminal demo.

pub mod config;
pub mod error;
pub mod instruments;
pub mod tree;

pub use error::{Result, TreeError};
