//! Common types, traits, and error definitions for rust_rrt
//!
//! This module provides the foundational building blocks shared by the
//! state spaces and the tree planners.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
