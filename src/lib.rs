//! Semantic query expression engine.
//!
//! Immutable expression trees over a conceptual data model, with structural
//! equality, schema validation, rewriting, and identity extraction built on a
//! single visitor protocol.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod query;

pub use config::Config;
pub use error::{Error, Result};
