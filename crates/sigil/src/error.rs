//! Error types for Sigil operations.
//!
//! This module provides the main error type [`SigilError`]. Pipeline stages
//! never fail outright: model and analyzer failures inside a run are
//! absorbed into the result. `SigilError` covers what happens around a run,
//! such as reading the input, loading configuration, or constructing a
//! model client.

use std::io;

use thiserror::Error;

use crate::model::ModelError;

/// The main error type for Sigil operations.
#[derive(Debug, Error)]
pub enum SigilError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
