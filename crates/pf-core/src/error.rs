//! Shared error type.
//!
//! Sub-crates define their own error enums and wrap `PfError` as one variant
//! where they need to surface foundation-level failures.

use thiserror::Error;

/// The base error type for `pf-core`.
#[derive(Debug, Error)]
pub enum PfError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `pf-core`.
pub type PfResult<T> = Result<T, PfError>;
