//! Errors raised at the ledger boundary.

use thiserror::Error;

/// Result type alias for ledger calls.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Failure of a single remote ledger call.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Transport-level HTTP failure
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON-RPC error object returned by the node (reverts included)
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Response did not have the expected JSON-RPC shape
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    /// Return data could not be ABI-decoded
    #[error("ABI decode error: {0}")]
    Decode(String),

    /// Call refused by the ledger implementation
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}
