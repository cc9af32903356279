//! Error types for the KERI core wire primitives.

use thiserror::Error;

/// Error taxonomy for the core layer (codex, `CryMat`, `Serder`).
///
/// Four axes, matching the boundary contract: a caller either passed a bad
/// argument, passed a value that fails a validation invariant, named an
/// unsupported protocol version, or handed the underlying JSON/MGPK/CBOR
/// decoder something it rejected. The fourth axis has no `String`-carrying
/// variant of its own: each decoder's error type is wrapped directly via
/// `#[from]` below, so "Decoder error — propagated verbatim" is satisfied
/// by `?`-propagation of the library's own error rather than by re-wrapping
/// it into a lossy string.
#[derive(Error, Debug)]
pub enum Error {
    #[error("argument error: {0}")]
    Argument(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("version error: {0}")]
    Version(String),

    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("mgpk decode error: {0}")]
    Mgpk(#[from] rmp_serde::decode::Error),

    #[error("mgpk encode error: {0}")]
    MgpkEncode(#[from] rmp_serde::encode::Error),

    #[error("cbor error: {0}")]
    Cbor(#[from] serde_cbor::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
