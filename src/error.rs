//! Error taxonomy for the substrate (spec §4.6, §7).
//!
//! The substrate's public operations cannot fail — out-of-range indices
//! silently no-op and non-finite values are not sanitised. The single
//! exception is deserialization of a structurally malformed wire value.

/// Raised only by `Substrate::from_json` when the structural schema
/// fails (missing required top-level fields, or a channel array whose
/// length cannot be reconciled with `width * height`).
#[derive(Debug, thiserror::Error)]
pub enum SubstrateError {
    #[error("invalid serialized substrate: {0}")]
    InvalidSerializedSubstrate(String),
}
