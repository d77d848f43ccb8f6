// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload serialization boundary

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors from payload encode/decode.
///
/// The source is boxed so any codec implementation can wrap its own error
/// type.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode event: {0}")]
    Encode(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to decode payload: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Payload codec used on both the publish and dispatch paths.
///
/// Must round-trip every field of an integration event, including its
/// identity and creation timestamp.
pub trait PayloadCodec: Clone + Send + Sync + 'static {
    fn encode<E: Serialize>(&self, event: &E) -> Result<Vec<u8>, CodecError>;

    fn decode<E: DeserializeOwned>(&self, bytes: &[u8]) -> Result<E, CodecError>;
}

/// Default JSON codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    fn encode<E: Serialize>(&self, event: &E) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(event).map_err(|err| CodecError::Encode(Box::new(err)))
    }

    fn decode<E: DeserializeOwned>(&self, bytes: &[u8]) -> Result<E, CodecError> {
        serde_json::from_slice(bytes).map_err(|err| CodecError::Decode(Box::new(err)))
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
