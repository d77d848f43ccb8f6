// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker transport boundary
//!
//! The wire primitives a bus adapter builds on. The core never talks to the
//! broker directly; it goes through this trait.

use async_trait::async_trait;
use carrier_core::BoxFuture;
use std::sync::Arc;
use thiserror::Error;

/// Errors from broker transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("broker unreachable: {0}")]
    Unreachable(String),
    #[error("not connected to broker")]
    NotConnected,
    #[error("routing rejected for '{0}'")]
    Rejected(String),
    #[error("transport closed")]
    Closed,
}

impl TransportError {
    /// Transient failures are worth retrying with backoff; the rest
    /// propagate immediately.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::NotConnected)
    }
}

/// Inbound delivery callback: (routing key, payload bytes).
pub type OnMessage = Arc<dyn Fn(String, Vec<u8>) -> BoxFuture<()> + Send + Sync>;

/// One broker's wire primitives.
///
/// Implementations are cheaply cloneable handles onto shared connection
/// state, in the same way the core registry is a shared handle.
#[async_trait]
pub trait BrokerTransport: Clone + Send + Sync + 'static {
    /// Ensure broker-side routing exists for the event name (declare/bind a
    /// queue, create a topic subscription). Must be idempotent.
    async fn ensure_routing(&self, event_name: &str) -> Result<(), TransportError>;

    /// Tear down broker-side routing for the event name.
    async fn remove_routing(&self, event_name: &str) -> Result<(), TransportError>;

    /// Send a payload under the routing key.
    async fn send(&self, event_name: &str, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Begin delivering inbound messages to the callback.
    async fn start_consuming(&self, on_message: OnMessage) -> Result<(), TransportError>;
}
