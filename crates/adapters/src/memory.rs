// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory loopback transport
//!
//! Direct-exchange semantics: a message is delivered only when routing for
//! its key was ensured beforehand; unroutable messages are dropped silently,
//! as a direct exchange drops them. Useful for tests and single-process
//! deployments.

use crate::transport::{BrokerTransport, OnMessage, TransportError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct MemoryState {
    routes: RwLock<HashSet<String>>,
    consumer: RwLock<Option<OnMessage>>,
    /// Fault injection: remaining sends to fail with a transient error.
    failing_sends: AtomicU32,
}

/// Cheaply cloneable loopback broker.
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    inner: Arc<MemoryState>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` sends fail with a transient error.
    pub fn fail_next_sends(&self, n: u32) {
        self.inner.failing_sends.store(n, Ordering::SeqCst);
    }

    pub fn has_route(&self, event_name: &str) -> bool {
        self.inner
            .routes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(event_name)
    }

    pub fn route_count(&self) -> usize {
        self.inner
            .routes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

#[async_trait]
impl BrokerTransport for InMemoryTransport {
    async fn ensure_routing(&self, event_name: &str) -> Result<(), TransportError> {
        self.inner
            .routes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(event_name.to_string());
        Ok(())
    }

    async fn remove_routing(&self, event_name: &str) -> Result<(), TransportError> {
        self.inner
            .routes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(event_name);
        Ok(())
    }

    async fn send(&self, event_name: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        let failing = &self.inner.failing_sends;
        if failing
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(TransportError::Unreachable("injected fault".to_string()));
        }

        let routed = self
            .inner
            .routes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(event_name);
        if !routed {
            tracing::debug!(event = %event_name, "no route bound, dropping message");
            return Ok(());
        }

        let consumer = self
            .inner
            .consumer
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(on_message) = consumer {
            // Deliver inline; completion of the callback is completion of
            // handling, which keeps tests deterministic.
            on_message(event_name.to_string(), payload).await;
        }
        Ok(())
    }

    async fn start_consuming(&self, on_message: OnMessage) -> Result<(), TransportError> {
        *self
            .inner
            .consumer
            .write()
            .unwrap_or_else(|e| e.into_inner()) = Some(on_message);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
