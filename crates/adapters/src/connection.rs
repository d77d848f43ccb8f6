// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent broker connection with serialized reconnect
//!
//! Disconnects can be signalled from several places at once (shutdown
//! callbacks, consumer errors, blocked notifications). All triggers funnel
//! into one mutex-guarded reconnect, so at most one connection attempt runs
//! at a time and waiters simply observe the connection the winner
//! established.

use crate::transport::TransportError;
use async_trait::async_trait;
use carrier_core::RetryPolicy;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// A live broker connection.
pub trait Connection: Send + Sync + 'static {
    fn is_open(&self) -> bool;
}

/// Establishes broker connections.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Connection: Connection;

    async fn connect(&self) -> Result<Self::Connection, TransportError>;
}

/// Keeps one broker connection alive, reconnecting with backoff.
pub struct PersistentConnection<C: Connector> {
    connector: C,
    retry: RetryPolicy,
    /// Guards the connection slot; holding the lock serializes reconnects.
    state: Mutex<Option<C::Connection>>,
    disposed: AtomicBool,
}

impl<C: Connector> PersistentConnection<C> {
    pub fn new(connector: C, retry: RetryPolicy) -> Self {
        Self {
            connector,
            retry,
            state: Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.state
            .lock()
            .await
            .as_ref()
            .is_some_and(|conn| conn.is_open())
    }

    /// Ensure a live connection, establishing one if needed.
    ///
    /// Safe to call concurrently: a trigger that loses the race for the lock
    /// finds the fresh connection already in place and returns without
    /// connecting again.
    pub async fn try_connect(&self) -> Result<(), TransportError> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        let mut state = self.state.lock().await;
        if state.as_ref().is_some_and(|conn| conn.is_open()) {
            return Ok(());
        }
        let connection = self
            .retry
            .run(TransportError::is_transient, || self.connector.connect())
            .await?;
        *state = Some(connection);
        tracing::info!("broker connection established");
        Ok(())
    }

    /// Drop the current connection and refuse further reconnects.
    /// Idempotent.
    pub async fn close(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.state.lock().await.take();
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
