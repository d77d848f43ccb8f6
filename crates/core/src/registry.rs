// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory subscription registry
//!
//! Maps normalized event names to ordered handler registrations and to the
//! concrete event type each name deserializes into. Owns no transport state.

use crate::dispatch::HandlerInvoker;
use crate::event::{EventTypeId, IntegrationEvent};
use crate::handler::{HandlerTypeId, IntegrationEventHandler};
use crate::name::EventNameProcessor;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("handler {handler} already registered for event '{event}'")]
    DuplicateHandler {
        event: String,
        handler: &'static str,
    },
    #[error("no subscriptions registered for event '{0}'")]
    UnknownEvent(String),
}

/// One registered handler for an event name.
///
/// Carries the handler type identity (for duplicate detection and removal)
/// and the type-erased invoker built at registration time.
#[derive(Clone)]
pub struct Subscription {
    handler: HandlerTypeId,
    invoker: HandlerInvoker,
}

impl Subscription {
    pub(crate) fn new(handler: HandlerTypeId, invoker: HandlerInvoker) -> Self {
        Self { handler, invoker }
    }

    pub fn handler(&self) -> HandlerTypeId {
        self.handler
    }

    pub(crate) fn invoker(&self) -> &HandlerInvoker {
        &self.invoker
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("handler", &self.handler)
            .finish()
    }
}

struct RegistryState {
    /// Normalized event name -> handler registrations, in registration order.
    handlers: HashMap<String, Vec<Subscription>>,
    /// Normalized event name -> concrete event type. Lifecycle is coupled to
    /// the handler bucket: created on first subscription, removed with the
    /// last.
    bindings: HashMap<String, EventTypeId>,
    /// Observers of the edge-triggered "no subscriptions remain" signal.
    removal_observers: Vec<mpsc::UnboundedSender<String>>,
}

/// Shared-handle registry; clones share one locked state.
///
/// Every event-name argument is normalized at this boundary, so callers may
/// pass raw or pre-normalized names interchangeably (normalization is
/// idempotent).
#[derive(Clone)]
pub struct SubscriptionRegistry {
    processor: EventNameProcessor,
    state: Arc<RwLock<RegistryState>>,
}

impl SubscriptionRegistry {
    pub fn new(processor: EventNameProcessor) -> Self {
        Self {
            processor,
            state: Arc::new(RwLock::new(RegistryState {
                handlers: HashMap::new(),
                bindings: HashMap::new(),
                removal_observers: Vec::new(),
            })),
        }
    }

    /// Canonical registry key for an event type.
    pub fn event_key<E: IntegrationEvent>(&self) -> String {
        self.processor.process(E::NAME)
    }

    /// Register handler `H` for event `E`, recording the event type binding
    /// on first subscription (first writer wins).
    pub fn add<E, H>(&self, invoker: HandlerInvoker) -> Result<(), RegistryError>
    where
        E: IntegrationEvent,
        H: IntegrationEventHandler<E>,
    {
        let key = self.event_key::<E>();
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        Self::add_locked(&mut state, key.clone(), HandlerTypeId::of::<H>(), invoker)?;
        state.bindings.entry(key).or_insert_with(EventTypeId::of::<E>);
        Ok(())
    }

    /// Register a handler under an explicit event name. Records no type
    /// binding; intended for adapter-level plumbing and tests.
    pub fn add_named(
        &self,
        event_name: &str,
        handler: HandlerTypeId,
        invoker: HandlerInvoker,
    ) -> Result<(), RegistryError> {
        let key = self.processor.process(event_name);
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        Self::add_locked(&mut state, key, handler, invoker)
    }

    fn add_locked(
        state: &mut RegistryState,
        key: String,
        handler: HandlerTypeId,
        invoker: HandlerInvoker,
    ) -> Result<(), RegistryError> {
        let bucket = state.handlers.entry(key.clone()).or_default();
        if bucket.iter().any(|s| s.handler == handler) {
            return Err(RegistryError::DuplicateHandler {
                event: key,
                handler: handler.name(),
            });
        }
        tracing::debug!(event = %key, handler = handler.name(), "subscription added");
        bucket.push(Subscription::new(handler, invoker));
        Ok(())
    }

    /// Remove handler `H` from event `E`'s bucket. No-op if the pair is not
    /// registered. When the bucket empties, the binding is dropped and the
    /// removal signal fires exactly once.
    pub fn remove<E, H>(&self)
    where
        E: IntegrationEvent,
        H: IntegrationEventHandler<E>,
    {
        let key = self.event_key::<E>();
        let handler = HandlerTypeId::of::<H>();
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let Some(bucket) = state.handlers.get_mut(&key) else {
            return;
        };
        let before = bucket.len();
        bucket.retain(|s| s.handler != handler);
        if bucket.len() == before {
            return;
        }
        tracing::debug!(event = %key, handler = handler.name(), "subscription removed");
        if bucket.is_empty() {
            state.handlers.remove(&key);
            state.bindings.remove(&key);
            // Unbounded senders never block; prune observers whose receiver
            // is gone.
            state
                .removal_observers
                .retain(|tx| tx.send(key.clone()).is_ok());
        }
    }

    pub fn has_subscriptions_for(&self, event_name: &str) -> bool {
        let key = self.processor.process(event_name);
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .handlers
            .contains_key(&key)
    }

    /// Strict lookup: callers must check `has_subscriptions_for` first.
    pub fn handlers_for(&self, event_name: &str) -> Result<Vec<Subscription>, RegistryError> {
        let key = self.processor.process(event_name);
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .handlers
            .get(&key)
            .cloned()
            .ok_or(RegistryError::UnknownEvent(key))
    }

    /// Concrete event type bound to the name; absent is not an error.
    pub fn event_type(&self, event_name: &str) -> Option<EventTypeId> {
        let key = self.processor.process(event_name);
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .bindings
            .get(&key)
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .handlers
            .is_empty()
    }

    /// Bulk reset. Drops all buckets and bindings without raising removal
    /// signals.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.handlers.clear();
        state.bindings.clear();
    }

    /// Subscribe to the "event has no remaining subscriptions" signal.
    ///
    /// Fires exactly once per transition from one or more subscriptions to
    /// zero for a given event name. Adapters use it to tear down broker-side
    /// routing.
    pub fn on_event_removed(&self) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .removal_observers
            .push(tx);
        rx
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
