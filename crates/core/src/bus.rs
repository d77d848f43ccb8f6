// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bus contract and shared adapter state
//!
//! Every broker adapter implements [`EventBus`] on top of a [`BusCore`],
//! which composes the configuration, name processor, registry and dispatcher.

use crate::codec::{CodecError, PayloadCodec};
use crate::config::BusConfig;
use crate::dispatch::{self, DispatchError, EventDispatcher};
use crate::event::IntegrationEvent;
use crate::handler::IntegrationEventHandler;
use crate::name::EventNameProcessor;
use crate::registry::{RegistryError, SubscriptionRegistry};
use crate::resolver::HandlerResolver;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors from core bus operations.
#[derive(Debug, Error)]
pub enum BusError {
    /// Operation after `close()`: a caller error, surfaced fast.
    #[error("event bus has been closed")]
    Closed,
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// The broker-agnostic publish/subscribe surface.
///
/// `publish` is fire-and-forget at this layer: a message becomes visible to
/// the broker, but no downstream delivery acknowledgment is returned.
/// `subscribe` must be idempotent on the broker side: two subscriptions for
/// the same event name share one piece of broker routing.
#[async_trait]
pub trait EventBus: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn publish<E: IntegrationEvent>(&self, event: &E) -> Result<(), Self::Error>;

    async fn subscribe<E, H>(&self) -> Result<(), Self::Error>
    where
        E: IntegrationEvent,
        H: IntegrationEventHandler<E>;

    async fn unsubscribe<E, H>(&self) -> Result<(), Self::Error>
    where
        E: IntegrationEvent,
        H: IntegrationEventHandler<E>;
}

/// State shared by every bus adapter.
///
/// Lifecycle: constructed active (construction is synchronous and infallible
/// given valid configuration), transitions once to closed. Closing does not
/// cancel in-flight handler invocations; it only makes new operations fail
/// and stops new intake (adapter-specific).
pub struct BusCore<C: PayloadCodec> {
    config: BusConfig,
    processor: EventNameProcessor,
    registry: SubscriptionRegistry,
    dispatcher: EventDispatcher,
    codec: C,
    closed: AtomicBool,
}

impl<C: PayloadCodec> BusCore<C> {
    pub fn new(config: BusConfig, codec: C, resolver: Arc<dyn HandlerResolver>) -> Self {
        let processor = config.name_processor();
        let registry = SubscriptionRegistry::new(processor.clone());
        let dispatcher = EventDispatcher::new(
            processor.clone(),
            registry.clone(),
            resolver,
            config.missing_handler_policy,
        );
        Self {
            config,
            processor,
            registry,
            dispatcher,
            codec,
            closed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Normalized routing key for an event type.
    pub fn event_name_of<E: IntegrationEvent>(&self) -> String {
        self.processor.process(E::NAME)
    }

    /// Broker-side queue/subscription name for an event.
    pub fn subscription_name(&self, event_name: &str) -> String {
        self.config.subscription_name(event_name)
    }

    pub fn ensure_open(&self) -> Result<(), BusError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(BusError::Closed)
        } else {
            Ok(())
        }
    }

    /// Register (E, H) in the registry with a freshly built invoker.
    pub fn register<E, H>(&self) -> Result<(), BusError>
    where
        E: IntegrationEvent,
        H: IntegrationEventHandler<E>,
    {
        self.ensure_open()?;
        let invoker = dispatch::invoker::<E, H, C>(self.codec.clone());
        self.registry.add::<E, H>(invoker)?;
        Ok(())
    }

    /// Remove (E, H) from the registry. Broker-side teardown rides the
    /// registry's removal signal, not this call.
    pub fn deregister<E, H>(&self) -> Result<(), BusError>
    where
        E: IntegrationEvent,
        H: IntegrationEventHandler<E>,
    {
        self.ensure_open()?;
        self.registry.remove::<E, H>();
        Ok(())
    }

    /// Serialize an event for the wire.
    pub fn encode<E: IntegrationEvent>(&self, event: &E) -> Result<Vec<u8>, BusError> {
        Ok(self.codec.encode(event)?)
    }

    /// Feed one inbound delivery to the dispatcher.
    pub async fn dispatch(
        &self,
        raw_event_name: &str,
        payload: &[u8],
    ) -> Result<bool, DispatchError> {
        self.dispatcher.dispatch(raw_event_name, payload).await
    }

    /// Idempotent; terminal.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::info!("event bus closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
