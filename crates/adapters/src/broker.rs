// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport-generic event bus
//!
//! Implements the core bus contract over any [`BrokerTransport`]: provision
//! routing once per event name on subscribe, publish with retry, and tear
//! down routing when the last handler for an event unsubscribes (driven by
//! the registry's removal signal, so co-registered handlers keep receiving).

use crate::transport::{BrokerTransport, OnMessage, TransportError};
use async_trait::async_trait;
use carrier_core::{
    BusConfig, BusCore, BusError, CodecError, EventBus, HandlerResolver, HandlerTypeId,
    IntegrationEvent, IntegrationEventHandler, JsonCodec, PayloadCodec, RetryPolicy,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the broker-backed bus.
#[derive(Debug, Error)]
pub enum BrokerBusError {
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Event bus over a pluggable broker transport.
pub struct BrokerBus<T: BrokerTransport, C: PayloadCodec = JsonCodec> {
    core: Arc<BusCore<C>>,
    transport: T,
    retry: RetryPolicy,
}

impl<T: BrokerTransport, C: PayloadCodec> BrokerBus<T, C> {
    pub fn new(
        config: BusConfig,
        codec: C,
        resolver: Arc<dyn HandlerResolver>,
        transport: T,
    ) -> Self {
        let retry = config.retry_policy();
        let core = Arc::new(BusCore::new(config, codec, resolver));
        let bus = Self {
            core,
            transport,
            retry,
        };
        bus.spawn_removal_listener();
        bus
    }

    /// Broker-side teardown rides the registry's removal signal rather than
    /// happening synchronously in `unsubscribe`.
    fn spawn_removal_listener(&self) {
        let mut removed = self.core.registry().on_event_removed();
        let transport = self.transport.clone();
        tokio::spawn(async move {
            while let Some(event_name) = removed.recv().await {
                tracing::info!(event = %event_name, "last subscription gone, removing routing");
                if let Err(err) = transport.remove_routing(&event_name).await {
                    tracing::warn!(event = %event_name, error = %err, "failed to remove routing");
                }
            }
        });
    }

    /// Start consuming inbound deliveries, feeding them to the dispatcher.
    ///
    /// Handler failures are logged and the message stays acknowledged; that
    /// is this adapter's delivery policy, not the dispatcher's.
    pub async fn start(&self) -> Result<(), BrokerBusError> {
        let core = Arc::clone(&self.core);
        let on_message: OnMessage = Arc::new(move |routing_key, payload| {
            let core = Arc::clone(&core);
            Box::pin(async move {
                if core.is_closed() {
                    // A closed bus stops intake; in-flight handlers finish.
                    return;
                }
                match core.dispatch(&routing_key, &payload).await {
                    Ok(_) => {}
                    Err(err) => {
                        tracing::error!(event = %routing_key, error = %err, "dispatch failed");
                    }
                }
            })
        });
        self.transport.start_consuming(on_message).await?;
        Ok(())
    }

    pub fn registry(&self) -> &carrier_core::SubscriptionRegistry {
        self.core.registry()
    }

    pub fn close(&self) {
        self.core.close();
    }
}

#[async_trait]
impl<T: BrokerTransport, C: PayloadCodec> EventBus for BrokerBus<T, C> {
    type Error = BrokerBusError;

    async fn publish<E: IntegrationEvent>(&self, event: &E) -> Result<(), Self::Error> {
        self.core.ensure_open()?;
        let event_name = self.core.event_name_of::<E>();
        let payload = self.core.encode(event)?;
        self.retry
            .run(TransportError::is_transient, || {
                self.transport.send(&event_name, payload.clone())
            })
            .await?;
        tracing::debug!(event = %event_name, "published");
        Ok(())
    }

    async fn subscribe<E, H>(&self) -> Result<(), Self::Error>
    where
        E: IntegrationEvent,
        H: IntegrationEventHandler<E>,
    {
        self.core.ensure_open()?;
        let event_name = self.core.event_name_of::<E>();
        if !self.core.registry().has_subscriptions_for(&event_name) {
            // First handler for this event provisions the broker routing;
            // later ones reuse it.
            self.transport.ensure_routing(&event_name).await?;
        }
        self.core.register::<E, H>()?;
        tracing::info!(
            event = %event_name,
            handler = HandlerTypeId::of::<H>().name(),
            "subscribed"
        );
        Ok(())
    }

    async fn unsubscribe<E, H>(&self) -> Result<(), Self::Error>
    where
        E: IntegrationEvent,
        H: IntegrationEventHandler<E>,
    {
        self.core.ensure_open()?;
        self.core.deregister::<E, H>()?;
        tracing::info!(
            event = %self.core.event_name_of::<E>(),
            handler = HandlerTypeId::of::<H>().name(),
            "unsubscribed"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
