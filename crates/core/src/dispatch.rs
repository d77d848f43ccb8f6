// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dynamic dispatch from wire messages to typed handlers
//!
//! Instead of runtime reflection, each `subscribe::<E, H>()` builds a
//! type-erased invoker closure capturing the typed decode and `handle` call.
//! The dispatcher walks the registered invokers for a normalized event name.

use crate::codec::{CodecError, PayloadCodec};
use crate::config::MissingHandlerPolicy;
use crate::event::IntegrationEvent;
use crate::handler::{HandlerError, HandlerTypeId, IntegrationEventHandler};
use crate::name::EventNameProcessor;
use crate::registry::{RegistryError, SubscriptionRegistry};
use crate::resolver::HandlerResolver;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Owned, sendable future, as produced by invoker closures.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Outcome of attempting one subscription for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    Handled,
    /// The resolver yielded no instance for the handler type.
    Skipped,
}

/// Type-erased handler invocation built at registration time.
pub type HandlerInvoker = Arc<
    dyn Fn(Arc<dyn HandlerResolver>, Vec<u8>) -> BoxFuture<Result<HandlerOutcome, DispatchError>>
        + Send
        + Sync,
>;

/// Errors from dispatching one inbound message.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A subscription exists but its event type binding is missing. Binding
    /// and subscription lifecycles are coupled, so this indicates registry
    /// corruption; fatal to this message.
    #[error("no event type bound for '{0}' despite live subscriptions")]
    MissingBinding(String),
    /// Only raised under [`MissingHandlerPolicy::Fail`].
    #[error("no instance resolved for handler {handler} on event '{event}'")]
    HandlerUnresolved {
        event: String,
        handler: &'static str,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("handler {handler} failed: {source}")]
    Handler {
        handler: &'static str,
        #[source]
        source: HandlerError,
    },
}

/// Build the invoker for the (event, handler) pair.
///
/// Per message it resolves a fresh `H` instance, decodes the payload into `E`
/// and awaits `handle`. A resolution miss yields [`HandlerOutcome::Skipped`];
/// the dispatcher decides what that means.
pub fn invoker<E, H, C>(codec: C) -> HandlerInvoker
where
    E: IntegrationEvent,
    H: IntegrationEventHandler<E>,
    C: PayloadCodec,
{
    Arc::new(move |resolver, payload| {
        let codec = codec.clone();
        Box::pin(async move {
            let handler_id = HandlerTypeId::of::<H>();
            let Some(instance) = resolver.resolve(handler_id) else {
                return Ok(HandlerOutcome::Skipped);
            };
            let Ok(handler) = instance.downcast::<H>() else {
                tracing::warn!(
                    handler = handler_id.name(),
                    "resolver returned an instance of the wrong type"
                );
                return Ok(HandlerOutcome::Skipped);
            };
            let event: E = codec.decode(&payload)?;
            handler
                .handle(event)
                .await
                .map_err(|source| DispatchError::Handler {
                    handler: handler_id.name(),
                    source,
                })?;
            Ok(HandlerOutcome::Handled)
        })
    })
}

/// Resolves inbound (routing key, payload) pairs to handler invocations.
#[derive(Clone)]
pub struct EventDispatcher {
    processor: EventNameProcessor,
    registry: SubscriptionRegistry,
    resolver: Arc<dyn HandlerResolver>,
    missing_handler: MissingHandlerPolicy,
}

impl EventDispatcher {
    pub fn new(
        processor: EventNameProcessor,
        registry: SubscriptionRegistry,
        resolver: Arc<dyn HandlerResolver>,
        missing_handler: MissingHandlerPolicy,
    ) -> Self {
        Self {
            processor,
            registry,
            resolver,
            missing_handler,
        }
    }

    /// Dispatch one inbound message.
    ///
    /// Returns `Ok(false)` when no local handler is subscribed (unmatched
    /// events are not an error; the broker may deliver events this process
    /// does not care about), `Ok(true)` after every matched handler was
    /// attempted. Handlers run sequentially in registration order; a handler
    /// error aborts this message's dispatch and propagates to the adapter.
    pub async fn dispatch(
        &self,
        raw_event_name: &str,
        payload: &[u8],
    ) -> Result<bool, DispatchError> {
        let event_name = self.processor.process(raw_event_name);
        if !self.registry.has_subscriptions_for(&event_name) {
            tracing::debug!(event = %event_name, "no local subscription, ignoring");
            return Ok(false);
        }
        if self.registry.event_type(&event_name).is_none() {
            return Err(DispatchError::MissingBinding(event_name));
        }
        for subscription in self.registry.handlers_for(&event_name)? {
            let invoke = subscription.invoker();
            match invoke(Arc::clone(&self.resolver), payload.to_vec()).await? {
                HandlerOutcome::Handled => {}
                HandlerOutcome::Skipped => match self.missing_handler {
                    MissingHandlerPolicy::Skip => tracing::warn!(
                        event = %event_name,
                        handler = subscription.handler().name(),
                        "handler not resolved, skipping"
                    ),
                    MissingHandlerPolicy::Fail => {
                        return Err(DispatchError::HandlerUnresolved {
                            event: event_name,
                            handler: subscription.handler().name(),
                        })
                    }
                },
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
