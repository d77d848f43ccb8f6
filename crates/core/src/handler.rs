// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handler trait and handler type identity

use crate::event::IntegrationEvent;
use async_trait::async_trait;
use std::any::TypeId;
use thiserror::Error;

/// Failure raised by a handler.
///
/// The dispatcher does not catch these; they propagate to the adapter, which
/// owns the acknowledgment policy.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn from_source(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

/// A typed handler for one integration event.
///
/// A handler type may be registered for several events, but at most once per
/// event name. Instances are obtained per message from the injected
/// [`HandlerResolver`](crate::resolver::HandlerResolver), so implementations
/// must not assume single-threaded invocation across messages.
#[async_trait]
pub trait IntegrationEventHandler<E: IntegrationEvent>: Send + Sync + 'static {
    async fn handle(&self, event: E) -> Result<(), HandlerError>;
}

/// Runtime identifier for a handler type.
///
/// Used for duplicate detection in the registry and as the lookup key handed
/// to the instance resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerTypeId {
    id: TypeId,
    name: &'static str,
}

impl HandlerTypeId {
    pub fn of<H: 'static>() -> Self {
        Self {
            id: TypeId::of::<H>(),
            name: std::any::type_name::<H>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl std::fmt::Display for HandlerTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
