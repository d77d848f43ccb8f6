// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! carrier-core: broker-agnostic integration event bus core
//!
//! This crate provides:
//! - Typed integration events and handlers
//! - An in-memory subscription registry with an edge-triggered removal signal
//! - A dispatcher that resolves wire messages back to typed handler invocations
//! - The bus contract shared by all broker adapters
//! - An exponential-backoff retry policy for fallible transport calls
//!
//! Broker-specific transports live in `carrier-adapters`; this crate never
//! talks to the wire directly.

pub mod bus;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod handler;
pub mod name;
pub mod registry;
pub mod resolver;
pub mod retry;

// Re-exports
pub use bus::{BusCore, BusError, EventBus};
pub use codec::{CodecError, JsonCodec, PayloadCodec};
pub use config::{BusConfig, MissingHandlerPolicy};
pub use dispatch::{BoxFuture, DispatchError, EventDispatcher, HandlerInvoker, HandlerOutcome};
pub use event::{EventMeta, EventTypeId, IntegrationEvent};
pub use handler::{HandlerError, HandlerTypeId, IntegrationEventHandler};
pub use name::EventNameProcessor;
pub use registry::{RegistryError, Subscription, SubscriptionRegistry};
pub use resolver::{FactoryResolver, HandlerResolver};
pub use retry::RetryPolicy;
