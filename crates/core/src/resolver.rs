// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handler instance resolution
//!
//! The dispatcher never constructs handlers itself; it asks an injected
//! resolver for an instance per message. Instance scope (fresh per message,
//! shared singleton, pooled) is the resolver's concern.

use crate::handler::HandlerTypeId;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Type-erased handler instance.
pub type AnyHandler = Box<dyn Any + Send + Sync>;

/// Resolves handler instances by handler type.
///
/// Returning `None` is tolerated by default (the subscription is skipped for
/// that message); see
/// [`MissingHandlerPolicy`](crate::config::MissingHandlerPolicy).
pub trait HandlerResolver: Send + Sync + 'static {
    fn resolve(&self, handler: HandlerTypeId) -> Option<AnyHandler>;
}

/// Factory-map resolver: the batteries-included implementation.
///
/// Each registered factory is invoked once per message, so handlers get a
/// fresh (or cheaply cloned) instance per delivery.
#[derive(Default)]
pub struct FactoryResolver {
    factories: HashMap<TypeId, Box<dyn Fn() -> AnyHandler + Send + Sync>>,
}

impl FactoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory producing instances of `H`.
    pub fn register<H, F>(&mut self, factory: F)
    where
        H: Send + Sync + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.factories
            .insert(TypeId::of::<H>(), Box::new(move || Box::new(factory())));
    }

    /// Register a shared instance cloned per resolution.
    pub fn register_instance<H>(&mut self, instance: H)
    where
        H: Clone + Send + Sync + 'static,
    {
        self.register(move || instance.clone());
    }
}

impl HandlerResolver for FactoryResolver {
    fn resolve(&self, handler: HandlerTypeId) -> Option<AnyHandler> {
        self.factories.get(&handler.type_id()).map(|factory| factory())
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
