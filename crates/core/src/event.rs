// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Integration event types

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use uuid::Uuid;

/// Identity and audit fields carried by every integration event.
///
/// Assigned at construction and immutable afterwards. Never used for
/// routing; routing keys come from [`IntegrationEvent::NAME`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    pub id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl EventMeta {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
        }
    }
}

impl Default for EventMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// A fact broadcast to decouple producers from consumers.
///
/// Concrete events embed an [`EventMeta`] (typically via `#[serde(flatten)]`)
/// and declare their simple type name, from which the canonical event name is
/// derived by the name processor.
pub trait IntegrationEvent: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Simple type name, e.g. `"OrderCreatedIntegrationEvent"`.
    const NAME: &'static str;

    fn meta(&self) -> &EventMeta;
}

/// Runtime identifier for the concrete event type bound to an event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTypeId {
    id: TypeId,
    name: &'static str,
}

impl EventTypeId {
    pub fn of<E: IntegrationEvent>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: E::NAME,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<E: IntegrationEvent>(&self) -> bool {
        self.id == TypeId::of::<E>()
    }
}

impl std::fmt::Display for EventTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
