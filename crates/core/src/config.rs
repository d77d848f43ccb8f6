// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared event bus configuration

use crate::name::EventNameProcessor;
use crate::retry::RetryPolicy;
use std::time::Duration;

/// What the dispatcher does when the resolver yields no handler instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingHandlerPolicy {
    /// Skip the subscription and continue with the others (logged at warn).
    #[default]
    Skip,
    /// Fail that message's dispatch with `DispatchError::HandlerUnresolved`.
    Fail,
}

/// Configuration shared by the core and every broker adapter.
///
/// All components derive their name processor from the same instance;
/// divergent configuration across components is a caller error.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Retries for fallible transport calls (connect, publish).
    pub connection_retry_count: u32,
    /// Base unit for the exponential backoff; delay before retry k is
    /// `retry_base_delay * 2^k`.
    pub retry_base_delay: Duration,
    /// Broker-side topic/exchange name, used only by adapters.
    pub default_topic_name: String,
    /// Consumer group name, used only by adapters to derive queue/
    /// subscription names.
    pub subscriber_app_name: String,
    pub event_name_prefix: String,
    pub event_name_suffix: String,
    pub strip_event_prefix: bool,
    pub strip_event_suffix: bool,
    pub missing_handler_policy: MissingHandlerPolicy,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            connection_retry_count: 5,
            retry_base_delay: Duration::from_secs(1),
            default_topic_name: "CarrierEventBus".to_string(),
            subscriber_app_name: String::new(),
            event_name_prefix: String::new(),
            event_name_suffix: "IntegrationEvent".to_string(),
            strip_event_prefix: false,
            strip_event_suffix: true,
            missing_handler_policy: MissingHandlerPolicy::Skip,
        }
    }
}

impl BusConfig {
    pub fn name_processor(&self) -> EventNameProcessor {
        EventNameProcessor::new(
            self.event_name_prefix.clone(),
            self.event_name_suffix.clone(),
            self.strip_event_prefix,
            self.strip_event_suffix,
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.connection_retry_count, self.retry_base_delay)
    }

    /// Broker-side queue/subscription name for this consumer group and event.
    pub fn subscription_name(&self, event_name: &str) -> String {
        format!(
            "{}.{}",
            self.subscriber_app_name,
            self.name_processor().process(event_name)
        )
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
