//! Shared fixtures for the bus specs.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use carrier_adapters::{BrokerBus, BrokerBusError, BrokerTransport, InMemoryTransport};
pub use carrier_core::{
    BusConfig, BusError, EventBus, EventMeta, FactoryResolver, HandlerError, IntegrationEvent,
    IntegrationEventHandler, JsonCodec,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedIntegrationEvent {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub order_id: u32,
}

impl OrderCreatedIntegrationEvent {
    pub fn new(order_id: u32) -> Self {
        Self {
            meta: EventMeta::new(),
            order_id,
        }
    }
}

impl IntegrationEvent for OrderCreatedIntegrationEvent {
    const NAME: &'static str = "OrderCreatedIntegrationEvent";

    fn meta(&self) -> &EventMeta {
        &self.meta
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegisteredIntegrationEvent {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub email: String,
}

impl UserRegisteredIntegrationEvent {
    pub fn new(email: &str) -> Self {
        Self {
            meta: EventMeta::new(),
            email: email.to_string(),
        }
    }
}

impl IntegrationEvent for UserRegisteredIntegrationEvent {
    const NAME: &'static str = "UserRegisteredIntegrationEvent";

    fn meta(&self) -> &EventMeta {
        &self.meta
    }
}

/// Event named without the usual suffix, for the dual-trim configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    #[serde(flatten)]
    pub meta: EventMeta,
}

impl OrderCreatedEvent {
    pub fn new() -> Self {
        Self {
            meta: EventMeta::new(),
        }
    }
}

impl IntegrationEvent for OrderCreatedEvent {
    const NAME: &'static str = "OrderCreatedEvent";

    fn meta(&self) -> &EventMeta {
        &self.meta
    }
}

/// One observed handler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub handler: &'static str,
    pub event_id: String,
}

pub type Deliveries = Arc<Mutex<Vec<Delivery>>>;

macro_rules! recording_handler {
    ($name:ident, $event:ty, $label:literal) => {
        #[derive(Clone)]
        pub struct $name {
            log: Deliveries,
        }

        impl $name {
            pub fn new(log: &Deliveries) -> Self {
                Self {
                    log: Arc::clone(log),
                }
            }
        }

        #[async_trait]
        impl IntegrationEventHandler<$event> for $name {
            async fn handle(&self, event: $event) -> Result<(), HandlerError> {
                self.log.lock().unwrap().push(Delivery {
                    handler: $label,
                    event_id: event.meta().id.to_string(),
                });
                Ok(())
            }
        }
    };
}

recording_handler!(EmailHandler, OrderCreatedIntegrationEvent, "email");
recording_handler!(SmsHandler, OrderCreatedIntegrationEvent, "sms");
recording_handler!(AuditHandler, UserRegisteredIntegrationEvent, "audit");
recording_handler!(ReceiptHandler, OrderCreatedEvent, "receipt");

/// Always fails; used to verify containment of handler errors.
#[derive(Clone)]
pub struct FlakyWebhookHandler;

#[async_trait]
impl IntegrationEventHandler<OrderCreatedIntegrationEvent> for FlakyWebhookHandler {
    async fn handle(&self, _event: OrderCreatedIntegrationEvent) -> Result<(), HandlerError> {
        Err(HandlerError::new("webhook endpoint returned 500"))
    }
}

pub struct TestBus {
    pub bus: BrokerBus<InMemoryTransport>,
    pub transport: InMemoryTransport,
    pub deliveries: Deliveries,
}

pub fn quick_config() -> BusConfig {
    BusConfig {
        retry_base_delay: Duration::from_millis(1),
        subscriber_app_name: "BasketService".to_string(),
        ..BusConfig::default()
    }
}

/// A bus over the loopback transport, already consuming, with every fixture
/// handler registered in the resolver (but nothing subscribed yet).
pub async fn started_bus() -> TestBus {
    let deliveries: Deliveries = Arc::new(Mutex::new(Vec::new()));
    let mut resolver = FactoryResolver::new();
    resolver.register_instance(EmailHandler::new(&deliveries));
    resolver.register_instance(SmsHandler::new(&deliveries));
    resolver.register_instance(AuditHandler::new(&deliveries));
    resolver.register_instance(FlakyWebhookHandler);

    let transport = InMemoryTransport::new();
    let bus = BrokerBus::new(
        quick_config(),
        JsonCodec::default(),
        Arc::new(resolver),
        transport.clone(),
    );
    bus.start().await.unwrap();
    TestBus {
        bus,
        transport,
        deliveries,
    }
}

/// Like [`started_bus`], but configured to trim both the `Integration`
/// prefix set and the `Event` suffix set.
pub async fn trimmed_bus() -> TestBus {
    let deliveries: Deliveries = Arc::new(Mutex::new(Vec::new()));
    let mut resolver = FactoryResolver::new();
    resolver.register_instance(ReceiptHandler::new(&deliveries));

    let config = BusConfig {
        event_name_prefix: "Integration".to_string(),
        event_name_suffix: "Event".to_string(),
        strip_event_prefix: true,
        strip_event_suffix: true,
        retry_base_delay: Duration::from_millis(1),
        ..BusConfig::default()
    };
    let transport = InMemoryTransport::new();
    let bus = BrokerBus::new(
        config,
        JsonCodec::default(),
        Arc::new(resolver),
        transport.clone(),
    );
    bus.start().await.unwrap();
    TestBus {
        bus,
        transport,
        deliveries,
    }
}

/// Poll until `condition` holds, for effects that ride a background task.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not met in time");
}
