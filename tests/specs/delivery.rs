//! Delivery specs
//!
//! Verify end-to-end publish/dispatch behavior over the loopback transport.

use crate::prelude::*;

#[tokio::test]
async fn published_event_reaches_its_handler_exactly_once() {
    let fx = started_bus().await;
    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, EmailHandler>()
        .await
        .unwrap();

    let event = OrderCreatedIntegrationEvent::new(42);
    let event_id = event.meta.id.to_string();
    fx.bus.publish(&event).await.unwrap();

    assert_eq!(
        *fx.deliveries.lock().unwrap(),
        vec![Delivery {
            handler: "email",
            event_id,
        }]
    );
}

#[tokio::test]
async fn prefix_and_suffix_trims_align_publish_and_delivery() {
    let fx = trimmed_bus().await;
    fx.bus
        .subscribe::<OrderCreatedEvent, ReceiptHandler>()
        .await
        .unwrap();
    assert!(fx.bus.registry().has_subscriptions_for("OrderCreated"));

    let event = OrderCreatedEvent::new();
    let event_id = event.meta.id.to_string();
    fx.bus.publish(&event).await.unwrap();

    assert_eq!(
        *fx.deliveries.lock().unwrap(),
        vec![Delivery {
            handler: "receipt",
            event_id,
        }]
    );
}

#[tokio::test]
async fn handlers_run_in_subscription_order() {
    let fx = started_bus().await;
    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, SmsHandler>()
        .await
        .unwrap();
    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, EmailHandler>()
        .await
        .unwrap();

    fx.bus
        .publish(&OrderCreatedIntegrationEvent::new(1))
        .await
        .unwrap();

    let handlers: Vec<&'static str> = fx
        .deliveries
        .lock()
        .unwrap()
        .iter()
        .map(|d| d.handler)
        .collect();
    assert_eq!(handlers, vec!["sms", "email"]);
}

#[tokio::test]
async fn events_route_only_to_their_own_handlers() {
    let fx = started_bus().await;
    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, EmailHandler>()
        .await
        .unwrap();
    fx.bus
        .subscribe::<UserRegisteredIntegrationEvent, AuditHandler>()
        .await
        .unwrap();

    fx.bus
        .publish(&UserRegisteredIntegrationEvent::new("a@example.com"))
        .await
        .unwrap();

    let log = fx.deliveries.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].handler, "audit");
}

#[tokio::test]
async fn publishing_without_subscribers_is_not_an_error() {
    let fx = started_bus().await;

    fx.bus
        .publish(&OrderCreatedIntegrationEvent::new(5))
        .await
        .unwrap();

    assert!(fx.deliveries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn handler_failure_is_contained_to_that_message() {
    let fx = started_bus().await;
    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, FlakyWebhookHandler>()
        .await
        .unwrap();
    fx.bus
        .subscribe::<UserRegisteredIntegrationEvent, AuditHandler>()
        .await
        .unwrap();

    // Publish succeeds: the failure happens consumer-side and is logged.
    fx.bus
        .publish(&OrderCreatedIntegrationEvent::new(1))
        .await
        .unwrap();
    // The bus keeps delivering other events.
    fx.bus
        .publish(&UserRegisteredIntegrationEvent::new("b@example.com"))
        .await
        .unwrap();

    let log = fx.deliveries.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].handler, "audit");
}

#[tokio::test]
async fn publish_retries_transient_broker_failures() {
    let fx = started_bus().await;
    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, EmailHandler>()
        .await
        .unwrap();

    fx.transport.fail_next_sends(3);
    fx.bus
        .publish(&OrderCreatedIntegrationEvent::new(8))
        .await
        .unwrap();

    assert_eq!(fx.deliveries.lock().unwrap().len(), 1);
}
