//! Subscription specs
//!
//! Verify registration, name normalization, duplicate rejection and the
//! routing lifecycle driven by subscribe/unsubscribe.

use crate::prelude::*;

#[tokio::test]
async fn subscription_is_visible_under_raw_and_normalized_names() {
    let fx = started_bus().await;

    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, EmailHandler>()
        .await
        .unwrap();

    let registry = fx.bus.registry();
    assert!(registry.has_subscriptions_for("OrderCreated"));
    assert!(registry.has_subscriptions_for("OrderCreatedIntegrationEvent"));
    assert!(!registry.has_subscriptions_for("UserRegistered"));
}

#[tokio::test]
async fn duplicate_subscription_is_rejected() {
    let fx = started_bus().await;

    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, EmailHandler>()
        .await
        .unwrap();
    let err = fx
        .bus
        .subscribe::<OrderCreatedIntegrationEvent, EmailHandler>()
        .await
        .unwrap_err();

    assert!(matches!(err, BrokerBusError::Bus(BusError::Registry(_))));
}

#[tokio::test]
async fn co_registered_handlers_share_one_route() {
    let fx = started_bus().await;

    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, EmailHandler>()
        .await
        .unwrap();
    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, SmsHandler>()
        .await
        .unwrap();

    assert_eq!(fx.transport.route_count(), 1);
}

#[tokio::test]
async fn routing_survives_until_the_last_handler_unsubscribes() {
    let fx = started_bus().await;
    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, EmailHandler>()
        .await
        .unwrap();
    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, SmsHandler>()
        .await
        .unwrap();

    fx.bus
        .unsubscribe::<OrderCreatedIntegrationEvent, EmailHandler>()
        .await
        .unwrap();
    assert!(fx.transport.has_route("OrderCreated"));

    fx.bus
        .unsubscribe::<OrderCreatedIntegrationEvent, SmsHandler>()
        .await
        .unwrap();
    let transport = fx.transport.clone();
    wait_until(move || !transport.has_route("OrderCreated")).await;
}

#[tokio::test]
async fn resubscribing_after_full_teardown_restores_delivery() {
    let fx = started_bus().await;
    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, EmailHandler>()
        .await
        .unwrap();
    fx.bus
        .unsubscribe::<OrderCreatedIntegrationEvent, EmailHandler>()
        .await
        .unwrap();
    let transport = fx.transport.clone();
    wait_until(move || !transport.has_route("OrderCreated")).await;

    fx.bus
        .subscribe::<OrderCreatedIntegrationEvent, EmailHandler>()
        .await
        .unwrap();
    fx.bus
        .publish(&OrderCreatedIntegrationEvent::new(3))
        .await
        .unwrap();

    assert_eq!(fx.deliveries.lock().unwrap().len(), 1);
}
