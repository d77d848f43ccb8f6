// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! carrier-adapters: broker transports for the carrier event bus
//!
//! This crate provides:
//! - The `BrokerTransport` trait every wire adapter implements
//! - `PersistentConnection`, a reconnect-with-backoff wrapper that collapses
//!   concurrent reconnect triggers into one attempt
//! - `InMemoryTransport`, a loopback broker for tests and single-process use
//! - `BrokerBus`, the transport-generic bus implementing the core contract

pub mod broker;
pub mod connection;
pub mod memory;
pub mod transport;

pub use broker::{BrokerBus, BrokerBusError};
pub use connection::{Connection, Connector, PersistentConnection};
pub use memory::InMemoryTransport;
pub use transport::{BrokerTransport, OnMessage, TransportError};
