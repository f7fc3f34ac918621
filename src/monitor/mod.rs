//! Position monitoring and liquidation alerting.
//!
//! Contains the core logic for:
//! - Subscriber registration and armed alert state
//! - Distance-to-liquidation evaluation
//! - Position source failure tracking
//! - The poll-driven engine that ties them together

mod engine;
mod evaluator;
mod health;
mod registry;

pub use engine::MonitorEngine;
pub use evaluator::{distance_to_liquidation, evaluate, AlertDecision};
pub use health::SourceHealth;
pub use registry::{PositionKey, Subscriber, SubscriberRegistry};
