//! Topic reconciliation core used by the `kafka_topic` module: the desired and
//! observed state model, the broker port with its rdkafka implementation, and
//! the decision logic that ties them together.

pub mod config;
pub mod dto;
pub mod error;
pub mod kafka;
pub mod reconcile;
