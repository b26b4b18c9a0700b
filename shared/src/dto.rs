use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

/// Whether the topic should exist after the run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Presence {
    #[default]
    Present,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    pub topic: String,
    pub partitions: i32,
    pub replication_factor: i32,
    /// Topic-level config entries; empty means broker defaults.
    pub config: BTreeMap<String, String>,
    pub presence: Presence,
}

impl DesiredState {
    pub fn new(topic: impl Into<String>) -> Self {
        DesiredState {
            topic: topic.into(),
            partitions: 1,
            replication_factor: 1,
            config: BTreeMap::new(),
            presence: Presence::Present,
        }
    }

    pub fn with_partitions(mut self, partitions: i32) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn with_replication_factor(mut self, replication_factor: i32) -> Self {
        self.replication_factor = replication_factor;
        self
    }

    pub fn with_config(mut self, config: BTreeMap<String, String>) -> Self {
        self.config = config;
        self
    }

    pub fn with_presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedState {
    pub exists: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Created,
    Deleted,
    Unchanged,
}

impl Action {
    pub fn changed(self) -> bool {
        !matches!(self, Action::Unchanged)
    }

    pub fn message(self) -> &'static str {
        match self {
            Action::Created => "created topic",
            Action::Deleted => "deleted topic",
            Action::Unchanged => "topic is in the desired state",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub action: Action,
    pub topic: String,
    pub message: String,
}

impl ReconciliationResult {
    pub fn new(action: Action, topic: &str) -> Self {
        ReconciliationResult {
            action,
            topic: topic.to_string(),
            message: action.message().to_string(),
        }
    }

    pub fn payload(&self) -> TopicPayload {
        TopicPayload {
            topic: self.topic.clone(),
        }
    }
}

/// Payload reported alongside a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPayload {
    pub topic: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn presence_parses_lowercase() {
        assert_eq!(Presence::from_str("present").unwrap(), Presence::Present);
        assert_eq!(Presence::from_str("absent").unwrap(), Presence::Absent);
        assert!(Presence::from_str("gone").is_err());
        assert_eq!(Presence::Absent.to_string(), "absent");
    }

    #[test]
    fn desired_state_defaults() {
        let desired = DesiredState::new("orders");
        assert_eq!(desired.partitions, 1);
        assert_eq!(desired.replication_factor, 1);
        assert!(desired.config.is_empty());
        assert_eq!(desired.presence, Presence::Present);
    }

    #[test]
    fn result_messages() {
        let res = ReconciliationResult::new(Action::Unchanged, "orders");
        assert_eq!(res.message, "topic is in the desired state");
        assert!(!res.action.changed());
        assert_eq!(res.payload().topic, "orders");
        assert!(Action::Deleted.changed());
    }
}
