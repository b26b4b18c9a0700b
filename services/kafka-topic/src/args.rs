//! Reads the module argument file Ansible hands to the binary.
//!
//! Two layouts are accepted: a JSON object (new-style modules) and
//! whitespace-separated `key=value` pairs with shell-like quoting
//! (old-style modules).

use serde_json::{Map, Value};
use shared::dto::{DesiredState, Presence};
use shared::kafka::parse_brokers;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

const KNOWN_KEYS: &[&str] = &[
    "zookeeper",
    "topic",
    "partitions",
    "replication_factor",
    "config",
    "state",
];

#[derive(Error, Debug)]
pub enum ArgsError {
    #[error("missing required argument: {0}")]
    Missing(&'static str),
    #[error("invalid integer for {key}: {value}")]
    InvalidInteger { key: &'static str, value: String },
    #[error("invalid value for state: {0}")]
    InvalidState(String),
    #[error("failed to parse config: {0}")]
    Config(String),
    #[error("malformed argument: {0}")]
    Malformed(String),
    #[error("failed to parse arguments: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validated module input.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleArgs {
    pub brokers: Vec<String>,
    pub desired: DesiredState,
}

pub fn parse(text: &str) -> Result<ModuleArgs, ArgsError> {
    let raw = if text.trim_start().starts_with('{') {
        serde_json::from_str::<Map<String, Value>>(text)?
    } else {
        parse_key_values(text)?
    };
    from_map(raw)
}

fn from_map(raw: Map<String, Value>) -> Result<ModuleArgs, ArgsError> {
    for key in raw.keys() {
        if !key.starts_with("_ansible_") && !KNOWN_KEYS.contains(&key.as_str()) {
            warn!(%key, "ignoring unsupported argument");
        }
    }

    let zookeeper = required(&raw, "zookeeper")?;
    let topic = required(&raw, "topic")?;
    let partitions = integer(&raw, "partitions")?;
    let replication_factor = integer(&raw, "replication_factor")?;
    let config = topic_config(raw.get("config"))?;
    let presence = match scalar(&raw, "state") {
        Some(state) => {
            Presence::from_str(&state).map_err(|_| ArgsError::InvalidState(state.clone()))?
        }
        None => Presence::Present,
    };

    let brokers = parse_brokers(&zookeeper);
    if brokers.is_empty() {
        return Err(ArgsError::Missing("zookeeper"));
    }

    let desired = DesiredState::new(topic)
        .with_partitions(partitions)
        .with_replication_factor(replication_factor)
        .with_config(config)
        .with_presence(presence);
    Ok(ModuleArgs { brokers, desired })
}

/// Scalar argument rendered as a string; null and empty strings count as unset.
fn scalar(raw: &Map<String, Value>, key: &str) -> Option<String> {
    let value = match raw.get(key)? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    (!value.is_empty()).then_some(value)
}

fn required(raw: &Map<String, Value>, key: &'static str) -> Result<String, ArgsError> {
    scalar(raw, key).ok_or(ArgsError::Missing(key))
}

fn integer(raw: &Map<String, Value>, key: &'static str) -> Result<i32, ArgsError> {
    match scalar(raw, key) {
        Some(value) => value
            .trim()
            .parse::<i32>()
            .map_err(|_| ArgsError::InvalidInteger { key, value }),
        None => Ok(1),
    }
}

fn topic_config(value: Option<&Value>) -> Result<BTreeMap<String, String>, ArgsError> {
    match value {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(BTreeMap::new()),
        Some(Value::String(s)) => {
            serde_json::from_str(s).map_err(|e| ArgsError::Config(e.to_string()))
        }
        Some(obj @ Value::Object(_)) => {
            serde_json::from_value(obj.clone()).map_err(|e| ArgsError::Config(e.to_string()))
        }
        Some(other) => Err(ArgsError::Config(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

fn parse_key_values(text: &str) -> Result<Map<String, Value>, ArgsError> {
    let mut map = Map::new();
    let tokens = shell_words::split(text).map_err(|e| ArgsError::Malformed(e.to_string()))?;
    for token in tokens {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| ArgsError::Malformed(token.clone()))?;
        if key.is_empty() {
            return Err(ArgsError::Malformed(token));
        }
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(map)
}
