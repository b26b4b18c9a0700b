//! Kafka administration port used by the reconciler, plus its rdkafka-backed
//! implementation.

use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::error::RDKafkaErrorCode;
use rdkafka::ClientConfig;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{Result, TopicError};

/// Broker operations the reconciler depends on.
#[async_trait]
pub trait MutationPort: Send + Sync {
    async fn topic_exists(&self, topic: &str) -> Result<bool>;

    async fn create(
        &self,
        topic: &str,
        partitions: i32,
        replication_factor: i32,
        config: &BTreeMap<String, String>,
    ) -> Result<()>;

    async fn delete(&self, topic: &str) -> Result<()>;
}

/// Split a comma separated endpoint list, dropping blank entries.
pub fn parse_brokers(endpoints: &str) -> Vec<String> {
    endpoints
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Admin connection to a Kafka cluster. The underlying client is released on drop.
pub struct KafkaAdmin {
    admin: Arc<AdminClient<DefaultClientContext>>,
    settings: Settings,
}

impl KafkaAdmin {
    pub fn connect(brokers: &[String], settings: &Settings) -> Result<Self> {
        if brokers.is_empty() {
            return Err(TopicError::connection(
                "failed to create Kafka client",
                "no broker endpoints given",
            ));
        }
        let admin: AdminClient<_> = ClientConfig::new()
            .set("bootstrap.servers", brokers.join(","))
            .set("client.id", &settings.kafka_client_id)
            .create()
            .map_err(|e| TopicError::connection("failed to create Kafka client", e))?;
        debug!(brokers = %brokers.join(","), "kafka admin client created");
        Ok(KafkaAdmin {
            admin: Arc::new(admin),
            settings: settings.clone(),
        })
    }

    fn options(&self) -> AdminOptions {
        AdminOptions::new()
            .operation_timeout(Some(self.settings.operation_timeout()))
            .request_timeout(Some(self.settings.request_timeout()))
    }
}

#[async_trait]
impl MutationPort for KafkaAdmin {
    async fn topic_exists(&self, topic: &str) -> Result<bool> {
        // Asking for all topics avoids triggering broker-side auto creation.
        let admin = Arc::clone(&self.admin);
        let timeout = self.settings.metadata_timeout();
        let name = topic.to_string();
        let exists = tokio::task::spawn_blocking(move || {
            admin
                .inner()
                .fetch_metadata(None, timeout)
                .map(|metadata| metadata.topics().iter().any(|t| t.name() == name))
        })
        .await
        .map_err(|e| TopicError::connection("failed to check if topic exists", e))?
        .map_err(|e| TopicError::connection("failed to check if topic exists", e))?;
        debug!(topic = %topic, exists, "topic metadata fetched");
        Ok(exists)
    }

    async fn create(
        &self,
        topic: &str,
        partitions: i32,
        replication_factor: i32,
        config: &BTreeMap<String, String>,
    ) -> Result<()> {
        let new_topic = config.iter().fold(
            NewTopic::new(topic, partitions, TopicReplication::Fixed(replication_factor)),
            |t, (key, value)| t.set(key, value),
        );
        let results = self
            .admin
            .create_topics([&new_topic], &self.options())
            .await
            .map_err(|e| TopicError::connection("failed to reach Kafka cluster", e))?;
        for result in results {
            if let Err((name, err)) = result {
                warn!(topic = %name, %err, "broker rejected topic creation");
                return Err(TopicError::BrokerRejected {
                    topic: name,
                    code: err.to_string(),
                });
            }
        }
        info!(topic = %topic, partitions, replication_factor, "topic created");
        Ok(())
    }

    async fn delete(&self, topic: &str) -> Result<()> {
        let results = self
            .admin
            .delete_topics(&[topic], &self.options())
            .await
            .map_err(|e| TopicError::connection("failed to reach Kafka cluster", e))?;
        for result in results {
            match result {
                Ok(_) => {}
                Err((name, RDKafkaErrorCode::UnknownTopicOrPartition)) => {
                    info!(topic = %name, "topic already gone");
                }
                Err((name, err)) => {
                    warn!(topic = %name, %err, "broker rejected topic deletion");
                    return Err(TopicError::BrokerRejected {
                        topic: name,
                        code: err.to_string(),
                    });
                }
            }
        }
        info!(topic = %topic, "topic deleted");
        Ok(())
    }
}
